//! `${property}` expansion

use std::collections::HashMap;

/// Nesting bound for properties that refer to other properties
const MAX_EXPANSION_DEPTH: usize = 16;

/// Expand every `${name}` in `value`.
///
/// `pom.*` names are read as `project.*`. An unterminated `${` is kept
/// literally.
pub(crate) fn interpolate(value: &str, properties: &HashMap<String, String>) -> Result<String, String> {
    expand(value, properties, 0)
}

fn expand(value: &str, properties: &HashMap<String, String>, depth: usize) -> Result<String, String> {
    if depth > MAX_EXPANSION_DEPTH {
        return Err(format!("property expansion of '{value}' nests too deeply"));
    }

    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return Ok(out);
        };
        let name = after[..end].trim();
        let resolved = lookup(name, properties)
            .ok_or_else(|| format!("unresolved property ${{{name}}}"))?;
        out.push_str(&expand(resolved, properties, depth + 1)?);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn lookup<'a>(name: &str, properties: &'a HashMap<String, String>) -> Option<&'a str> {
    if let Some(value) = properties.get(name) {
        return Some(value.as_str());
    }
    name.strip_prefix("pom.")
        .and_then(|rest| properties.get(&format!("project.{rest}")))
        .map(String::as_str)
}
