//! Dependency scopes and classpath filters

use pkgrepo_errors::CoordinateError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// When a dependency is needed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Compile,
    Runtime,
    Test,
    Provided,
}

impl Scope {
    pub const ALL: [Scope; 4] = [Scope::Compile, Scope::Runtime, Scope::Test, Scope::Provided];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compile => "compile",
            Self::Runtime => "runtime",
            Self::Test => "test",
            Self::Provided => "provided",
        }
    }

    /// Effective scope of a transitive dependency declared with `child`
    /// underneath a node whose effective scope is `parent`.
    ///
    /// Returns `None` when the dependency is not inherited at all: test and
    /// provided dependencies of a dependency never reach the consumer.
    #[must_use]
    pub fn propagate(parent: Scope, child: Scope) -> Option<Scope> {
        match child {
            Scope::Test | Scope::Provided => None,
            Scope::Compile | Scope::Runtime => Some(match parent {
                Scope::Compile => child,
                Scope::Runtime => Scope::Runtime,
                Scope::Provided => Scope::Provided,
                Scope::Test => Scope::Test,
            }),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compile" => Ok(Self::Compile),
            "runtime" => Ok(Self::Runtime),
            "test" => Ok(Self::Test),
            // system dependencies live outside any repository
            "provided" | "system" => Ok(Self::Provided),
            _ => Err(CoordinateError::UnknownScope {
                scope: s.to_string(),
            }),
        }
    }
}

/// Set of scopes a resolution accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeFilter {
    accepted: BTreeSet<Scope>,
}

impl ScopeFilter {
    /// Expand requested scopes to the classpath they imply.
    ///
    /// A `runtime` classpath also needs compile dependencies, a `test`
    /// classpath needs everything, and `compile`/`provided` both see the
    /// compile and provided sets.
    #[must_use]
    pub fn classpath(scopes: impl IntoIterator<Item = Scope>) -> Self {
        let mut accepted = BTreeSet::new();
        for scope in scopes {
            let implied: &[Scope] = match scope {
                Scope::Compile | Scope::Provided => &[Scope::Compile, Scope::Provided],
                Scope::Runtime => &[Scope::Compile, Scope::Runtime],
                Scope::Test => &Scope::ALL,
            };
            accepted.extend(implied.iter().copied());
        }
        Self { accepted }
    }

    /// Filter that accepts exactly the given scopes.
    #[must_use]
    pub fn exact(scopes: impl IntoIterator<Item = Scope>) -> Self {
        Self {
            accepted: scopes.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn accepts(&self, scope: Scope) -> bool {
        self.accepted.contains(&scope)
    }

    pub fn iter(&self) -> impl Iterator<Item = Scope> + '_ {
        self.accepted.iter().copied()
    }
}

impl Default for ScopeFilter {
    fn default() -> Self {
        Self::classpath([Scope::Runtime])
    }
}

impl fmt::Display for ScopeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Scope::as_str).collect();
        write!(f, "{{{}}}", names.join(","))
    }
}
