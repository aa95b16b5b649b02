//! Integration tests for pkgrepo CLI

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn pkgrepo(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pkgrepo"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("PKGREPO_LOCAL_REPO")
        .env_remove("PKGREPO_SCOPES")
        .output()
        .expect("Failed to execute pkgrepo")
}

fn publish(remote: &Path, group: &str, name: &str, version: &str, deps: &str) {
    let dir = remote
        .join(group.replace('.', "/"))
        .join(name)
        .join(version);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join(format!("{name}-{version}.pom")),
        format!(
            "<project><groupId>{group}</groupId><artifactId>{name}</artifactId><version>{version}</version><dependencies>{deps}</dependencies></project>"
        ),
    )
    .unwrap();
    std::fs::write(dir.join(format!("{name}-{version}.jar")), name).unwrap();
}

fn file_url(dir: &Path) -> String {
    format!("file://{}/", dir.display())
}

#[test]
fn test_cli_version() {
    let output = pkgrepo(&["--version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("pkgrepo"));
}

#[test]
fn test_cli_help() {
    let output = pkgrepo(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("resolve"));
    assert!(stdout.contains("tree"));
    assert!(stdout.contains("path"));
}

#[test]
fn test_cli_invalid_command() {
    let output = pkgrepo(&["invalid-command"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unrecognized subcommand"));
}

#[test]
fn test_path_command() {
    let output = pkgrepo(&["path", "org.example:lib:1.0", "--local-repo", "/opt/m2"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "/opt/m2/org/example/lib/1.0/lib-1.0.jar"
    );
}

#[test]
fn test_malformed_coordinate_fails() {
    let output = pkgrepo(&["path", "just-a-name"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("coordinate.malformed"));
}

#[test]
fn test_resolve_and_tree_against_file_remote() {
    let remote = TempDir::new().unwrap();
    let local = TempDir::new().unwrap();
    publish(
        remote.path(),
        "org.example",
        "app",
        "1.0",
        "<dependency><groupId>org.example</groupId><artifactId>core</artifactId><version>2.0</version></dependency>",
    );
    publish(remote.path(), "org.example", "core", "2.0", "");

    let remote_arg = format!("files={}", file_url(remote.path()));
    let local_arg = local.path().to_string_lossy().into_owned();

    let output = pkgrepo(&[
        "--json",
        "resolve",
        "org.example:app:1.0",
        "--local-repo",
        &local_arg,
        "--remote",
        &remote_arg,
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let paths: Vec<String> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(paths.len(), 2);
    assert!(paths[0].ends_with("app-1.0.jar"));
    assert!(paths[1].ends_with("core-2.0.jar"));

    let output = pkgrepo(&[
        "tree",
        "org.example:app:1.0",
        "--local-repo",
        &local_arg,
        "--remote",
        &remote_arg,
    ]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "org.example:app:1.0:jar\n\\- org.example:core:2.0:jar (compile)\n"
    );
}
