//! Command line interface definition

use clap::{Args, Parser, Subcommand};
use pkgrepo_types::Scope;
use std::path::PathBuf;

/// pkgrepo - resolve and download artifacts with their dependencies
#[derive(Parser, Debug)]
#[command(name = "pkgrepo")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Resolve and download artifacts with their transitive dependencies")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Debug level logging on stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Output in JSON format; logs become JSON lines on stderr
    #[arg(long, global = true)]
    pub json: bool,
}

/// Repository options shared by resolving commands
#[derive(Args, Debug, Default)]
pub struct RepoArgs {
    /// Scope to resolve; repeatable. Defaults to runtime
    #[arg(long = "scope", value_name = "SCOPE", value_parser = parse_scope)]
    pub scopes: Vec<Scope>,

    /// Local repository directory
    #[arg(long, value_name = "DIR")]
    pub local_repo: Option<PathBuf>,

    /// Remote repository as ID=URL; repeatable, tried in order.
    /// Replaces the configured remotes
    #[arg(long = "remote", value_name = "ID=URL", value_parser = parse_remote)]
    pub remotes: Vec<(String, String)>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download a coordinate and its dependencies, printing local paths
    #[command(alias = "r")]
    Resolve {
        /// Coordinates as group:name:version[:classifier][:extension]
        #[arg(required = true, value_name = "COORD")]
        coordinates: Vec<String>,

        #[command(flatten)]
        repo: RepoArgs,

        /// Resolve every coordinate as a root of one graph
        #[arg(long)]
        all_roots: bool,
    },

    /// Print the resolved dependency tree without downloading artifacts
    Tree {
        #[arg(value_name = "COORD")]
        coordinate: String,

        #[command(flatten)]
        repo: RepoArgs,
    },

    /// Print where a coordinate lives in the local repository
    Path {
        #[arg(value_name = "COORD")]
        coordinate: String,

        /// Local repository directory
        #[arg(long, value_name = "DIR")]
        local_repo: Option<PathBuf>,
    },
}

impl Commands {
    /// Repository overrides carried by the command
    pub fn repo_args(&self) -> Option<&RepoArgs> {
        match self {
            Self::Resolve { repo, .. } | Self::Tree { repo, .. } => Some(repo),
            Self::Path { .. } => None,
        }
    }
}

fn parse_scope(value: &str) -> Result<Scope, String> {
    value.parse::<Scope>().map_err(|e| e.to_string())
}

fn parse_remote(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((id, url)) if !id.trim().is_empty() && !url.trim().is_empty() => {
            Ok((id.trim().to_string(), url.trim().to_string()))
        }
        _ => Err(format!("expected ID=URL, got '{value}'")),
    }
}
