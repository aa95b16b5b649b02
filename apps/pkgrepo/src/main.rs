//! pkgrepo - resolve and download artifacts with their dependencies
//!
//! Thin CLI over `pkgrepo-session`: loads configuration, runs one command
//! while draining library events into tracing, then renders the result.

mod cli;
mod display;
mod error;
mod logging;

use crate::cli::{Cli, Commands};
use crate::display::{CommandOutput, OutputRenderer};
use crate::error::CliError;
use clap::Parser;
use pkgrepo_config::{Config, RepositoryConfig};
use pkgrepo_events::{EventReceiver, EventSender};
use pkgrepo_repository::RepositoryRegistry;
use pkgrepo_session::SessionBuilder;
use pkgrepo_types::Coordinate;
use std::process;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    logging::init_tracing(json_mode, cli.global.debug);

    if let Err(e) = run(cli).await {
        error!(code = ?e.code(), "{e}");
        if json_mode {
            println!(
                "{}",
                serde_json::json!({ "error": e.to_string(), "code": e.code() })
            );
        } else {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting pkgrepo v{}", env!("CARGO_PKG_VERSION"));

    // defaults < file < environment < flags
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, &cli.command);
    config.validate()?;

    let renderer = OutputRenderer::new(cli.global.json);
    let (event_sender, event_receiver) = pkgrepo_events::channel();

    let output =
        execute_command_with_events(cli.command, config, event_sender, event_receiver).await?;
    renderer.render_result(&output)?;

    info!("Command completed successfully");
    Ok(())
}

/// Execute command while logging its events
async fn execute_command_with_events(
    command: Commands,
    config: Config,
    event_sender: EventSender,
    mut event_receiver: EventReceiver,
) -> Result<CommandOutput, CliError> {
    let mut command_future = Box::pin(execute_command(command, config, event_sender));

    loop {
        select! {
            result = &mut command_future => {
                while let Ok(event) = event_receiver.try_recv() {
                    logging::log_event_with_tracing(&event);
                }
                return result;
            }

            event = event_receiver.recv() => {
                if let Some(event) = event {
                    logging::log_event_with_tracing(&event);
                }
            }
        }
    }
}

async fn execute_command(
    command: Commands,
    config: Config,
    event_sender: EventSender,
) -> Result<CommandOutput, CliError> {
    match command {
        Commands::Resolve {
            coordinates,
            all_roots,
            ..
        } => {
            let session = SessionBuilder::new(config)
                .with_event_sender(event_sender)
                .build()?;
            let paths = if all_roots {
                session.resolve_all(&coordinates).await?
            } else {
                session.resolve(&coordinates).await?
            };
            Ok(CommandOutput::Paths(paths))
        }

        Commands::Tree { coordinate, .. } => {
            let root = Coordinate::parse(&coordinate).map_err(pkgrepo_errors::Error::from)?;
            let session = SessionBuilder::new(config)
                .with_event_sender(event_sender)
                .build()?;
            let graph = session.resolve_graph(std::slice::from_ref(&root)).await?;
            Ok(CommandOutput::Tree(graph))
        }

        Commands::Path { coordinate, .. } => {
            let coordinate =
                Coordinate::parse(&coordinate).map_err(pkgrepo_errors::Error::from)?;
            let registry = RepositoryRegistry::from_config(&config)?;
            Ok(CommandOutput::Path(registry.resolve_local_path(&coordinate)))
        }
    }
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, command: &Commands) {
    if let Commands::Path {
        local_repo: Some(dir),
        ..
    } = command
    {
        config.paths.local_repo = Some(dir.clone());
    }

    let Some(repo) = command.repo_args() else {
        return;
    };
    if !repo.scopes.is_empty() {
        config.resolver.scopes = repo.scopes.iter().map(|s| s.as_str().to_string()).collect();
    }
    if let Some(dir) = &repo.local_repo {
        config.paths.local_repo = Some(dir.clone());
    }
    if !repo.remotes.is_empty() {
        config.repositories = repo
            .remotes
            .iter()
            .map(|(id, url)| RepositoryConfig {
                id: id.clone(),
                url: url.clone(),
            })
            .collect();
    }
}
