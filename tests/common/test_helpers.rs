//! Test environment and event collection helpers

use pkgrepo_config::{Config, RepositoryConfig};
use pkgrepo_events::{AppEvent, DownloadEvent, EventReceiver};
use pkgrepo_session::{ResolutionSession, SessionBuilder};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A local repository plus the config pointing at it
pub struct TestEnvironment {
    pub local: TempDir,
    pub config: Config,
}

impl TestEnvironment {
    /// Environment resolving against `remotes`, given as `(id, url)`
    pub fn new(remotes: &[(&str, &str)]) -> Self {
        let local = TempDir::new().expect("temp dir");
        let mut config = Config::default();
        config.paths.local_repo = Some(local.path().to_path_buf());
        config.repositories = remotes
            .iter()
            .map(|(id, url)| RepositoryConfig {
                id: (*id).to_string(),
                url: (*url).to_string(),
            })
            .collect();
        config.network.retries = 0;
        Self { local, config }
    }

    pub fn with_scopes(mut self, scopes: &[&str]) -> Self {
        self.config.resolver.scopes = scopes.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// A fresh session over this environment's local repository
    pub fn session(&self) -> (ResolutionSession, EventCollector) {
        let (tx, rx) = pkgrepo_events::channel();
        let session = SessionBuilder::new(self.config.clone())
            .with_event_sender(tx)
            .build()
            .expect("valid test config");
        (session, EventCollector { rx })
    }

    pub fn local_path(&self) -> &Path {
        self.local.path()
    }
}

/// Drains events emitted during a test
pub struct EventCollector {
    rx: EventReceiver,
}

impl EventCollector {
    pub fn drain(&mut self) -> Vec<AppEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Number of artifacts actually transferred
    pub fn completed_downloads(&mut self) -> usize {
        self.drain()
            .iter()
            .filter(|e| matches!(e, AppEvent::Download(DownloadEvent::Completed { .. })))
            .count()
    }
}

/// File names of `paths`, in order
pub fn file_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| {
            p.file_name()
                .expect("artifact path has a file name")
                .to_string_lossy()
                .into_owned()
        })
        .collect()
}
