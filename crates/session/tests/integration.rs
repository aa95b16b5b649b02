//! Integration tests for session crate

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use pkgrepo_config::{Config, RepositoryConfig};
    use pkgrepo_errors::{Error, ResolutionError};
    use pkgrepo_events::{channel, AppEvent, GeneralEvent};
    use pkgrepo_repository::{RemoteRepository, RepositoryRegistry};
    use pkgrepo_session::{resolve, SessionBuilder};
    use pkgrepo_types::{Coordinate, Scope};
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// A `file://` remote populated with documents and jars
    struct FileRemote {
        dir: TempDir,
    }

    impl FileRemote {
        fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
            }
        }

        fn url(&self) -> String {
            url::Url::from_directory_path(self.dir.path())
                .unwrap()
                .to_string()
        }

        fn write(&self, coordinate: &Coordinate, body: &[u8]) {
            let path = self
                .dir
                .path()
                .join(RepositoryRegistry::relative_path(coordinate));
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, body).unwrap();
        }

        /// Publish `gav` with a jar and the given dependency list
        fn publish(&self, gav: &str, deps: &[&str]) {
            let coordinate = Coordinate::parse(gav).unwrap();
            let parts: Vec<&str> = gav.split(':').collect();
            let dependencies: String = deps
                .iter()
                .map(|d| {
                    let p: Vec<&str> = d.split(':').collect();
                    let scope = p.get(3).map(|s| format!("<scope>{s}</scope>")).unwrap_or_default();
                    format!(
                        "<dependency><groupId>{}</groupId><artifactId>{}</artifactId><version>{}</version>{scope}</dependency>",
                        p[0], p[1], p[2]
                    )
                })
                .collect();
            let pom = format!(
                "<project><groupId>{}</groupId><artifactId>{}</artifactId><version>{}</version><dependencies>{dependencies}</dependencies></project>",
                parts[0], parts[1], parts[2]
            );
            self.write(&coordinate.with_extension("pom"), pom.as_bytes());
            self.write(&coordinate, gav.as_bytes());
        }
    }

    fn config(local: &Path, remote_url: &str) -> Config {
        let mut config = Config::default();
        config.paths.local_repo = Some(local.to_path_buf());
        config.repositories = vec![RepositoryConfig {
            id: "test".to_string(),
            url: remote_url.to_string(),
        }];
        config.network.retries = 0;
        config
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[tokio::test]
    async fn test_empty_input_returns_empty() {
        let paths = resolve::<&str>(&[], None, None, None).await.unwrap();
        assert!(paths.is_empty());
    }

    #[tokio::test]
    async fn test_empty_scope_list_means_runtime() {
        let remote = FileRemote::new();
        remote.publish("g:app:1", &["g:lib:1", "g:junit:4:test"]);
        remote.publish("g:lib:1", &[]);
        remote.publish("g:junit:4", &[]);

        let local = TempDir::new().unwrap();
        let remotes = [RemoteRepository::new("files", &remote.url()).unwrap()];
        let defaulted = resolve(&["g:app:1"], None, Some(local.path()), Some(&remotes))
            .await
            .unwrap();
        let empty = resolve(&["g:app:1"], Some(&[]), Some(local.path()), Some(&remotes))
            .await
            .unwrap();

        assert_eq!(names(&defaulted), vec!["app-1.jar", "lib-1.jar"]);
        assert_eq!(empty, defaulted);
    }

    #[tokio::test]
    async fn test_malformed_coordinate_fails_before_network() {
        let server = MockServer::start();
        let any = server.mock(|when, then| {
            when.method(GET);
            then.status(404);
        });
        let local = TempDir::new().unwrap();
        let remote = RemoteRepository::new("mock", &server.url("/repo")).unwrap();

        let err = resolve(
            &["g:a:1", "not-a-coordinate"],
            None,
            Some(local.path()),
            Some(&[remote]),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Coordinate(_)));
        any.assert_hits(0);
    }

    #[tokio::test]
    async fn test_resolve_returns_preorder_paths() {
        let remote = FileRemote::new();
        remote.publish("org.example:app:1.0", &["org.example:core:2.0", "org.example:web:1.0"]);
        remote.publish("org.example:core:2.0", &["org.example:util:1.1", "junit:junit:4.13:test"]);
        remote.publish("org.example:web:1.0", &["org.example:util:1.0"]);
        remote.publish("org.example:util:1.1", &[]);
        remote.publish("org.example:util:1.0", &[]);

        let local = TempDir::new().unwrap();
        let remotes = [RemoteRepository::new("files", &remote.url()).unwrap()];
        let paths = resolve(
            &["org.example:app:1.0"],
            Some(&[Scope::Runtime]),
            Some(local.path()),
            Some(&remotes),
        )
        .await
        .unwrap();

        assert_eq!(
            names(&paths),
            vec!["app-1.0.jar", "core-2.0.jar", "util-1.1.jar", "web-1.0.jar"]
        );
        for path in &paths {
            assert!(path.starts_with(std::path::absolute(local.path()).unwrap()));
            assert!(path.is_file());
        }
    }

    #[tokio::test]
    async fn test_extra_coordinates_are_ignored_with_warning() {
        let remote = FileRemote::new();
        remote.publish("g:a:1", &[]);
        remote.publish("g:b:1", &[]);

        let local = TempDir::new().unwrap();
        let (tx, mut rx) = channel();
        let session = SessionBuilder::new(config(local.path(), &remote.url()))
            .with_event_sender(tx)
            .build()
            .unwrap();

        let paths = session.resolve(&["g:a:1", "g:b:1"]).await.unwrap();
        assert_eq!(names(&paths), vec!["a-1.jar"]);

        let mut warned = false;
        while let Ok(event) = rx.try_recv() {
            if let AppEvent::General(GeneralEvent::Warning { context, .. }) = event {
                assert_eq!(context.as_deref(), Some("g:b:1:jar"));
                warned = true;
            }
        }
        assert!(warned);
    }

    #[tokio::test]
    async fn test_operation_events_bracket_resolution() {
        let remote = FileRemote::new();
        remote.publish("g:a:1", &["g:b:1"]);
        remote.publish("g:b:1", &[]);

        let local = TempDir::new().unwrap();
        let (tx, mut rx) = channel();
        let session = SessionBuilder::new(config(local.path(), &remote.url()))
            .with_event_sender(tx)
            .build()
            .unwrap();
        session.resolve_all(&["g:a:1"]).await.unwrap();

        let mut general = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let AppEvent::General(event) = event {
                general.push(event);
            }
        }
        match general.first() {
            Some(GeneralEvent::OperationStarted {
                operation,
                coordinates,
            }) => {
                assert_eq!(operation, "resolve_all");
                assert_eq!(coordinates, &vec!["g:a:1:jar".to_string()]);
            }
            other => panic!("unexpected first event {other:?}"),
        }
        assert!(matches!(
            general.last(),
            Some(GeneralEvent::OperationCompleted { artifacts: 2, .. })
        ));
    }

    #[tokio::test]
    async fn test_resolve_all_mediates_roots_together() {
        let remote = FileRemote::new();
        remote.publish("g:a:1", &["g:c:1"]);
        remote.publish("g:b:1", &["g:c:2"]);
        remote.publish("g:c:1", &[]);
        remote.publish("g:c:2", &[]);

        let local = TempDir::new().unwrap();
        let session = SessionBuilder::new(config(local.path(), &remote.url()))
            .build()
            .unwrap();

        let paths = session.resolve_all(&["g:a:1", "g:b:1"]).await.unwrap();
        assert_eq!(names(&paths), vec!["a-1.jar", "c-1.jar", "b-1.jar"]);
    }

    #[tokio::test]
    async fn test_cycle_fails_without_result() {
        let remote = FileRemote::new();
        remote.publish("g:a:1", &["g:b:1"]);
        remote.publish("g:b:1", &["g:a:1"]);

        let local = TempDir::new().unwrap();
        let session = SessionBuilder::new(config(local.path(), &remote.url()))
            .build()
            .unwrap();

        let err = session.resolve(&["g:a:1"]).await.unwrap_err();
        match err {
            Error::Resolution(ResolutionError::CyclicDependency { cycle }) => {
                assert_eq!(cycle, vec!["g:a:1:jar", "g:b:1:jar", "g:a:1:jar"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        // nothing was downloaded
        let jar = session.local_path(&Coordinate::parse("g:a:1").unwrap());
        assert!(!jar.exists());
    }

    #[tokio::test]
    async fn test_warm_cache_makes_no_requests() {
        let server = MockServer::start();
        let pom = server.mock(|when, then| {
            when.method(GET).path("/repo/g/a/1/a-1.pom");
            then.status(200).body(
                "<project><groupId>g</groupId><artifactId>a</artifactId><version>1</version></project>",
            );
        });
        let jar = server.mock(|when, then| {
            when.method(GET).path("/repo/g/a/1/a-1.jar");
            then.status(200).body("jar");
        });

        let local = TempDir::new().unwrap();
        let remote_url = server.url("/repo");

        let first = SessionBuilder::new(config(local.path(), &remote_url))
            .build()
            .unwrap()
            .resolve(&["g:a:1"])
            .await
            .unwrap();
        pom.assert_hits(1);
        jar.assert_hits(1);

        let second = SessionBuilder::new(config(local.path(), &remote_url))
            .build()
            .unwrap()
            .resolve(&["g:a:1"])
            .await
            .unwrap();
        assert_eq!(first, second);
        pom.assert_hits(1);
        jar.assert_hits(1);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = Config::default();
        config.resolver.scopes = vec!["everything".to_string()];
        assert!(matches!(
            SessionBuilder::new(config).build(),
            Err(Error::Config(_))
        ));
    }
}
