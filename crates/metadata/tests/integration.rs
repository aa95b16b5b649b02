//! Integration tests for metadata crate

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use pkgrepo_errors::{Error, MetadataError};
    use pkgrepo_events::{channel, AppEvent, MetadataEvent};
    use pkgrepo_metadata::MetadataFetcher;
    use pkgrepo_net::{NetClient, NetConfig, RetryConfig};
    use pkgrepo_repository::{RemoteRepository, RepositoryRegistry};
    use pkgrepo_types::{Coordinate, Scope};
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn client() -> NetClient {
        NetClient::new(NetConfig {
            retry: RetryConfig {
                max_retries: 1,
                initial_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(2),
                ..RetryConfig::default()
            },
            ..NetConfig::default()
        })
        .unwrap()
    }

    fn write_pom(root: &Path, gav: &str, body: &str) {
        let c = Coordinate::parse(gav).unwrap().with_extension("pom");
        let path = root.join(RepositoryRegistry::relative_path(&c));
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }

    fn file_remote(id: &str, dir: &TempDir) -> RemoteRepository {
        let url = url::Url::from_directory_path(dir.path()).unwrap();
        RemoteRepository::new(id, url.as_str()).unwrap()
    }

    fn fetcher(local: &TempDir, remotes: Vec<RemoteRepository>) -> MetadataFetcher {
        let registry = RepositoryRegistry::new(local.path(), remotes).unwrap();
        MetadataFetcher::new(Arc::new(registry), client(), None)
    }

    fn dep(g: &str, a: &str, v: &str, extra: &str) -> String {
        format!("<dependency><groupId>{g}</groupId><artifactId>{a}</artifactId><version>{v}</version>{extra}</dependency>")
    }

    fn project(gav: &str, body: &str) -> String {
        let parts: Vec<&str> = gav.split(':').collect();
        format!(
            "<project><groupId>{}</groupId><artifactId>{}</artifactId><version>{}</version>{body}</project>",
            parts[0], parts[1], parts[2]
        )
    }

    #[tokio::test]
    async fn test_fetch_from_file_remote_and_cache() {
        let remote = TempDir::new().unwrap();
        let local = TempDir::new().unwrap();
        write_pom(
            remote.path(),
            "org.example:app:1.0",
            &project(
                "org.example:app:1.0",
                &format!(
                    "<dependencies>{}{}</dependencies>",
                    dep("org.example", "core", "2.0", ""),
                    dep("junit", "junit", "4.13", "<scope>test</scope>"),
                ),
            ),
        );

        let app = Coordinate::parse("org.example:app:1.0").unwrap();
        let declarations = fetcher(&local, vec![file_remote("files", &remote)])
            .fetch_declarations(&app)
            .await
            .unwrap();
        assert_eq!(declarations.len(), 2);
        assert_eq!(declarations[0].coordinate.to_string(), "org.example:core:2.0:jar");
        assert_eq!(declarations[1].scope, Scope::Test);

        let cached = local
            .path()
            .join("org/example/app/1.0/app-1.0.pom");
        assert!(cached.exists());

        // A fresh fetcher without any remote is served by the local repository
        let (tx, mut rx) = channel();
        let registry = RepositoryRegistry::new(local.path(), Vec::new()).unwrap();
        let offline = MetadataFetcher::new(Arc::new(registry), client(), Some(tx));
        assert_eq!(offline.fetch_declarations(&app).await.unwrap(), declarations);
        assert!(matches!(
            rx.try_recv().unwrap(),
            AppEvent::Metadata(MetadataEvent::CacheHit { .. })
        ));
    }

    #[tokio::test]
    async fn test_parent_chain_through_remotes() {
        let remote = TempDir::new().unwrap();
        let local = TempDir::new().unwrap();
        write_pom(
            remote.path(),
            "org.example:root:1",
            &project(
                "org.example:root:1",
                &format!(
                    "<properties><core.version>3.3</core.version></properties>\
                     <dependencyManagement><dependencies>{}</dependencies></dependencyManagement>",
                    dep("org.example", "core", "${core.version}", "")
                ),
            ),
        );
        write_pom(
            remote.path(),
            "org.example:mid:1",
            "<project><parent><groupId>org.example</groupId><artifactId>root</artifactId><version>1</version></parent>\
             <artifactId>mid</artifactId></project>",
        );
        write_pom(
            remote.path(),
            "org.example:leaf:7",
            "<project><parent><groupId>org.example</groupId><artifactId>mid</artifactId><version>1</version></parent>\
             <artifactId>leaf</artifactId><version>7</version>\
             <dependencies><dependency><groupId>org.example</groupId><artifactId>core</artifactId></dependency></dependencies></project>",
        );

        let fetcher = fetcher(&local, vec![file_remote("files", &remote)]);
        let leaf = fetcher
            .fetch_document(&Coordinate::parse("org.example:leaf:7").unwrap())
            .await
            .unwrap();
        assert_eq!(leaf.dependencies()[0].coordinate.version(), "3.3");
        assert_eq!(leaf.parent().unwrap().name(), "mid");
        assert_eq!(fetcher.cached_documents(), 3);
    }

    #[tokio::test]
    async fn test_parent_cycle_is_rejected() {
        let remote = TempDir::new().unwrap();
        let local = TempDir::new().unwrap();
        let with_parent = |parent: &str| {
            format!("<project><parent><groupId>g</groupId><artifactId>{parent}</artifactId><version>1</version></parent></project>")
        };
        write_pom(remote.path(), "g:a:1", &with_parent("b"));
        write_pom(remote.path(), "g:b:1", &with_parent("a"));

        let err = fetcher(&local, vec![file_remote("files", &remote)])
            .fetch_declarations(&Coordinate::parse("g:a:1").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Metadata(MetadataError::Parse { .. })));
        assert!(err.to_string().contains("g:a:1 -> g:b:1 -> g:a:1"));
    }

    #[tokio::test]
    async fn test_not_found_lists_every_remote() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let local = TempDir::new().unwrap();
        let err = fetcher(
            &local,
            vec![file_remote("first", &first), file_remote("second", &second)],
        )
        .fetch_declarations(&Coordinate::parse("g:missing:1").unwrap())
        .await
        .unwrap_err();

        match err {
            Error::Metadata(MetadataError::NotFound {
                coordinate,
                attempts,
            }) => {
                assert_eq!(coordinate, "g:missing:1");
                assert_eq!(attempts, vec!["first: not found", "second: not found"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_http_remote_is_hit_once() {
        let server = MockServer::start();
        let pom = server.mock(|when, then| {
            when.method(GET).path("/repo/g/a/1/a-1.pom");
            then.status(200).body(project("g:a:1", ""));
        });
        let missing = server.mock(|when, then| {
            when.method(GET).path("/empty/g/a/1/a-1.pom");
            then.status(404);
        });

        let local = TempDir::new().unwrap();
        let remotes = vec![
            RemoteRepository::new("empty", &server.url("/empty")).unwrap(),
            RemoteRepository::new("repo", &server.url("/repo")).unwrap(),
        ];
        let coordinate = Coordinate::parse("g:a:1").unwrap();

        let first = fetcher(&local, remotes.clone());
        first.fetch_declarations(&coordinate).await.unwrap();
        first.fetch_declarations(&coordinate).await.unwrap();
        // a second session reuses the local repository
        fetcher(&local, remotes)
            .fetch_declarations(&coordinate)
            .await
            .unwrap();

        pom.assert_hits(1);
        missing.assert_hits(1);
    }

    #[tokio::test]
    async fn test_malformed_document_is_not_cached() {
        let remote = TempDir::new().unwrap();
        let local = TempDir::new().unwrap();
        write_pom(remote.path(), "g:bad:1", "<project><dependencies>");

        let err = fetcher(&local, vec![file_remote("files", &remote)])
            .fetch_declarations(&Coordinate::parse("g:bad:1").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Metadata(MetadataError::Parse { .. })));
        assert!(!local.path().join("g/bad/1/bad-1.pom").exists());
    }
}
