//! Where the graph builder reads declarations from

use async_trait::async_trait;
use pkgrepo_errors::Error;
use pkgrepo_metadata::{ManagedDependency, MetadataFetcher};
use pkgrepo_types::{ArtifactKey, Coordinate, DependencyDeclaration};
use std::collections::HashMap;

/// Dependency declarations of a coordinate
#[async_trait]
pub trait DeclarationSource: Send + Sync {
    async fn declarations(&self, coordinate: &Coordinate)
        -> Result<Vec<DependencyDeclaration>, Error>;

    /// Dependency management of a root; applied to its transitive
    /// declarations. Sources without management keep the default.
    async fn management(
        &self,
        _coordinate: &Coordinate,
    ) -> Result<HashMap<ArtifactKey, ManagedDependency>, Error> {
        Ok(HashMap::new())
    }
}

#[async_trait]
impl DeclarationSource for MetadataFetcher {
    async fn declarations(
        &self,
        coordinate: &Coordinate,
    ) -> Result<Vec<DependencyDeclaration>, Error> {
        self.fetch_declarations(coordinate).await
    }

    async fn management(
        &self,
        coordinate: &Coordinate,
    ) -> Result<HashMap<ArtifactKey, ManagedDependency>, Error> {
        let document = self.fetch_document(coordinate).await?;
        Ok(document
            .dependency_management()
            .map(|(key, managed)| (key.clone(), managed.clone()))
            .collect())
    }
}
