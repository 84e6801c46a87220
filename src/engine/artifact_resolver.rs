use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, trace};

use crate::engine::resource::{fetch_bytes, ExternalResourceAccessor, ResourceError};
use crate::maven::coordinates::{ArtifactDescriptor, ModuleCoordinate, ModuleSource};
use crate::maven::pattern::ResourcePattern;

/// Resolves descriptors and artifacts against an ordered list of candidate
///  patterns, bound to one module source. Every path rendered through this
///  resolver applies the source's unique-snapshot substitution, so a resolution
///  never mixes timestamped and non-timestamped paths.
pub struct ExternalResourceArtifactResolver {
    accessor: Arc<dyn ExternalResourceAccessor>,
    descriptor_patterns: Vec<ResourcePattern>,
    artifact_patterns: Vec<ResourcePattern>,
    source: ModuleSource,
}

impl ExternalResourceArtifactResolver {
    pub fn new(
        accessor: Arc<dyn ExternalResourceAccessor>,
        descriptor_patterns: Vec<ResourcePattern>,
        artifact_patterns: Vec<ResourcePattern>,
        source: ModuleSource,
    ) -> ExternalResourceArtifactResolver {
        ExternalResourceArtifactResolver {
            accessor,
            descriptor_patterns,
            artifact_patterns,
            source,
        }
    }

    pub fn source(&self) -> &ModuleSource {
        &self.source
    }

    pub fn descriptor_locations(
        &self,
        coordinate: &ModuleCoordinate,
        artifact: &ArtifactDescriptor,
    ) -> Vec<String> {
        self.descriptor_patterns
            .iter()
            .map(|p| p.to_path(coordinate, artifact, &self.source))
            .collect()
    }

    /// Candidate artifact locations in configuration order: the primary root
    ///  first, then each artifact-root override.
    pub fn artifact_locations(
        &self,
        coordinate: &ModuleCoordinate,
        artifact: &ArtifactDescriptor,
    ) -> Vec<String> {
        self.artifact_patterns
            .iter()
            .map(|p| p.to_path(coordinate, artifact, &self.source))
            .collect()
    }

    /// Fetches the module's descriptor from the first candidate location that has
    ///  it. Absence at one location moves on to the next; an access failure aborts.
    pub async fn fetch_descriptor(
        &self,
        coordinate: &ModuleCoordinate,
        artifact: &ArtifactDescriptor,
    ) -> Result<Option<Bytes>, ResourceError> {
        for location in self.descriptor_locations(coordinate, artifact) {
            trace!("fetching descriptor candidate {}", location);
            match fetch_bytes(&*self.accessor, &location).await {
                Ok(bytes) => {
                    debug!("resolved descriptor at {}", location);
                    return Ok(Some(bytes));
                }
                Err(ResourceError::NotFound) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    /// The first candidate location at which the artifact exists.
    pub async fn resolve_artifact_location(
        &self,
        coordinate: &ModuleCoordinate,
        artifact: &ArtifactDescriptor,
    ) -> Result<Option<String>, ResourceError> {
        for location in self.artifact_locations(coordinate, artifact) {
            trace!("probing artifact candidate {}", location);
            match self.accessor.exists(&location).await {
                Ok(true) => return Ok(Some(location)),
                Ok(false) | Err(ResourceError::NotFound) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    pub async fn artifact_exists(
        &self,
        coordinate: &ModuleCoordinate,
        artifact: &ArtifactDescriptor,
    ) -> Result<bool, ResourceError> {
        Ok(self
            .resolve_artifact_location(coordinate, artifact)
            .await?
            .is_some())
    }
}
