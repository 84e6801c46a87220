use async_trait::async_trait;

use crate::maven::coordinates::ArtifactDescriptor;
use crate::maven::module_metadata::ModuleMetadata;
use crate::maven::resolver::MavenResolver;

/// Per-tier artifact selection policy for a module whose metadata is already
///  resolved. `None` means "this tier cannot answer", handing the artifact kind to
///  the next tier; `Some` is a definitive (possibly empty) artifact set.
#[async_trait]
pub trait RepositoryAccess: Send + Sync {
    async fn resolve_primary_artifacts(
        &self,
        module: &ModuleMetadata,
    ) -> Option<Vec<ArtifactDescriptor>>;

    async fn resolve_source_artifacts(
        &self,
        module: &ModuleMetadata,
    ) -> Option<Vec<ArtifactDescriptor>>;

    async fn resolve_doc_artifacts(
        &self,
        module: &ModuleMetadata,
    ) -> Option<Vec<ArtifactDescriptor>>;
}

/// Answers what is available without a network round-trip.
pub struct MavenLocalRepositoryAccess;

#[async_trait]
impl RepositoryAccess for MavenLocalRepositoryAccess {
    async fn resolve_primary_artifacts(
        &self,
        module: &ModuleMetadata,
    ) -> Option<Vec<ArtifactDescriptor>> {
        if module.is_known_jar_packaging() {
            Some(vec![module.artifact("jar", "jar", None)])
        } else {
            None
        }
    }

    async fn resolve_source_artifacts(
        &self,
        _module: &ModuleMetadata,
    ) -> Option<Vec<ArtifactDescriptor>> {
        // source artifacts are optional, their presence can only be established remotely
        None
    }

    async fn resolve_doc_artifacts(
        &self,
        _module: &ModuleMetadata,
    ) -> Option<Vec<ArtifactDescriptor>> {
        // javadoc artifacts are optional, their presence can only be established remotely
        None
    }
}

/// Answers what must be fetched or probed over the network.
pub struct MavenRemoteRepositoryAccess<'a> {
    resolver: &'a MavenResolver,
}

impl<'a> MavenRemoteRepositoryAccess<'a> {
    pub(crate) fn new(resolver: &'a MavenResolver) -> MavenRemoteRepositoryAccess<'a> {
        MavenRemoteRepositoryAccess { resolver }
    }

    /// Probes for an artifact whose presence is never guaranteed. Non-existence
    ///  yields the empty set; probe failures degrade to the empty set with a
    ///  warning.
    async fn find_optional_artifacts(
        &self,
        module: &ModuleMetadata,
        kind: &str,
        classifier: Option<&str>,
    ) -> Vec<ArtifactDescriptor> {
        let artifact = module.artifact(kind, "jar", classifier);
        let artifact_resolver = self.resolver.create_artifact_resolver(&module.source);

        match artifact_resolver.artifact_exists(&module.id, &artifact).await {
            Ok(true) => vec![artifact],
            Ok(false) => vec![],
            Err(e) => {
                self.resolver.diagnostics().warn(&format!(
                    "cannot probe for optional {} artifact of {}:{}:{}, assuming absent: {}",
                    kind, module.id.group, module.id.name, module.id.version, e
                ));
                vec![]
            }
        }
    }
}

#[async_trait]
impl<'a> RepositoryAccess for MavenRemoteRepositoryAccess<'a> {
    async fn resolve_primary_artifacts(
        &self,
        module: &ModuleMetadata,
    ) -> Option<Vec<ArtifactDescriptor>> {
        if module.is_pom_packaging() {
            // a descriptor-only module has no primary artifact; a jar may still
            // accompany it, so probe for one instead of reporting it missing
            return Some(self.find_optional_artifacts(module, "jar", None).await);
        }

        let packaging_typed = module.artifact(&module.packaging, &module.packaging, None);
        let artifact_resolver = self.resolver.create_artifact_resolver(&module.source);

        match artifact_resolver.artifact_exists(&module.id, &packaging_typed).await {
            Ok(true) => {
                self.resolver.diagnostics().advise(
                    "relying on the packaging to define the extension of the main artifact has been deprecated",
                );
                Some(vec![packaging_typed])
            }
            Ok(false) => Some(vec![module.artifact("jar", "jar", None)]),
            Err(e) => {
                // packaging is only a hint; fall back to the jar rather than failing
                self.resolver.diagnostics().warn(&format!(
                    "cannot probe for {}-typed artifact of {}:{}:{}, assuming jar: {}",
                    module.packaging, module.id.group, module.id.name, module.id.version, e
                ));
                Some(vec![module.artifact("jar", "jar", None)])
            }
        }
    }

    async fn resolve_source_artifacts(
        &self,
        module: &ModuleMetadata,
    ) -> Option<Vec<ArtifactDescriptor>> {
        Some(self.find_optional_artifacts(module, "source", Some("sources")).await)
    }

    async fn resolve_doc_artifacts(
        &self,
        module: &ModuleMetadata,
    ) -> Option<Vec<ArtifactDescriptor>> {
        Some(self.find_optional_artifacts(module, "javadoc", Some("javadoc")).await)
    }
}
