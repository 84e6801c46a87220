use std::sync::Arc;

use hyper::Uri;
use thiserror::Error;
use tracing::debug;

use crate::engine::artifact_resolver::ExternalResourceArtifactResolver;
use crate::engine::resource::{ExternalResourceAccessor, ResourceError};
use crate::engine::result::MetadataResolveResult;
use crate::maven::access::{MavenLocalRepositoryAccess, MavenRemoteRepositoryAccess};
use crate::maven::coordinates::{ArtifactDescriptor, ModuleCoordinate, ModuleSource};
use crate::maven::metadata::{MavenMetadataLoader, SnapshotMetadata};
use crate::maven::module_metadata::ModuleMetadata;
use crate::maven::pattern::{ResourcePattern, M2_PATTERN};

/// Raised at configuration time, never during resolution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("a maven resolver only supports a single pattern; it cannot be provided per-location")]
    PatternPerLocation,
    #[error("a maven resolver cannot have multiple descriptor locations")]
    MultipleDescriptorLocations,
    #[error("the root of a maven resolver is fixed at construction; pass the url to the constructor instead")]
    RootIsFixed,
    #[error("cannot set m2_compatible = false on a maven resolver")]
    M2CompatibilityRequired,
}

/// Resolves module coordinates against a Maven-layout repository: descriptor and
///  artifact locations through a single configurable pattern, and snapshot versions
///  to their unique timestamped build where the repository publishes one.
///
/// Configuration is read-mostly; resolution itself keeps no mutable state across
///  invocations.
pub struct MavenResolver {
    name: String,
    root: String, // with trailing '/'
    pattern: String,
    artifact_roots: Vec<String>,
    use_poms: bool,
    use_maven_metadata: bool,
    accessor: Arc<dyn ExternalResourceAccessor>,
    diagnostics: Arc<dyn crate::util::diagnostics::Diagnostics>,
    metadata_loader: MavenMetadataLoader,
    // derived from the configuration above, regenerated atomically on every change
    descriptor_patterns: Vec<ResourcePattern>,
    artifact_patterns: Vec<ResourcePattern>,
}

impl MavenResolver {
    pub fn new(
        name: impl Into<String>,
        root_uri: &str,
        accessor: Arc<dyn ExternalResourceAccessor>,
        diagnostics: Arc<dyn crate::util::diagnostics::Diagnostics>,
    ) -> anyhow::Result<MavenResolver> {
        // check that the root URI is valid
        Uri::try_from(root_uri)?;

        let mut resolver = MavenResolver {
            name: name.into(),
            root: with_trailing_slash(root_uri),
            pattern: M2_PATTERN.to_string(),
            artifact_roots: Vec::new(),
            use_poms: true,
            use_maven_metadata: true,
            metadata_loader: MavenMetadataLoader::new(accessor.clone()),
            accessor,
            diagnostics,
            descriptor_patterns: Vec::new(),
            artifact_patterns: Vec::new(),
        };
        resolver.update_patterns();
        Ok(resolver)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub(crate) fn diagnostics(&self) -> &dyn crate::util::diagnostics::Diagnostics {
        &*self.diagnostics
    }

    fn whole_pattern(&self) -> String {
        format!("{}{}", self.root, self.pattern)
    }

    /// Regenerates both derived pattern lists. Must run before the next lookup
    ///  after every configuration change.
    fn update_patterns(&mut self) {
        if self.use_poms {
            self.descriptor_patterns = vec![ResourcePattern::new(self.whole_pattern())];
        } else {
            self.descriptor_patterns = Vec::new();
        }

        let mut artifact_patterns = vec![ResourcePattern::new(self.whole_pattern())];
        for artifact_root in &self.artifact_roots {
            artifact_patterns.push(ResourcePattern::new(format!(
                "{}{}",
                artifact_root, self.pattern
            )));
        }
        self.artifact_patterns = artifact_patterns;
    }

    pub fn set_pattern(&mut self, pattern: &str) {
        self.pattern = pattern.to_string();
        self.update_patterns();
    }

    /// Registers an additional artifact root, tried after the primary root in
    ///  registration order. The single resolver-wide pattern applies; a
    ///  per-location pattern is a configuration error.
    pub fn add_artifact_root(
        &mut self,
        root_uri: &str,
        pattern: Option<&str>,
    ) -> Result<(), ConfigError> {
        if pattern.map_or(false, |p| !p.is_empty()) {
            return Err(ConfigError::PatternPerLocation);
        }
        self.artifact_roots.push(with_trailing_slash(root_uri));
        self.update_patterns();
        Ok(())
    }

    pub fn add_descriptor_root(
        &mut self,
        _root_uri: &str,
        _pattern: Option<&str>,
    ) -> Result<(), ConfigError> {
        Err(ConfigError::MultipleDescriptorLocations)
    }

    pub fn set_root(&mut self, _root_uri: &str) -> Result<(), ConfigError> {
        Err(ConfigError::RootIsFixed)
    }

    pub fn set_m2_compatible(&mut self, compatible: bool) -> Result<(), ConfigError> {
        if !compatible {
            return Err(ConfigError::M2CompatibilityRequired);
        }
        Ok(())
    }

    pub fn use_poms(&self) -> bool {
        self.use_poms
    }

    pub fn set_use_poms(&mut self, use_poms: bool) {
        self.use_poms = use_poms;
        self.update_patterns();
    }

    pub fn use_maven_metadata(&self) -> bool {
        self.use_maven_metadata
    }

    pub fn set_use_maven_metadata(&mut self, use_maven_metadata: bool) {
        self.diagnostics
            .advise("switching use_maven_metadata on a maven resolver has been deprecated");
        self.use_maven_metadata = use_maven_metadata;
    }

    /// The name of the descriptor document for a module, or `None` when descriptor
    ///  lookup is disabled.
    pub fn metadata_artifact_name(&self, module_name: &str) -> Option<ArtifactDescriptor> {
        if self.use_poms {
            Some(ArtifactDescriptor::new(module_name, "pom", "pom", None))
        } else {
            None
        }
    }

    /// An artifact resolver bound to the given module source, so unique-snapshot
    ///  timestamp substitution applies to every lookup made through it.
    pub fn create_artifact_resolver(&self, source: &ModuleSource) -> ExternalResourceArtifactResolver {
        ExternalResourceArtifactResolver::new(
            self.accessor.clone(),
            self.descriptor_patterns.clone(),
            self.artifact_patterns.clone(),
            source.clone(),
        )
    }

    pub fn local_access(&self) -> MavenLocalRepositoryAccess {
        MavenLocalRepositoryAccess
    }

    pub fn remote_access(&self) -> MavenRemoteRepositoryAccess<'_> {
        MavenRemoteRepositoryAccess::new(self)
    }

    /// Resolves a module's metadata. Snapshot versions prefer the unique
    ///  timestamped build published in the repository's metadata; a snapshot with
    ///  no discoverable unique identity degrades to static-style resolution.
    pub async fn resolve_module(&self, coordinate: &ModuleCoordinate) -> MetadataResolveResult {
        if coordinate.is_snapshot() {
            if let Some(source) = self.find_unique_snapshot_version(coordinate).await {
                return self.resolve_static(coordinate, source).await;
            }
        }

        self.resolve_static(coordinate, ModuleSource::Plain).await
    }

    /// Derives the unique build identity of a snapshot version from the remote
    ///  maven-metadata.xml, if one is published.
    pub async fn find_unique_snapshot_version(
        &self,
        coordinate: &ModuleCoordinate,
    ) -> Option<ModuleSource> {
        let metadata_location = format!(
            "{}/maven-metadata.xml",
            ResourcePattern::new(self.whole_pattern()).to_module_version_path(coordinate)
        );
        let metadata = self.parse_maven_metadata(&metadata_location).await;

        if let Some(timestamp) = metadata.timestamp {
            // a timestamp means the repository publishes unique snapshot builds;
            // an absent build number stays an empty component, the format is load-bearing
            let identity = format!("{}-{}", timestamp, metadata.build_number.as_deref().unwrap_or(""));
            debug!("unique snapshot {} for {}:{}:{}", identity, coordinate.group, coordinate.name, coordinate.version);
            return Some(ModuleSource::UniqueSnapshot(identity));
        }
        None
    }

    /// Metadata absence, whatever the cause, never fails a resolution; it only
    ///  disables unique-snapshot resolution for this attempt.
    async fn parse_maven_metadata(&self, location: &str) -> SnapshotMetadata {
        if !self.should_use_maven_metadata() {
            return SnapshotMetadata::default();
        }

        match self.metadata_loader.load(location).await {
            Ok(metadata) => metadata,
            Err(ResourceError::NotFound) => SnapshotMetadata::default(),
            Err(ResourceError::Access(e)) => {
                self.diagnostics.warn(&format!(
                    "cannot access maven metadata file {}, ignoring: {}",
                    location, e
                ));
                SnapshotMetadata::default()
            }
        }
    }

    fn should_use_maven_metadata(&self) -> bool {
        self.use_maven_metadata && self.pattern.ends_with(M2_PATTERN)
    }

    async fn resolve_static(
        &self,
        coordinate: &ModuleCoordinate,
        source: ModuleSource,
    ) -> MetadataResolveResult {
        let artifact_resolver = self.create_artifact_resolver(&source);

        match self.metadata_artifact_name(&coordinate.name) {
            Some(descriptor_artifact) => {
                match artifact_resolver.fetch_descriptor(coordinate, &descriptor_artifact).await {
                    Ok(Some(bytes)) => {
                        let document = match std::str::from_utf8(&bytes) {
                            Ok(document) => document.to_string(),
                            Err(e) => {
                                return MetadataResolveResult::Failed(ResourceError::Access(e.into()))
                            }
                        };
                        match ModuleMetadata::parse_pom(coordinate, &source, &document) {
                            Ok(metadata) => MetadataResolveResult::Resolved(metadata),
                            Err(e) => MetadataResolveResult::Failed(ResourceError::Access(e)),
                        }
                    }
                    Ok(None) => MetadataResolveResult::Missing,
                    Err(e) => MetadataResolveResult::Failed(e),
                }
            }
            None => {
                // descriptors are disabled: the module's presence is established by
                // probing for its default jar artifact instead
                let jar = ArtifactDescriptor::new(coordinate.name.clone(), "jar", "jar", None);
                match artifact_resolver.artifact_exists(coordinate, &jar).await {
                    Ok(true) => MetadataResolveResult::Resolved(ModuleMetadata::default_jar(
                        coordinate, &source,
                    )),
                    Ok(false) => MetadataResolveResult::Missing,
                    Err(e) => MetadataResolveResult::Failed(e),
                }
            }
        }
    }
}

fn with_trailing_slash(uri: &str) -> String {
    let mut uri = uri.to_string();
    if !uri.ends_with('/') {
        uri.push('/');
    }
    uri
}

#[cfg(test)]
mod test {
    use rstest::*;

    use super::*;
    use crate::engine::result::ResolveState;
    use crate::util::diagnostics::RecordingDiagnostics;
    use crate::util::in_memory::InMemoryResourceAccessor;

    const ROOT: &str = "https://repo.example.org/m2";

    struct Fixture {
        accessor: Arc<InMemoryResourceAccessor>,
        diagnostics: Arc<RecordingDiagnostics>,
        resolver: MavenResolver,
    }

    fn fixture() -> Fixture {
        let accessor = Arc::new(InMemoryResourceAccessor::new());
        let diagnostics = Arc::new(RecordingDiagnostics::new());
        let resolver =
            MavenResolver::new("test", ROOT, accessor.clone(), diagnostics.clone()).unwrap();
        Fixture {
            accessor,
            diagnostics,
            resolver,
        }
    }

    fn thing(version: &str) -> ModuleCoordinate {
        ModuleCoordinate::new("org.example", "thing", version)
    }

    const METADATA_LOCATION: &str =
        "https://repo.example.org/m2/org/example/thing/2.0-SNAPSHOT/maven-metadata.xml";

    fn snapshot_metadata_document(timestamp: &str, build_number: Option<&str>) -> String {
        let build_number_element = match build_number {
            Some(n) => format!("<buildNumber>{}</buildNumber>", n),
            None => String::new(),
        };
        format!(
            "<metadata><versioning><snapshot><timestamp>{}</timestamp>{}</snapshot></versioning></metadata>",
            timestamp, build_number_element
        )
    }

    #[test]
    fn test_configuration_errors() {
        let mut f = fixture();

        assert_eq!(
            f.resolver.add_descriptor_root("https://elsewhere.example.org/", None),
            Err(ConfigError::MultipleDescriptorLocations)
        );
        assert_eq!(
            f.resolver.add_artifact_root("https://elsewhere.example.org/", Some("[module]/[artifact].[ext]")),
            Err(ConfigError::PatternPerLocation)
        );
        assert_eq!(f.resolver.set_root("https://elsewhere.example.org/"), Err(ConfigError::RootIsFixed));
        assert_eq!(f.resolver.set_m2_compatible(false), Err(ConfigError::M2CompatibilityRequired));
        assert_eq!(f.resolver.set_m2_compatible(true), Ok(()));
    }

    #[test]
    fn test_invalid_root_uri() {
        let accessor = Arc::new(InMemoryResourceAccessor::new());
        let diagnostics = Arc::new(RecordingDiagnostics::new());
        assert!(MavenResolver::new("test", "not a uri at all", accessor, diagnostics).is_err());
    }

    #[test]
    fn test_metadata_artifact_name() {
        let mut f = fixture();

        assert_eq!(
            f.resolver.metadata_artifact_name("thing"),
            Some(ArtifactDescriptor::new("thing", "pom", "pom", None))
        );

        f.resolver.set_use_poms(false);
        assert_eq!(f.resolver.metadata_artifact_name("thing"), None);
    }

    #[test]
    fn test_artifact_root_candidate_order() {
        let mut f = fixture();
        f.resolver.add_artifact_root("https://mirror.example.org/m2", None).unwrap();

        let artifact_resolver = f.resolver.create_artifact_resolver(&ModuleSource::Plain);
        let jar = ArtifactDescriptor::new("thing", "jar", "jar", None);

        assert_eq!(
            artifact_resolver.artifact_locations(&thing("1.0"), &jar),
            vec![
                "https://repo.example.org/m2/org/example/thing/1.0/thing-1.0.jar".to_string(),
                "https://mirror.example.org/m2/org/example/thing/1.0/thing-1.0.jar".to_string(),
            ]
        );
        // overrides contribute artifact locations only, never descriptor locations
        assert_eq!(
            artifact_resolver.descriptor_locations(
                &thing("1.0"),
                &ArtifactDescriptor::new("thing", "pom", "pom", None)
            ),
            vec!["https://repo.example.org/m2/org/example/thing/1.0/thing-1.0.pom".to_string()]
        );
    }

    #[test]
    fn test_set_pattern_regenerates_locations() {
        let mut f = fixture();
        f.resolver.set_pattern("[module]/[revision]/[artifact].[ext]");

        let artifact_resolver = f.resolver.create_artifact_resolver(&ModuleSource::Plain);
        let jar = ArtifactDescriptor::new("thing", "jar", "jar", None);

        assert_eq!(
            artifact_resolver.artifact_locations(&thing("1.0"), &jar),
            vec!["https://repo.example.org/m2/thing/1.0/thing.jar".to_string()]
        );
    }

    #[rstest]
    #[case::timestamp_and_build_number(Some("3"), "20240101.120000-3")]
    #[case::absent_build_number_keeps_trailing_hyphen(None, "20240101.120000-")]
    #[tokio::test]
    async fn test_find_unique_snapshot_version(
        #[case] build_number: Option<&str>,
        #[case] expected_identity: &str,
    ) {
        let f = fixture();
        f.accessor.put(
            METADATA_LOCATION,
            snapshot_metadata_document("20240101.120000", build_number),
        );

        let source = f.resolver.find_unique_snapshot_version(&thing("2.0-SNAPSHOT")).await;

        assert_eq!(
            source,
            Some(ModuleSource::UniqueSnapshot(expected_identity.to_string()))
        );
    }

    #[tokio::test]
    async fn test_find_unique_snapshot_version_without_timestamp() {
        let f = fixture();
        f.accessor.put(
            METADATA_LOCATION,
            "<metadata><versioning><snapshot><buildNumber>3</buildNumber></snapshot></versioning></metadata>",
        );

        assert_eq!(f.resolver.find_unique_snapshot_version(&thing("2.0-SNAPSHOT")).await, None);
    }

    #[tokio::test]
    async fn test_find_unique_snapshot_version_metadata_missing() {
        let f = fixture();

        assert_eq!(f.resolver.find_unique_snapshot_version(&thing("2.0-SNAPSHOT")).await, None);
        assert!(f.diagnostics.warnings().is_empty());
    }

    #[tokio::test]
    async fn test_find_unique_snapshot_version_metadata_access_failure() {
        let f = fixture();
        f.accessor.put_broken(METADATA_LOCATION);

        assert_eq!(f.resolver.find_unique_snapshot_version(&thing("2.0-SNAPSHOT")).await, None);
        assert_eq!(f.diagnostics.warnings().len(), 1);
    }

    #[tokio::test]
    async fn test_metadata_skipped_for_non_m2_pattern() {
        let mut f = fixture();
        f.resolver.set_pattern("[module]/[revision]/[artifact].[ext]");
        // would warn if the loader consulted it
        f.accessor.put_broken("https://repo.example.org/m2/thing/2.0-SNAPSHOT/maven-metadata.xml");

        assert_eq!(f.resolver.find_unique_snapshot_version(&thing("2.0-SNAPSHOT")).await, None);
        assert!(f.diagnostics.warnings().is_empty());
    }

    #[tokio::test]
    async fn test_metadata_skipped_when_disabled() {
        let mut f = fixture();
        f.resolver.set_use_maven_metadata(false);
        f.accessor.put_broken(METADATA_LOCATION);

        assert_eq!(f.resolver.find_unique_snapshot_version(&thing("2.0-SNAPSHOT")).await, None);
        assert!(f.diagnostics.warnings().is_empty());
        // the toggle itself is discouraged
        assert_eq!(f.diagnostics.advisories().len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_static_module() {
        let f = fixture();
        f.accessor.put(
            "https://repo.example.org/m2/org/example/thing/1.0/thing-1.0.pom",
            "<project><packaging>war</packaging></project>",
        );

        let result = f.resolver.resolve_module(&thing("1.0")).await;

        let metadata = result.metadata().unwrap();
        assert_eq!(metadata.packaging, "war");
        assert_eq!(metadata.source, ModuleSource::Plain);
    }

    #[tokio::test]
    async fn test_resolve_module_missing() {
        let f = fixture();

        let result = f.resolver.resolve_module(&thing("1.0")).await;

        assert_eq!(result.state(), ResolveState::Missing);
    }

    #[tokio::test]
    async fn test_resolve_module_descriptor_access_failure() {
        let f = fixture();
        f.accessor.put_broken("https://repo.example.org/m2/org/example/thing/1.0/thing-1.0.pom");

        let result = f.resolver.resolve_module(&thing("1.0")).await;

        assert_eq!(result.state(), ResolveState::Failed);
    }

    #[tokio::test]
    async fn test_resolve_unique_snapshot_module() {
        let f = fixture();
        f.accessor.put(METADATA_LOCATION, snapshot_metadata_document("20240101.120000", Some("3")));
        f.accessor.put(
            "https://repo.example.org/m2/org/example/thing/2.0-SNAPSHOT/thing-2.0-20240101.120000-3.pom",
            "<project><packaging>jar</packaging></project>",
        );

        let result = f.resolver.resolve_module(&thing("2.0-SNAPSHOT")).await;

        let metadata = result.metadata().unwrap();
        assert_eq!(
            metadata.source,
            ModuleSource::UniqueSnapshot("20240101.120000-3".to_string())
        );
    }

    #[tokio::test]
    async fn test_resolve_snapshot_without_metadata_degrades_to_static() {
        let f = fixture();
        f.accessor.put(
            "https://repo.example.org/m2/org/example/thing/2.0-SNAPSHOT/thing-2.0-SNAPSHOT.pom",
            "<project><packaging>jar</packaging></project>",
        );

        let result = f.resolver.resolve_module(&thing("2.0-SNAPSHOT")).await;

        assert_eq!(result.metadata().unwrap().source, ModuleSource::Plain);
    }

    #[tokio::test]
    async fn test_resolve_without_descriptors_probes_jar() {
        let mut f = fixture();
        f.resolver.set_use_poms(false);
        f.accessor.put(
            "https://repo.example.org/m2/org/example/thing/1.0/thing-1.0.jar",
            "jar bytes",
        );

        let result = f.resolver.resolve_module(&thing("1.0")).await;

        let metadata = result.metadata().unwrap();
        assert_eq!(metadata.packaging, "jar");

        // without the artifact, the module is missing
        let result = f.resolver.resolve_module(&thing("2.0")).await;
        assert_eq!(result.state(), ResolveState::Missing);
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let f = fixture();
        f.accessor.put(METADATA_LOCATION, snapshot_metadata_document("20240101.120000", Some("3")));
        f.accessor.put(
            "https://repo.example.org/m2/org/example/thing/2.0-SNAPSHOT/thing-2.0-20240101.120000-3.pom",
            "<project><packaging>jar</packaging></project>",
        );

        let first = f.resolver.resolve_module(&thing("2.0-SNAPSHOT")).await;
        let second = f.resolver.resolve_module(&thing("2.0-SNAPSHOT")).await;

        assert_eq!(first.state(), second.state());
        assert_eq!(first.metadata(), second.metadata());
    }

    #[tokio::test]
    async fn test_unique_snapshot_artifact_path_end_to_end() {
        let f = fixture();
        f.accessor.put(
            "https://repo.example.org/m2/com/example/lib/2.0-SNAPSHOT/maven-metadata.xml",
            snapshot_metadata_document("20240505.010203", Some("7")),
        );
        f.accessor.put(
            "https://repo.example.org/m2/com/example/lib/2.0-SNAPSHOT/lib-2.0-20240505.010203-7.pom",
            "<project><packaging>jar</packaging></project>",
        );
        f.accessor.put(
            "https://repo.example.org/m2/com/example/lib/2.0-SNAPSHOT/lib-2.0-20240505.010203-7.jar",
            "jar bytes",
        );

        let coordinate = ModuleCoordinate::new("com.example", "lib", "2.0-SNAPSHOT");
        let result = f.resolver.resolve_module(&coordinate).await;
        let metadata = result.metadata().unwrap();

        let artifact_resolver = f.resolver.create_artifact_resolver(&metadata.source);
        let location = artifact_resolver
            .resolve_artifact_location(&coordinate, &metadata.artifact("jar", "jar", None))
            .await
            .unwrap()
            .unwrap();

        assert!(location.contains("2.0-20240505.010203-7"));
        assert!(!location.ends_with("2.0-SNAPSHOT.jar"));
    }
}
