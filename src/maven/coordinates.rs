/// Identifies a module unambiguously within a repository. Immutable once a
///  resolution has started.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleCoordinate {
    pub group: String,
    pub name: String,
    pub version: String,
}

impl ModuleCoordinate {
    pub fn new(group: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> ModuleCoordinate {
        ModuleCoordinate {
            group: group.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    /// Purely syntactic: a version is a snapshot iff it ends with the literal,
    ///  case-sensitive suffix "SNAPSHOT".
    pub fn is_snapshot(&self) -> bool {
        self.version.ends_with("SNAPSHOT")
    }
}

/// Provenance of a resolution, threaded as an immutable value through every
///  artifact lookup belonging to that resolution. Only `UniqueSnapshot` alters
///  path construction downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleSource {
    Plain,
    /// Carries the resolved `<timestamp>-<buildNumber>` identity string.
    UniqueSnapshot(String),
}

/// One retrievable artifact of a module: the primary jar, sources, javadoc, or an
///  arbitrary packaging-typed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    pub name: String,
    pub kind: String,
    pub extension: String,
    pub classifier: Option<String>,
}

impl ArtifactDescriptor {
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        extension: impl Into<String>,
        classifier: Option<&str>,
    ) -> ArtifactDescriptor {
        ArtifactDescriptor {
            name: name.into(),
            kind: kind.into(),
            extension: extension.into(),
            classifier: classifier.map(|c| c.to_string()),
        }
    }
}
