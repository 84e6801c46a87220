use anyhow::Context;
use serde::Deserialize;

use crate::maven::coordinates::{ArtifactDescriptor, ModuleCoordinate, ModuleSource};

/// Packagings whose primary artifact is known to be a plain jar archive. For these
///  the local cache can answer artifact lookups without a remote probe.
const JAR_PACKAGINGS: [&str; 5] = ["jar", "ejb", "bundle", "maven-plugin", "eclipse-plugin"];

/// Module metadata as far as this resolver consumes it: the coordinate it was
///  resolved for, the declared packaging, and the module source the resolution is
///  bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleMetadata {
    pub id: ModuleCoordinate,
    pub packaging: String,
    pub source: ModuleSource,
}

impl ModuleMetadata {
    /// Extracts the consumed fields from a pom document. A missing packaging
    ///  element means the default, "jar".
    pub fn parse_pom(
        id: &ModuleCoordinate,
        source: &ModuleSource,
        document: &str,
    ) -> anyhow::Result<ModuleMetadata> {
        let pom: PomXml = serde_xml_rs::from_str(document)
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("cannot parse pom for {}:{}:{}", id.group, id.name, id.version))?;

        Ok(ModuleMetadata {
            id: id.clone(),
            packaging: pom.packaging.unwrap_or_else(|| "jar".to_string()),
            source: source.clone(),
        })
    }

    /// Metadata synthesized from an artifact's presence when descriptors are
    ///  disabled.
    pub fn default_jar(id: &ModuleCoordinate, source: &ModuleSource) -> ModuleMetadata {
        ModuleMetadata {
            id: id.clone(),
            packaging: "jar".to_string(),
            source: source.clone(),
        }
    }

    pub fn is_pom_packaging(&self) -> bool {
        self.packaging == "pom"
    }

    pub fn is_known_jar_packaging(&self) -> bool {
        JAR_PACKAGINGS.contains(&self.packaging.as_str())
    }

    /// Synthesizes a descriptor for one of this module's artifacts, named after
    ///  the module.
    pub fn artifact(
        &self,
        kind: &str,
        extension: &str,
        classifier: Option<&str>,
    ) -> ArtifactDescriptor {
        ArtifactDescriptor::new(self.id.name.clone(), kind, extension, classifier)
    }
}

#[derive(Deserialize)]
struct PomXml {
    packaging: Option<String>,
}
