#![allow(non_snake_case)]

use std::sync::Arc;

use serde::Deserialize;
use tracing::trace;

use crate::engine::resource::{fetch_bytes, ExternalResourceAccessor, ResourceError};

/// The snapshot-relevant part of a maven-metadata.xml document. Both fields absent
///  means "no unique snapshot information available", which is a valid outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotMetadata {
    pub timestamp: Option<String>,
    pub build_number: Option<String>,
}

/// Fetches and parses the maven-metadata.xml document describing the latest unique
///  build of a snapshot version.
pub struct MavenMetadataLoader {
    accessor: Arc<dyn ExternalResourceAccessor>,
}

impl MavenMetadataLoader {
    pub fn new(accessor: Arc<dyn ExternalResourceAccessor>) -> MavenMetadataLoader {
        MavenMetadataLoader { accessor }
    }

    pub async fn load(&self, location: &str) -> Result<SnapshotMetadata, ResourceError> {
        trace!("loading maven metadata from {}", location);

        let bytes = fetch_bytes(&*self.accessor, location).await?;
        let document = std::str::from_utf8(&bytes)
            .map_err(|e| ResourceError::Access(e.into()))?;
        parse(document)
    }
}

fn parse(document: &str) -> Result<SnapshotMetadata, ResourceError> {
    let metadata: MetadataXml = serde_xml_rs::from_str(document).map_err(|e| {
        ResourceError::Access(anyhow::anyhow!("cannot parse maven-metadata.xml: {}", e))
    })?;

    let snapshot = metadata.versioning.and_then(|v| v.snapshot);
    Ok(match snapshot {
        Some(snapshot) => SnapshotMetadata {
            timestamp: snapshot.timestamp,
            build_number: snapshot.buildNumber,
        },
        None => SnapshotMetadata::default(),
    })
}

// field names follow the XML element names, https://maven.apache.org/ref/3.9.5/maven-repository-metadata/repository-metadata.html

#[derive(Deserialize)]
struct MetadataXml {
    versioning: Option<VersioningXml>,
}

#[derive(Deserialize)]
struct VersioningXml {
    snapshot: Option<SnapshotXml>,
}

#[derive(Deserialize)]
struct SnapshotXml {
    timestamp: Option<String>,
    buildNumber: Option<String>,
}
