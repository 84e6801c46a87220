use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use thiserror::Error;

use crate::util::blob::Blob;

/// Distinguishes "the resource is not there" from "we could not find out". Callers
///  with a safe default for absence can treat the two differently without
///  inspecting error chains.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("resource not found")]
    NotFound,
    #[error("resource access failed: {0}")]
    Access(#[from] anyhow::Error),
}

/// Transport abstraction for retrieving and probing resources at concrete
///  locations. Implementations do blocking-style I/O per call; there is no retry
///  at this level.
#[async_trait]
pub trait ExternalResourceAccessor: Send + Sync {
    async fn get(&self, location: &str) -> Result<Blob, ResourceError>;

    /// Existence check without retrieving the payload.
    async fn exists(&self, location: &str) -> Result<bool, ResourceError>;
}

/// Drains a resource into memory. Meant for small documents (descriptors,
///  metadata files), not for artifact payloads.
pub async fn fetch_bytes(
    accessor: &dyn ExternalResourceAccessor,
    location: &str,
) -> Result<Bytes, ResourceError> {
    let blob = accessor.get(location).await?;

    let mut data = blob.data;
    let mut buf = Vec::new();
    while let Some(chunk) = data.next().await {
        let chunk = chunk.map_err(ResourceError::Access)?;
        buf.extend_from_slice(&chunk);
    }
    Ok(Bytes::from(buf))
}
