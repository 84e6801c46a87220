use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::anyhow;
use async_trait::async_trait;
use bytes::Bytes;

use crate::engine::resource::{ExternalResourceAccessor, ResourceError};
use crate::util::blob::Blob;

enum StoredResource {
    Content(Bytes),
    // any access fails with an access error, as if the transport had broken down
    Broken,
}

/// in-memory resource accessor, neither optimized nor particularly robust - for
///  fixtures and testing purposes
pub struct InMemoryResourceAccessor {
    resources: Mutex<HashMap<String, StoredResource>>,
}

impl InMemoryResourceAccessor {
    pub fn new() -> InMemoryResourceAccessor {
        InMemoryResourceAccessor {
            resources: Default::default(),
        }
    }

    pub fn put(&self, location: impl Into<String>, content: impl Into<Bytes>) {
        self.resources
            .lock()
            .unwrap()
            .insert(location.into(), StoredResource::Content(content.into()));
    }

    pub fn put_broken(&self, location: impl Into<String>) {
        self.resources
            .lock()
            .unwrap()
            .insert(location.into(), StoredResource::Broken);
    }
}

#[async_trait]
impl ExternalResourceAccessor for InMemoryResourceAccessor {
    async fn get(&self, location: &str) -> Result<Blob, ResourceError> {
        match self.resources.lock().unwrap().get(location) {
            Some(StoredResource::Content(bytes)) => Ok(Blob::from_bytes(bytes.clone())),
            Some(StoredResource::Broken) => {
                Err(ResourceError::Access(anyhow!("cannot access {}", location)))
            }
            None => Err(ResourceError::NotFound),
        }
    }

    async fn exists(&self, location: &str) -> Result<bool, ResourceError> {
        match self.resources.lock().unwrap().get(location) {
            Some(StoredResource::Content(_)) => Ok(true),
            Some(StoredResource::Broken) => {
                Err(ResourceError::Access(anyhow!("cannot access {}", location)))
            }
            None => Ok(false),
        }
    }
}
