use std::pin::Pin;

use bytes::Bytes;
use futures_core::Stream;
use sha1::{Digest, Sha1};

/// A resource payload as a stream of chunks, together with the checksums that are
///  known for it up front (if any). Consumers needing the whole payload drain the
///  stream; pass-through consumers forward it chunk by chunk.
pub struct Blob {
    pub data: Pin<Box<dyn Stream<Item = anyhow::Result<Bytes>> + Send + 'static>>,
    pub md5: Option<[u8; 16]>,
    pub sha1: Option<[u8; 20]>,
}

impl Blob {
    /// Wraps fully materialized data, computing its checksums eagerly.
    pub fn from_bytes(bytes: Bytes) -> Blob {
        let mut sha1_hasher: Sha1 = Default::default();
        sha1_hasher.update(&bytes);

        let mut md5_context = md5::Context::new();
        md5_context.consume(&bytes);

        let stream = futures::stream::once(async move { Ok::<_, anyhow::Error>(bytes) });

        Blob {
            data: Box::pin(stream),
            md5: Some(md5_context.compute().into()),
            sha1: Some(sha1_hasher.finalize().into()),
        }
    }
}
