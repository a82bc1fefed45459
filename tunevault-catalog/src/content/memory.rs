//! In-process content store
//!
//! Holds blobs as pre-split chunk lists, so callers control exactly how a
//! blob is chunked on the way out. Used by tests and for embedding the
//! catalog without an external store.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;

use super::{ChunkStream, ContentStore, FetchError};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blobs: HashMap<String, Vec<Bytes>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `cid` as the given chunks, in order
    pub fn with_chunks<I, C>(mut self, cid: impl Into<String>, chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Bytes>,
    {
        self.blobs
            .insert(cid.into(), chunks.into_iter().map(Into::into).collect());
        self
    }

    /// Register `cid` as a single chunk
    pub fn with_blob(self, cid: impl Into<String>, blob: impl Into<Bytes>) -> Self {
        self.with_chunks(cid, [blob.into()])
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn cat(&self, cid: &str) -> Result<ChunkStream, FetchError> {
        let chunks = self
            .blobs
            .get(cid)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(cid.to_string()))?;

        Ok(stream::iter(chunks.into_iter().map(Ok)).boxed())
    }
}
