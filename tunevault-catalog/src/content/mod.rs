//! Content-addressed blob retrieval
//!
//! The catalog only ever reads from the content store: given a content
//! identifier (CID) it receives a lazy, single-use stream of byte chunks.
//! Integrity and availability are the backend's business; the catalog only
//! bounds each attempt in time and retries transient failures
//! (see [`retry::fetch_blob`]).

pub mod directory;
pub mod ipfs;
pub mod memory;
pub mod retry;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use std::time::Duration;
use thiserror::Error;

pub use directory::DirectoryStore;
pub use ipfs::IpfsClient;
pub use memory::MemoryStore;
pub use retry::{fetch_blob, FetchPolicy};

/// Lazy, finite, non-restartable sequence of chunks for one CID
pub type ChunkStream = BoxStream<'static, Result<Bytes, FetchError>>;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Malformed content identifier: {0}")]
    InvalidCid(String),

    #[error("Content not found: {0}")]
    NotFound(String),

    #[error("Content store returned HTTP {status} for {cid}")]
    Status { status: u16, cid: String },

    #[error("Content store transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Content store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Content {cid} failed integrity check")]
    Integrity { cid: String },

    #[error("Content fetch timed out after {0:?}")]
    Timeout(Duration),

    #[error("Content store unavailable: {0}")]
    Unavailable(String),
}

impl FetchError {
    /// Whether another attempt could plausibly succeed
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::InvalidCid(_) | FetchError::NotFound(_) | FetchError::Integrity { .. } => {
                false
            }
            FetchError::Status { status, .. } => *status >= 500,
            FetchError::Http(_)
            | FetchError::Io(_)
            | FetchError::Timeout(_)
            | FetchError::Unavailable(_) => true,
        }
    }
}

/// A store that can stream content by CID
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &'static str;

    /// Open a chunk stream for `cid`
    ///
    /// Errors discovered while draining the stream surface as stream items.
    async fn cat(&self, cid: &str) -> Result<ChunkStream, FetchError>;
}
