//! Local sha256-addressed blob directory
//!
//! Each blob lives at `<root>/<cid>` where the CID is the lowercase hex
//! SHA-256 of its contents. Reads stream the file in fixed-size chunks and
//! verify the digest once the last chunk has been read; a mismatch is
//! reported as the final stream item.

use async_trait::async_trait;
use futures::StreamExt;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio_util::io::ReaderStream;
use tracing::warn;

use super::{ChunkStream, ContentStore, FetchError};

const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// CID under which `data` is stored
    pub fn cid_for(data: &[u8]) -> String {
        hex::encode(Sha256::digest(data))
    }

    fn blob_path(&self, cid: &str) -> Result<PathBuf, FetchError> {
        // Only a well-formed digest may become a path component
        if cid.len() != 64 || !cid.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(FetchError::InvalidCid(cid.to_string()));
        }
        Ok(self.root.join(cid))
    }
}

#[async_trait]
impl ContentStore for DirectoryStore {
    fn name(&self) -> &'static str {
        "directory"
    }

    async fn cat(&self, cid: &str) -> Result<ChunkStream, FetchError> {
        let path = self.blob_path(cid)?;

        let file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FetchError::NotFound(cid.to_string()));
            }
            Err(e) => return Err(FetchError::Io(e)),
        };

        let cid = cid.to_string();
        let mut chunks = ReaderStream::with_capacity(file, CHUNK_SIZE);

        let stream = async_stream::stream! {
            let mut hasher = Sha256::new();

            while let Some(chunk) = chunks.next().await {
                match chunk {
                    Ok(bytes) => {
                        hasher.update(&bytes);
                        yield Ok(bytes);
                    }
                    Err(e) => {
                        yield Err(FetchError::Io(e));
                        return;
                    }
                }
            }

            let digest = hex::encode(hasher.finalize());
            if digest != cid {
                warn!(cid = %cid, digest = %digest, "Blob content does not match its identifier");
                yield Err(FetchError::Integrity { cid });
            }
        };

        Ok(stream.boxed())
    }
}
