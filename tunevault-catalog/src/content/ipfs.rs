//! IPFS node client over the Kubo HTTP RPC API
//!
//! `POST {api}/api/v0/cat?arg=<cid>` streams the raw content back; the body
//! is forwarded chunk by chunk without buffering.

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use tracing::debug;

use super::{ChunkStream, ContentStore, FetchError};

#[derive(Debug, Clone)]
pub struct IpfsClient {
    client: reqwest::Client,
    api_url: String,
}

impl IpfsClient {
    /// Client for the node at `api_url` (e.g. `http://127.0.0.1:5001`)
    pub fn new(api_url: impl Into<String>) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("tunevault-catalog/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_client(client, api_url))
    }

    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self { client, api_url }
    }

    fn cat_url(&self) -> String {
        format!("{}/api/v0/cat", self.api_url)
    }
}

#[async_trait]
impl ContentStore for IpfsClient {
    fn name(&self) -> &'static str {
        "ipfs"
    }

    async fn cat(&self, cid: &str) -> Result<ChunkStream, FetchError> {
        if cid.is_empty() || cid.chars().any(|c| !c.is_ascii_alphanumeric()) {
            return Err(FetchError::InvalidCid(cid.to_string()));
        }

        debug!(cid, "Requesting content from IPFS node");

        let response = self
            .client
            .post(self.cat_url())
            .query(&[("arg", cid)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                cid: cid.to_string(),
            });
        }

        Ok(response.bytes_stream().map_err(FetchError::from).boxed())
    }
}
