//! Bounded, retried blob fetches
//!
//! A chunk stream cannot be restarted, so a retry re-opens the CID and
//! reassembles from scratch. Each attempt (open + full drain) is bounded by
//! `timeout`; only transient failures are retried.
//!
//! **Backoff Strategy:**
//! - Initial delay: `initial_backoff`
//! - Multiplier: 2.0 (exponential)
//! - Max delay: 1000ms

use std::time::Duration;
use tracing::{debug, warn};

use super::{ContentStore, FetchError};
use crate::blob::assemble;

const MAX_BACKOFF: Duration = Duration::from_millis(1000);

/// Time and retry budget for content fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Upper bound for one attempt
    pub timeout: Duration,
    /// Total attempts, including the first (at least 1)
    pub attempts: u32,
    pub initial_backoff: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            attempts: 3,
            initial_backoff: Duration::from_millis(50),
        }
    }
}

/// Fetch and assemble the full content of `cid`
pub async fn fetch_blob(
    store: &dyn ContentStore,
    cid: &str,
    policy: &FetchPolicy,
) -> Result<Vec<u8>, FetchError> {
    let attempts = policy.attempts.max(1);
    let mut backoff = policy.initial_backoff;
    let mut attempt = 0;

    loop {
        attempt += 1;

        let result = tokio::time::timeout(policy.timeout, async {
            let chunks = store.cat(cid).await?;
            assemble(chunks).await
        })
        .await
        .unwrap_or_else(|_| Err(FetchError::Timeout(policy.timeout)));

        let err = match result {
            Ok(bytes) => {
                if attempt > 1 {
                    debug!(store = store.name(), cid, attempt, "Content fetch succeeded after retry");
                }
                return Ok(bytes);
            }
            Err(err) => err,
        };

        if !err.is_transient() || attempt >= attempts {
            return Err(err);
        }

        warn!(
            store = store.name(),
            cid,
            attempt,
            backoff_ms = backoff.as_millis() as u64,
            error = %err,
            "Content fetch failed, will retry after backoff"
        );

        tokio::time::sleep(backoff).await;
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }
}
