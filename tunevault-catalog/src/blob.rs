//! Blob reassembly and decoding
//!
//! Content store fetches arrive as a stream of byte chunks. [`assemble`]
//! drains such a stream into one contiguous buffer; chunk boundaries carry
//! no meaning. The track metadata blob is JSON whose `songInfo` field is
//! itself JSON text, so decoding happens in two levels, each into a typed
//! record.

use futures::{Stream, TryStreamExt};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Blob is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Blob is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("songInfo is neither JSON text nor an object")]
    UnexpectedSongInfo,

    #[error("Track metadata has no {0}")]
    MissingField(&'static str),
}

/// Concatenate a chunk stream, preserving order
///
/// The stream is consumed exactly once. Any chunk error aborts assembly.
pub async fn assemble<S, B, E>(chunks: S) -> Result<Vec<u8>, E>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
{
    chunks
        .try_fold(Vec::new(), |mut buffer, chunk| async move {
            buffer.extend_from_slice(chunk.as_ref());
            Ok(buffer)
        })
        .await
}

/// Parse UTF-8 bytes as JSON
pub fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DecodeError> {
    let text = std::str::from_utf8(bytes)?;
    Ok(serde_json::from_str(text)?)
}

/// User reference as written in the metadata blob
///
/// Writers emit ids both as JSON numbers and as numeric strings. The original
/// form is kept so it can be echoed back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Number(i64),
    Text(String),
}

impl UserId {
    /// Relational key, `None` when the text is not an integer
    pub fn key(&self) -> Option<i64> {
        match self {
            UserId::Number(id) => Some(*id),
            UserId::Text(text) => text.trim().parse().ok(),
        }
    }
}

impl PartialEq<i64> for UserId {
    fn eq(&self, other: &i64) -> bool {
        matches!(self, UserId::Number(id) if id == other)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Number(id) => write!(f, "{}", id),
            UserId::Text(text) => write!(f, "{:?}", text),
        }
    }
}

/// Inner metadata record carried under `songInfo`
///
/// Missing fields decode to their defaults; the detail pipeline decides which
/// ones it actually requires.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SongInfo {
    pub artist_id: Option<Value>,
    pub album: Option<String>,
    pub lyrics: Option<String>,
    pub image_cid: Option<String>,
    pub composer_id: Vec<UserId>,
    pub song_writer_id: Vec<UserId>,
}

#[derive(Debug, Deserialize)]
struct MetadataBlob {
    #[serde(rename = "songInfo")]
    song_info: Value,
}

/// Two-level decode of a track metadata blob
///
/// `songInfo` normally holds JSON text that is parsed again; an inline
/// object is accepted as well.
pub fn decode_song_info(bytes: &[u8]) -> Result<SongInfo, DecodeError> {
    let outer: MetadataBlob = decode_json(bytes)?;

    match outer.song_info {
        Value::String(inner) => decode_json(inner.as_bytes()),
        inner @ Value::Object(_) => Ok(serde_json::from_value(inner)?),
        _ => Err(DecodeError::UnexpectedSongInfo),
    }
}
