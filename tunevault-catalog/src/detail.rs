//! Recording detail assembly
//!
//! Builds the full detail view for one recording by chaining both stores:
//!
//! 1. Load the recording row (title, genre, artist, cid1)
//! 2. Fetch the metadata blob at `cid1` and decode it (two levels)
//! 3. Fetch the cover art at `imageCid`, base64-encoded for transport
//! 4. Resolve composer ids to nicknames
//! 5. Resolve song-writer ids to nicknames
//! 6. Merge
//!
//! Steps 3-5 only depend on step 2 and run concurrently; ids within a list are
//! resolved concurrently as well and re-aligned with their input positions.
//! Any failure aborts the whole lookup, a partial view is never produced.

use base64::Engine;
use futures::future::try_join_all;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::blob::{decode_song_info, DecodeError, UserId};
use crate::content::{fetch_blob, ContentStore, FetchPolicy};
use crate::db::CatalogStore;
use crate::error::{CatalogError, CatalogResult, UserRole};

/// Composite detail payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailView {
    pub id: i64,
    pub title: String,
    pub artist_id: Option<Value>,
    pub artist: String,
    pub album: Option<String>,
    /// Cover art, standard base64
    pub image: String,
    pub lyrics: Option<String>,
    pub genre: String,
    pub composer_id: Vec<UserId>,
    /// Nicknames aligned with `composer_id`
    pub composer: Vec<String>,
    pub song_writer_id: Vec<UserId>,
    /// Nicknames aligned with `song_writer_id`
    pub song_writer: Vec<String>,
}

/// Store handles for one detail lookup
///
/// Holds no state of its own, so one value can serve any number of
/// concurrent lookups.
#[derive(Clone, Copy)]
pub struct DetailPipeline<'a> {
    catalog: &'a dyn CatalogStore,
    content: &'a dyn ContentStore,
    fetch_policy: &'a FetchPolicy,
}

impl<'a> DetailPipeline<'a> {
    pub fn new(
        catalog: &'a dyn CatalogStore,
        content: &'a dyn ContentStore,
        fetch_policy: &'a FetchPolicy,
    ) -> Self {
        Self {
            catalog,
            content,
            fetch_policy,
        }
    }

    pub async fn assemble(&self, id: i64) -> CatalogResult<DetailView> {
        let recording = self
            .catalog
            .recording_summary(id)
            .await?
            .ok_or(CatalogError::NotFound(id))?;

        let metadata = fetch_blob(self.content, &recording.cid1, self.fetch_policy).await?;
        let song_info = decode_song_info(&metadata)?;
        debug!(
            recording_id = id,
            cid = %recording.cid1,
            composers = song_info.composer_id.len(),
            song_writers = song_info.song_writer_id.len(),
            "Decoded track metadata"
        );

        let image_cid = song_info
            .image_cid
            .as_deref()
            .ok_or(DecodeError::MissingField("imageCid"))?;

        let (image, composer, song_writer) = tokio::try_join!(
            self.fetch_image(image_cid),
            self.resolve_nicknames(&song_info.composer_id, UserRole::Composer),
            self.resolve_nicknames(&song_info.song_writer_id, UserRole::SongWriter),
        )?;

        info!(recording_id = id, image_bytes = image.len(), "Assembled recording detail");

        Ok(DetailView {
            id,
            title: recording.title,
            artist_id: song_info.artist_id,
            artist: recording.artist,
            album: song_info.album,
            image: base64::engine::general_purpose::STANDARD.encode(&image),
            lyrics: song_info.lyrics,
            genre: recording.genre,
            composer_id: song_info.composer_id,
            composer,
            song_writer_id: song_info.song_writer_id,
            song_writer,
        })
    }

    async fn fetch_image(&self, cid: &str) -> CatalogResult<Vec<u8>> {
        Ok(fetch_blob(self.content, cid, self.fetch_policy).await?)
    }

    /// Resolve every id to a nickname, output aligned with `ids`
    ///
    /// Repeated ids are looked up independently. A missing user, or an id
    /// that is not an integer, fails the whole list.
    async fn resolve_nicknames(&self, ids: &[UserId], role: UserRole) -> CatalogResult<Vec<String>> {
        try_join_all(ids.iter().map(|id| async move {
            let dangling = || CatalogError::DanglingReference {
                role,
                id: id.clone(),
            };
            let key = id.key().ok_or_else(dangling)?;

            self.catalog.user_nickname(key).await?.ok_or_else(dangling)
        }))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::MemoryStore;
    use crate::db::{Recording, RecordingSummary, StoreError};
    use crate::query::{GenreFilter, SearchFilter};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// In-memory catalog with optional per-user lookup delays
    #[derive(Default)]
    struct FakeCatalog {
        recordings: HashMap<i64, RecordingSummary>,
        users: HashMap<i64, String>,
        delays: HashMap<i64, Duration>,
        lookups: AtomicUsize,
    }

    impl FakeCatalog {
        fn with_recording(mut self, id: i64, cid1: &str) -> Self {
            self.recordings.insert(
                id,
                RecordingSummary {
                    title: "Spring Day".to_string(),
                    genre: "K-Pop".to_string(),
                    artist: "BTS".to_string(),
                    cid1: cid1.to_string(),
                },
            );
            self
        }

        fn with_user(mut self, id: i64, nickname: &str) -> Self {
            self.users.insert(id, nickname.to_string());
            self
        }

        fn with_delay(mut self, id: i64, delay: Duration) -> Self {
            self.delays.insert(id, delay);
            self
        }
    }

    #[async_trait]
    impl CatalogStore for FakeCatalog {
        async fn search_recordings(&self, _: &SearchFilter) -> Result<Vec<Recording>, StoreError> {
            Ok(Vec::new())
        }

        async fn recordings_by_genre(&self, _: &GenreFilter) -> Result<Vec<Recording>, StoreError> {
            Ok(Vec::new())
        }

        async fn recording_summary(&self, id: i64) -> Result<Option<RecordingSummary>, StoreError> {
            Ok(self.recordings.get(&id).cloned())
        }

        async fn user_nickname(&self, id: i64) -> Result<Option<String>, StoreError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delays.get(&id) {
                tokio::time::sleep(*delay).await;
            }
            Ok(self.users.get(&id).cloned())
        }
    }

    fn song_info_blob(composers: &[i64], song_writers: &[i64]) -> String {
        let inner = serde_json::json!({
            "artistId": 3,
            "album": "You Never Walk Alone",
            "lyrics": "...",
            "imageCid": "img",
            "composerId": composers,
            "songWriterId": song_writers,
        });
        serde_json::json!({ "songInfo": inner.to_string() }).to_string()
    }

    fn policy() -> FetchPolicy {
        FetchPolicy {
            timeout: Duration::from_secs(2),
            attempts: 1,
            initial_backoff: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_assembles_full_view() {
        let catalog = FakeCatalog::default()
            .with_recording(42, "meta")
            .with_user(7, "Alice")
            .with_user(9, "Bob");
        let content = MemoryStore::new()
            .with_blob("meta", song_info_blob(&[7, 9], &[9]))
            .with_chunks("img", [&b"\x89PN"[..], &b"G\r\n"[..], &b"\x1a\n"[..]]);
        let policy = policy();

        let view = DetailPipeline::new(&catalog, &content, &policy)
            .assemble(42)
            .await
            .unwrap();

        assert_eq!(view.id, 42);
        assert_eq!(view.title, "Spring Day");
        assert_eq!(view.artist, "BTS");
        assert_eq!(view.genre, "K-Pop");
        assert_eq!(view.artist_id, Some(serde_json::json!(3)));
        assert_eq!(view.album.as_deref(), Some("You Never Walk Alone"));
        assert_eq!(
            view.image,
            base64::engine::general_purpose::STANDARD.encode(b"\x89PNG\r\n\x1a\n")
        );
        assert_eq!(view.composer, vec!["Alice", "Bob"]);
        assert_eq!(view.song_writer, vec!["Bob"]);
    }

    #[tokio::test]
    async fn test_names_stay_aligned_when_first_lookup_is_slowest() {
        let catalog = FakeCatalog::default()
            .with_recording(1, "meta")
            .with_user(7, "Alice")
            .with_user(9, "Bob")
            .with_delay(7, Duration::from_millis(50));
        let content = MemoryStore::new()
            .with_blob("meta", song_info_blob(&[7, 9], &[9, 7]))
            .with_blob("img", "x");
        let policy = policy();

        let view = DetailPipeline::new(&catalog, &content, &policy)
            .assemble(1)
            .await
            .unwrap();

        assert_eq!(view.composer_id, vec![7, 9]);
        assert_eq!(view.composer, vec!["Alice", "Bob"]);
        assert_eq!(view.song_writer_id, vec![9, 7]);
        assert_eq!(view.song_writer, vec!["Bob", "Alice"]);
    }

    #[tokio::test]
    async fn test_duplicate_ids_resolved_independently() {
        let catalog = FakeCatalog::default()
            .with_recording(1, "meta")
            .with_user(7, "Alice");
        let content = MemoryStore::new()
            .with_blob("meta", song_info_blob(&[7, 7, 7], &[]))
            .with_blob("img", "x");
        let policy = policy();

        let view = DetailPipeline::new(&catalog, &content, &policy)
            .assemble(1)
            .await
            .unwrap();

        assert_eq!(view.composer, vec!["Alice", "Alice", "Alice"]);
        assert!(view.song_writer.is_empty());
        assert_eq!(catalog.lookups.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_dangling_composer_fails_request() {
        let catalog = FakeCatalog::default()
            .with_recording(1, "meta")
            .with_user(7, "Alice");
        let content = MemoryStore::new()
            .with_blob("meta", song_info_blob(&[7, 9], &[]))
            .with_blob("img", "x");
        let policy = policy();

        let err = DetailPipeline::new(&catalog, &content, &policy)
            .assemble(1)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CatalogError::DanglingReference {
                role: UserRole::Composer,
                id: UserId::Number(9)
            }
        ));
    }

    #[tokio::test]
    async fn test_dangling_song_writer_fails_request() {
        let catalog = FakeCatalog::default()
            .with_recording(1, "meta")
            .with_user(7, "Alice");
        let content = MemoryStore::new()
            .with_blob("meta", song_info_blob(&[7], &[11]))
            .with_blob("img", "x");
        let policy = policy();

        let err = DetailPipeline::new(&catalog, &content, &policy)
            .assemble(1)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CatalogError::DanglingReference {
                role: UserRole::SongWriter,
                id: UserId::Number(11)
            }
        ));
    }

    #[tokio::test]
    async fn test_string_ids_resolve_and_echo_unchanged() {
        let catalog = FakeCatalog::default()
            .with_recording(1, "meta")
            .with_user(7, "Alice")
            .with_user(9, "Bob");
        let blob = serde_json::json!({
            "songInfo": serde_json::json!({
                "imageCid": "img",
                "composerId": ["7", 9],
                "songWriterId": ["9"],
            })
            .to_string()
        });
        let content = MemoryStore::new()
            .with_blob("meta", blob.to_string())
            .with_blob("img", "x");
        let policy = policy();

        let view = DetailPipeline::new(&catalog, &content, &policy)
            .assemble(1)
            .await
            .unwrap();

        assert_eq!(view.composer, vec!["Alice", "Bob"]);
        assert_eq!(view.song_writer, vec!["Bob"]);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["composerId"], serde_json::json!(["7", 9]));
        assert_eq!(json["songWriterId"], serde_json::json!(["9"]));
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_dangling_reference() {
        let catalog = FakeCatalog::default()
            .with_recording(1, "meta")
            .with_user(7, "Alice");
        let blob = serde_json::json!({
            "songInfo": { "imageCid": "img", "composerId": [7, "abc"] }
        });
        let content = MemoryStore::new()
            .with_blob("meta", blob.to_string())
            .with_blob("img", "x");
        let policy = policy();

        let err = DetailPipeline::new(&catalog, &content, &policy)
            .assemble(1)
            .await
            .unwrap_err();

        match err {
            CatalogError::DanglingReference { role, id } => {
                assert_eq!(role, UserRole::Composer);
                assert_eq!(id, UserId::Text("abc".into()));
            }
            other => panic!("expected dangling reference, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_recording() {
        let catalog = FakeCatalog::default();
        let content = MemoryStore::new();
        let policy = policy();

        let err = DetailPipeline::new(&catalog, &content, &policy)
            .assemble(5)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(5)));
    }

    #[tokio::test]
    async fn test_missing_metadata_blob_is_fetch_error() {
        let catalog = FakeCatalog::default().with_recording(1, "gone");
        let content = MemoryStore::new();
        let policy = policy();

        let err = DetailPipeline::new(&catalog, &content, &policy)
            .assemble(1)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Fetch(_)));
    }

    #[tokio::test]
    async fn test_malformed_metadata_is_decode_error() {
        let catalog = FakeCatalog::default().with_recording(1, "meta");
        let content = MemoryStore::new().with_blob("meta", r#"{"songInfo": "{not json"}"#);
        let policy = policy();

        let err = DetailPipeline::new(&catalog, &content, &policy)
            .assemble(1)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Decode(DecodeError::Json(_))));
    }

    #[tokio::test]
    async fn test_metadata_without_image_cid_is_decode_error() {
        let catalog = FakeCatalog::default().with_recording(1, "meta");
        let content = MemoryStore::new().with_blob("meta", r#"{"songInfo": "{\"album\":\"X\"}"}"#);
        let policy = policy();

        let err = DetailPipeline::new(&catalog, &content, &policy)
            .assemble(1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Decode(DecodeError::MissingField("imageCid"))
        ));
    }

    #[tokio::test]
    async fn test_missing_image_fails_request() {
        let catalog = FakeCatalog::default()
            .with_recording(1, "meta")
            .with_user(7, "Alice");
        let content = MemoryStore::new().with_blob("meta", song_info_blob(&[7], &[]));
        let policy = policy();

        let err = DetailPipeline::new(&catalog, &content, &policy)
            .assemble(1)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Fetch(_)));
    }

    #[test]
    fn test_view_serializes_camel_case() {
        let view = DetailView {
            id: 1,
            title: "t".into(),
            artist_id: Some(serde_json::json!(3)),
            artist: "a".into(),
            album: None,
            image: String::new(),
            lyrics: None,
            genre: "g".into(),
            composer_id: vec![UserId::Number(7), UserId::Text("9".into())],
            composer: vec!["Alice".into(), "Bob".into()],
            song_writer_id: vec![],
            song_writer: vec![],
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["artistId"], 3);
        assert_eq!(json["composerId"], serde_json::json!([7, "9"]));
        assert_eq!(json["songWriter"], serde_json::json!([]));
        assert!(json["album"].is_null());
    }
}
