//! Video Repository
//!
//! CRUD over the whole collection. Every call reads `videos.json` in full, and
//! every mutation re-sorts and atomically rewrites it in full.

use std::sync::Arc;

use rand::rngs::OsRng;
use serde::de::IgnoredAny;
use tracing::{debug, info};

use super::models::{sort_by_log_date, VideoDraft, VideoEntry};
use crate::core::clock::{Clock, SystemClock};
use crate::core::store::EntityStore;
use crate::core::{CoreError, CoreResult, VideoId};

/// Random bytes per generated ID (hex-encoded to twice as many chars).
const ID_BYTES: usize = 8;

/// Generates a fresh ID from the OS CSPRNG.
pub fn generate_video_id() -> VideoId {
    let mut bytes = [0u8; ID_BYTES];
    rand::Rng::fill(&mut OsRng, &mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Repository over the persisted video collection.
pub struct VideoRepository {
    store: EntityStore,
    clock: Arc<dyn Clock>,
}

impl VideoRepository {
    pub fn new(store: EntityStore) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: EntityStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// All entries, newest `log_date` first.
    pub fn list(&self) -> CoreResult<Vec<VideoEntry>> {
        let mut videos = self.load_all()?;
        sort_by_log_date(&mut videos);
        Ok(videos)
    }

    /// Stores a new entry, stamping a fresh ID and `created_at`.
    pub fn create(&self, draft: VideoDraft) -> CoreResult<VideoEntry> {
        draft.validate()?;

        let mut videos = self.load_all()?;

        let mut id = generate_video_id();
        while videos.iter().any(|v| v.id == id) {
            debug!("Generated video ID {} already in use, drawing again", id);
            id = generate_video_id();
        }

        let entry = VideoEntry::from_draft(id, draft, self.clock.now());
        videos.push(entry.clone());
        self.save_all(videos)?;

        info!("Logged video {} ({})", entry.id, entry.title);
        Ok(entry)
    }

    /// Replaces an existing entry. The stored `created_at` always wins over the
    /// caller's value.
    pub fn update(&self, mut entry: VideoEntry) -> CoreResult<VideoEntry> {
        entry.validate()?;

        let mut videos = self.load_all()?;
        let slot = videos
            .iter_mut()
            .find(|v| v.id == entry.id)
            .ok_or_else(|| CoreError::NotFound(entry.id.clone()))?;

        entry.created_at = slot.created_at;
        *slot = entry.clone();
        self.save_all(videos)?;

        debug!("Updated video {}", entry.id);
        Ok(entry)
    }

    /// Removes an entry. The file is not touched when `id` is unknown.
    pub fn delete(&self, id: &str) -> CoreResult<()> {
        let videos = self.load_all()?;
        let before = videos.len();
        let remaining: Vec<VideoEntry> = videos.into_iter().filter(|v| v.id != id).collect();

        if remaining.len() == before {
            return Err(CoreError::NotFound(id.to_string()));
        }

        self.save_all(remaining)?;
        info!("Deleted video {}", id);
        Ok(())
    }

    pub fn find_by_id(&self, id: &str) -> CoreResult<VideoEntry> {
        self.load_all()?
            .into_iter()
            .find(|v| v.id == id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))
    }

    /// Number of stored entries. Counts array elements without decoding them.
    pub fn count(&self) -> CoreResult<usize> {
        let path = self.store.videos_path();
        let Some(bytes) = self.store.load_bytes(&path)? else {
            return Ok(0);
        };
        serde_json::from_slice::<Vec<IgnoredAny>>(&bytes)
            .map(|items| items.len())
            .map_err(|e| CoreError::parse(path, e))
    }

    fn load_all(&self) -> CoreResult<Vec<VideoEntry>> {
        let path = self.store.videos_path();
        Ok(self.store.load_json(&path)?.unwrap_or_default())
    }

    fn save_all(&self, mut videos: Vec<VideoEntry>) -> CoreResult<()> {
        sort_by_log_date(&mut videos);
        self.store.write_json(&self.store.videos_path(), &videos)?;
        debug!("Persisted {} videos", videos.len());
        Ok(())
    }
}
