//! vidlog Core Library
//!
//! Personal video-watch log.
//! This library contains the crash-safe entity store, the video repository,
//! the settings store and the analytics engine. Front ends (the CLI in this
//! workspace, a terminal UI) only call into the types exported here.
//!
//! ## Data Directory
//!
//! Everything lives in one per-user directory, resolved from `VIDLOG_DATA_DIR`,
//! then `XDG_DATA_HOME`, then the platform data root. See
//! [`crate::core::store::resolve_data_dir`].

pub mod core;

use std::path::PathBuf;
use std::sync::Arc;

use crate::core::{
    analytics::{AnalyticsReport, VideoFilter},
    clock::{Clock, SystemClock},
    settings::{AppSettings, SettingsManager},
    store::EntityStore,
    videos::VideoRepository,
    CoreResult,
};

#[cfg(feature = "youtube")]
use crate::core::{
    metadata::{MetadataProvider, YouTubeClient},
    CoreError,
};

// =============================================================================
// Application State
// =============================================================================

/// Handles onto one data directory, plus the settings loaded from it.
///
/// Settings are an explicit value held here rather than process-wide state;
/// call [`VidLog::reload_settings`] after something else changed the file.
pub struct VidLog {
    /// Video collection
    pub videos: VideoRepository,
    /// Settings persistence
    pub settings_manager: SettingsManager,
    /// Settings as last loaded or saved
    settings: AppSettings,
    clock: Arc<dyn Clock>,
}

impl VidLog {
    /// Opens the data directory at `root`, creating it if needed.
    pub fn open(root: impl Into<PathBuf>) -> CoreResult<Self> {
        Self::open_with_clock(root, Arc::new(SystemClock))
    }

    /// Opens the platform data directory.
    pub fn open_default() -> CoreResult<Self> {
        Self::open(crate::core::store::resolve_data_dir()?)
    }

    pub fn open_with_clock(root: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> CoreResult<Self> {
        let store = EntityStore::open(root)?;
        let settings_manager = SettingsManager::new(store.clone());
        let settings = settings_manager.load();
        tracing::debug!("Opened data directory {}", store.root().display());

        Ok(Self {
            videos: VideoRepository::with_clock(store, Arc::clone(&clock)),
            settings_manager,
            settings,
            clock,
        })
    }

    pub fn store(&self) -> &EntityStore {
        self.videos.store()
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Persists `settings` and keeps them as the current value.
    pub fn save_settings(&mut self, settings: AppSettings) -> CoreResult<()> {
        self.settings_manager.save(&settings)?;
        self.settings = settings;
        Ok(())
    }

    pub fn reload_settings(&mut self) -> &AppSettings {
        self.settings = self.settings_manager.load();
        &self.settings
    }

    /// Analytics over the stored collection narrowed by `filter`, as of the
    /// clock's current day.
    pub fn report(&self, filter: &VideoFilter) -> CoreResult<AnalyticsReport> {
        let videos = filter.apply(&self.videos.list()?);
        Ok(AnalyticsReport::compute(&videos, self.clock.today()))
    }

    /// Metadata client built from the current settings (or `YOUTUBE_API_KEY`).
    #[cfg(feature = "youtube")]
    pub fn metadata_provider(&self) -> CoreResult<Box<dyn MetadataProvider>> {
        let api_key = self.settings.resolve_api_key().ok_or_else(|| {
            CoreError::MetadataLookupFailed(
                "add YOUTUBE_API_KEY to your .env file or set it in settings".to_string(),
            )
        })?;
        Ok(Box::new(YouTubeClient::new(api_key)?))
    }
}

// =============================================================================
// Tests
// =============================================================================
