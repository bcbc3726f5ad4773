//! Settings Persistence System
//!
//! Provides persistent application settings with:
//! - Atomic file writes through the entity store
//! - Defaults for missing fields and for unreadable files
//! - Default file creation on first load
//!
//! Storage location: {data_dir}/settings.json

use std::ffi::OsString;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::store::EntityStore;
use crate::core::CoreResult;

/// Environment fallback for the metadata API key
pub const API_KEY_ENV: &str = "YOUTUBE_API_KEY";

/// Color themes the presentation layer knows how to draw
pub const KNOWN_THEMES: &[&str] = &["red", "blue", "green", "purple", "orange", "teal", "pink"];

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppSettings {
    /// Vim-style navigation in list and form views
    #[serde(default = "default_true")]
    pub vim_motions: bool,

    /// Color theme name, see [`KNOWN_THEMES`]
    #[serde(default = "default_theme")]
    pub theme: String,

    /// YouTube Data API key, may be empty
    #[serde(default)]
    pub api_key: String,

    /// Remote used by the backup collaborator, may be empty
    #[serde(default)]
    pub backup_repo: String,

    /// Push to the backup remote after every change
    #[serde(default = "default_true")]
    pub auto_sync: bool,
}

fn default_true() -> bool {
    true
}

fn default_theme() -> String {
    "red".to_string()
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            vim_motions: true,
            theme: default_theme(),
            api_key: String::new(),
            backup_repo: String::new(),
            auto_sync: true,
        }
    }
}

impl AppSettings {
    /// The API key to hand to the metadata client: the stored key if set,
    /// otherwise `YOUTUBE_API_KEY` from the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.resolve_api_key_with(|key| std::env::var_os(key))
    }

    pub fn resolve_api_key_with<F>(&self, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let stored = self.api_key.trim();
        if !stored.is_empty() {
            return Some(stored.to_string());
        }

        lookup(API_KEY_ENV)
            .and_then(|v| v.into_string().ok())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

pub fn is_known_theme(theme: &str) -> bool {
    KNOWN_THEMES.contains(&theme)
}

/// Settings manager for loading and saving settings
pub struct SettingsManager {
    store: EntityStore,
}

impl SettingsManager {
    pub fn new(store: EntityStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Load settings from disk.
    ///
    /// A missing file is created with the defaults. A zero-length file counts
    /// as missing and is overwritten with the defaults too. A non-empty file
    /// that cannot be read or parsed yields the defaults and is left as it is.
    pub fn load(&self) -> AppSettings {
        let path = self.store.settings_path();

        match self.store.load_json::<AppSettings>(&path) {
            Ok(Some(settings)) => {
                debug!("Loaded settings from {}", path.display());
                settings
            }
            Ok(None) => {
                info!("Settings file not found, writing defaults to {}", path.display());
                let defaults = AppSettings::default();
                if let Err(e) = self.store.write_json(&path, &defaults) {
                    warn!("Failed to write default settings: {}", e);
                }
                defaults
            }
            Err(e) => {
                warn!("Failed to load settings, using defaults: {}", e);
                AppSettings::default()
            }
        }
    }

    /// Save settings to disk. Field contents are not validated.
    pub fn save(&self, settings: &AppSettings) -> CoreResult<()> {
        let path = self.store.settings_path();
        self.store.write_json(&path, settings)?;
        info!("Settings saved to {}", path.display());
        Ok(())
    }
}
