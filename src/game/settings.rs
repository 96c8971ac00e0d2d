use crate::game::storage::{self, StorageError};
use crate::model::SettingsChange;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

const SETTINGS_FILE: &str = "settings.json";
const CURRENT_VERSION: u32 = 2;

pub const TIME_LIMIT_MINUTES: RangeInclusive<u32> = 1..=10;
pub const STAR_COUNT: RangeInclusive<u32> = 1..=5;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    #[serde(default = "default_version")]
    version: u32,

    #[serde(default = "default_time_limit_minutes")]
    pub time_limit_minutes: u32,

    #[serde(default = "default_star_count")]
    pub star_count: u32,

    #[serde(default = "default_true")]
    pub sound_enabled: bool,
}

// Helper functions for default values
fn default_version() -> u32 {
    CURRENT_VERSION
}
fn default_time_limit_minutes() -> u32 {
    2
}
fn default_star_count() -> u32 {
    3
}
fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            version: CURRENT_VERSION,
            time_limit_minutes: default_time_limit_minutes(),
            star_count: default_star_count(),
            sound_enabled: true,
        }
    }
}

impl Settings {
    pub fn load() -> Self {
        Self::load_from(&storage::data_dir_or_fallback())
    }

    /// Never fails: unreadable or corrupt settings fall back to defaults.
    pub fn load_from(dir: &Path) -> Self {
        let path = Self::settings_path(dir);
        match storage::read_json::<Settings>(&path) {
            Ok(Some(mut settings)) => {
                settings.migrate();
                settings.sanitize();
                settings
            }
            Ok(None) => {
                info!(target: "settings", "No settings at {}; writing defaults", path.display());
                let default = Settings::default();
                if let Err(err) = default.save_to(dir) {
                    warn!(target: "settings", "Could not write default settings: {}", err);
                }
                default
            }
            Err(err) => {
                warn!(target: "settings", "{}; using defaults", err);
                Settings::default()
            }
        }
    }

    pub fn save_to(&self, dir: &Path) -> Result<(), StorageError> {
        storage::write_json(&Self::settings_path(dir), self)
    }

    pub fn settings_path(dir: &Path) -> PathBuf {
        dir.join(SETTINGS_FILE)
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    fn migrate(&mut self) {
        match self.version {
            // version 1 stored the limit in seconds
            1 => {
                self.time_limit_minutes = self.time_limit_minutes.div_ceil(60);
                self.version = CURRENT_VERSION;
            }
            0 => {
                self.version = CURRENT_VERSION;
            }
            _ => (),
        }
    }

    fn sanitize(&mut self) {
        self.time_limit_minutes = self
            .time_limit_minutes
            .clamp(*TIME_LIMIT_MINUTES.start(), *TIME_LIMIT_MINUTES.end());
        self.star_count = self
            .star_count
            .clamp(*STAR_COUNT.start(), *STAR_COUNT.end());
    }

    /// Applies the fields present in `change`, clamped to their valid ranges.
    pub fn apply(&mut self, change: &SettingsChange) {
        if let Some(minutes) = change.time_limit_minutes {
            self.time_limit_minutes = minutes;
        }
        if let Some(stars) = change.star_count {
            self.star_count = stars;
        }
        if let Some(sound) = change.sound_enabled {
            self.sound_enabled = sound;
        }
        if change.toggle_sound {
            self.sound_enabled = !self.sound_enabled;
        }
        self.sanitize();
    }

    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(self.time_limit_minutes as u64 * 60)
    }

    pub fn is_debug_mode() -> bool {
        std::env::var("DEBUG").map(|v| v == "1").unwrap_or(false)
    }

    pub fn seed_from_env() -> Option<u64> {
        let raw = std::env::var("SEED").ok()?;
        match raw.parse::<u64>() {
            Ok(seed) => Some(seed),
            Err(_) => {
                warn!(target: "settings", "Ignoring unparsable SEED {:?}", raw);
                None
            }
        }
    }
}
