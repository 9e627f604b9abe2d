use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Returns the path to the settings file: `~/.config/tonegen-rs/settings.json`
fn settings_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("tonegen-rs");
    path.push("settings.json");
    path
}

/// Persisted application settings.
///
/// Serialized as JSON to the platform config directory.
/// Fields use `#[serde(default)]` so that adding new settings
/// won't break existing config files.
///
/// Favorites are stored as a comma-delimited list of catalog ids
/// (e.g. `"1,4,7"`); malformed fragments are skipped on read.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    default_volume: f32,
    favorites: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_volume: 0.5,
            favorites: String::new(),
        }
    }
}

impl AppSettings {
    /// Load settings from disk, falling back to defaults on any error.
    pub fn load() -> Self {
        let path = settings_path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Self>(&contents) {
                Ok(mut settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings.default_volume = settings.default_volume.clamp(0.0, 1.0);
                    settings
                }
                Err(e) => {
                    log::warn!("Failed to parse settings ({}), using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                log::info!("No settings file found ({}), using defaults", e);
                Self::default()
            }
        }
    }

    /// Save settings to disk as pretty JSON.
    pub fn save(&self) {
        let path = settings_path();
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                log::warn!("Failed to create config directory: {}", e);
                return;
            }
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    log::warn!("Failed to write settings: {}", e);
                }
            }
            Err(e) => {
                log::warn!("Failed to serialize settings: {}", e);
            }
        }
    }

    /// Volume applied when playback starts, in `[0, 1]`.
    pub fn default_volume(&self) -> f32 {
        self.default_volume
    }

    pub fn set_default_volume(&mut self, volume: f32) {
        self.default_volume = volume.clamp(0.0, 1.0);
    }

    /// Favorite catalog ids, parsed from the delimited list.
    pub fn favorite_ids(&self) -> BTreeSet<u32> {
        self.favorites
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect()
    }

    pub fn is_favorite(&self, id: u32) -> bool {
        self.favorite_ids().contains(&id)
    }

    /// Add `id` to the favorites if absent, remove it if present.
    pub fn toggle_favorite(&mut self, id: u32) {
        let mut ids = self.favorite_ids();
        if !ids.insert(id) {
            ids.remove(&id);
        }
        self.favorites = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_volume_is_clamped_on_set() {
        let mut settings = AppSettings::default();
        settings.set_default_volume(1.8);
        assert_eq!(settings.default_volume(), 1.0);
        settings.set_default_volume(-0.5);
        assert_eq!(settings.default_volume(), 0.0);
    }

    #[test]
    fn favorites_round_trip_through_the_delimited_list() {
        let mut settings = AppSettings::default();
        assert!(settings.favorite_ids().is_empty());

        settings.toggle_favorite(4);
        settings.toggle_favorite(1);
        settings.toggle_favorite(7);
        assert_eq!(settings.favorites, "1,4,7");
        assert!(settings.is_favorite(4));

        settings.toggle_favorite(4);
        assert_eq!(settings.favorites, "1,7");
        assert!(!settings.is_favorite(4));
    }

    #[test]
    fn malformed_favorite_fragments_are_skipped() {
        let settings = AppSettings {
            favorites: "1,,x, 3 ,12".into(),
            ..AppSettings::default()
        };
        let ids: Vec<u32> = settings.favorite_ids().into_iter().collect();
        assert_eq!(ids, vec![1, 3, 12]);
    }

    #[test]
    fn settings_parse_from_json_with_missing_fields() {
        let settings: AppSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.default_volume(), 0.5);
        assert!(settings.favorite_ids().is_empty());
    }
}
