// SettingsManager Service
// Handles client settings persistence

use crate::models::ClientSettings;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::RwLock;

/// Manages client settings storage and retrieval
pub struct SettingsManager {
    settings_path: PathBuf,
    cache: RwLock<Option<ClientSettings>>,
}

impl SettingsManager {
    /// Create a new SettingsManager with the given data directory
    pub fn new(data_dir: PathBuf) -> Self {
        let settings_path = data_dir.join("settings.json");
        Self {
            settings_path,
            cache: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.settings_path
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load(&self) -> Result<ClientSettings, String> {
        // Check cache first
        if let Ok(cache) = self.cache.read() {
            if let Some(ref settings) = *cache {
                return Ok(settings.clone());
            }
        }

        let settings = if self.settings_path.exists() {
            let content = std::fs::read_to_string(&self.settings_path)
                .map_err(|e| format!("Failed to read settings: {e}"))?;

            let mut user_value: Value = serde_json::from_str(&content)
                .map_err(|e| format!("Failed to parse settings: {e}"))?;

            let defaults_value = serde_json::to_value(ClientSettings::default())
                .map_err(|e| format!("Failed to build default settings: {e}"))?;

            let changed = merge_missing_settings(&mut user_value, &defaults_value);

            let settings: ClientSettings = serde_json::from_value(user_value)
                .map_err(|e| format!("Failed to parse settings: {e}"))?;

            if changed {
                log::debug!("Added missing keys to {}", self.settings_path.display());
                self.save_internal(&settings)?;
            }

            settings
        } else {
            // Return defaults and save them
            let defaults = ClientSettings::default();
            self.save_internal(&defaults)?;
            defaults
        };

        if let Ok(mut cache) = self.cache.write() {
            *cache = Some(settings.clone());
        }

        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, settings: &ClientSettings) -> Result<(), String> {
        self.save_internal(settings)?;

        if let Ok(mut cache) = self.cache.write() {
            *cache = Some(settings.clone());
        }

        Ok(())
    }

    /// Internal save without cache update
    fn save_internal(&self, settings: &ClientSettings) -> Result<(), String> {
        if let Some(parent) = self.settings_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create settings directory: {e}"))?;
        }

        let content = serde_json::to_string_pretty(settings)
            .map_err(|e| format!("Failed to serialize settings: {e}"))?;

        std::fs::write(&self.settings_path, content)
            .map_err(|e| format!("Failed to write settings: {e}"))
    }
}

fn merge_missing_settings(target: &mut Value, defaults: &Value) -> bool {
    match (target, defaults) {
        (Value::Object(target_map), Value::Object(defaults_map)) => {
            let mut changed = false;
            for (key, default_value) in defaults_map {
                match target_map.get_mut(key) {
                    Some(target_value) => {
                        if merge_missing_settings(target_value, default_value) {
                            changed = true;
                        }
                    }
                    None => {
                        target_map.insert(key.clone(), default_value.clone());
                        changed = true;
                    }
                }
            }
            changed
        }
        _ => false,
    }
}
