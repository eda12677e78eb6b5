use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::shared::constants::{DEFAULT_DEVICE_ID, DEFAULT_STORE_ID};

/// Persisted configuration for the boundary collaborators: detection
/// provider credentials, collector endpoint, and store/device identity.
///
/// Empty strings mean "not configured"; the gateway and uploader
/// degrade to no-ops rather than failing when a value is absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub provider_key: String,
    #[serde(default)]
    pub provider_endpoint: String,
    #[serde(default)]
    pub collector_url: String,
    #[serde(default = "default_store_id")]
    pub store_id: String,
    #[serde(default = "default_device_id")]
    pub device_id: String,
}

fn default_store_id() -> String {
    DEFAULT_STORE_ID.to_string()
}

fn default_device_id() -> String {
    DEFAULT_DEVICE_ID.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider_key: String::new(),
            provider_endpoint: String::new(),
            collector_url: String::new(),
            store_id: default_store_id(),
            device_id: default_device_id(),
        }
    }
}

impl Settings {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("Footfall").join("settings.json"))
    }

    /// Loads settings from the user config dir, falling back to
    /// defaults when the file is missing or malformed.
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    pub fn load_from(path: &std::path::Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default()
    }

    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            self.save_to(&path);
        }
    }

    pub fn save_to(&self, path: &std::path::Path) {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Ok(json) = serde_json::to_string_pretty(self) {
            let _ = fs::write(path, json);
        }
    }
}
