use serde::{Deserialize, Serialize};
use std::path::Path;

/// Local fallback used when no backend URL is configured anywhere.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
/// Environment override for the backend base URL.
pub const BACKEND_URL_ENV: &str = "MEDLENSE_BACKEND_URL";

const SETTINGS_FILE: &str = "settings.json";

/// How requests reach the inference backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    /// Multipart upload straight to `POST /predict`.
    Direct,
    /// JSON envelope posted to the backend's gateway invocation endpoint.
    Gateway,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub transport: TransportMode,
    /// Most-recent entries shown in the history panel.
    pub history_limit: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            transport: TransportMode::Direct,
            history_limit: 10,
        }
    }
}

impl BackendConfig {
    /// Load settings from the app data dir, falling back to defaults. The
    /// environment variable wins over the settings file for the base URL.
    pub fn load(app_data_dir: &Path) -> Self {
        let mut config: BackendConfig = std::fs::read_to_string(app_data_dir.join(SETTINGS_FILE))
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default();

        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            if !url.is_empty() {
                config.base_url = url;
            }
        }

        config.base_url = config.base_url.trim_end_matches('/').to_string();
        config
    }

    pub fn save(&self, app_data_dir: &Path) -> std::io::Result<()> {
        let content = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(app_data_dir.join(SETTINGS_FILE), content)
    }
}
