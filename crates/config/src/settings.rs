// User settings
// Loaded from ~/.config/stocksync/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Endpoints
    #[serde(rename = "oracle.url")]
    pub oracle_url: Option<String>,

    #[serde(rename = "sync.url")]
    pub sync_url: Option<String>,

    // Identity
    #[serde(rename = "user.id")]
    pub user_id: Option<String>,

    #[serde(rename = "shop.id")]
    pub shop_id: Option<String>,

    // HTTP
    #[serde(rename = "http.timeoutSecs")]
    pub timeout_secs: u64,

    // Matching
    #[serde(rename = "match.configPath")]
    pub match_config_path: Option<PathBuf>,

    // Auth (STOCKSYNC_API_TOKEN takes precedence)
    #[serde(rename = "auth.token", skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            oracle_url: None,
            sync_url: None,
            user_id: None,
            shop_id: None,
            timeout_secs: 60,
            match_config_path: None,
            auth_token: None,
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stocksync");
        config_dir.join("settings.json")
    }

    /// Load settings from the default location, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{}; using default settings", e);
                Self::default()
            }
        }
    }

    /// Load settings from an explicit file
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Error reading {}: {}", path.display(), e))?;

        // Strip comments (lines starting with //)
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::from_str(&cleaned)
            .map_err(|e| format!("Error parsing {}: {}", path.display(), e))
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;

        fs::write(path, json).map_err(|e| e.to_string())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Get the config file path for display/opening
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }
}
