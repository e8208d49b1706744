use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{DeckError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Bearer token sent as `Authorization: Bearer <token>`. Empty = none.
    #[serde(default)]
    pub api_token: String,
    #[serde(default = "default_currency")]
    pub default_currency: String,
}

fn default_server_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            api_token: String::new(),
            default_currency: default_currency(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("ledgerdeck")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| DeckError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

/// Forget the stored API token (used after account deletion).
pub fn clear_token() -> Result<()> {
    let mut settings = load_settings();
    settings.api_token.clear();
    save_settings(&settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            server_url: "https://money.example.com".to_string(),
            api_token: "tok_123".to_string(),
            default_currency: "EUR".to_string(),
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        std::fs::write(&path, &json).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: Settings = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded.server_url, "https://money.example.com");
        assert_eq!(loaded.api_token, "tok_123");
        assert_eq!(loaded.default_currency, "EUR");
    }

    #[test]
    fn test_defaults_when_missing_fields() {
        let json = r#"{"api_token": "tok_456"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.server_url, "http://localhost:5000");
        assert_eq!(s.api_token, "tok_456");
        assert_eq!(s.default_currency, "USD");
    }

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert!(s.api_token.is_empty());
        assert_eq!(s.default_currency, "USD");
        assert!(!s.server_url.is_empty());
    }
}
