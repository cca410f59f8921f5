//! Application configuration management.
//!
//! Configuration comes from `~/.config/autolot/config.json` when present,
//! overlaid with the `VITE_*` environment variables the web client uses.
//! Values are not validated here; a missing base URL only fails the first
//! request that needs it.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::store::{FileStore, KeyValueStore, KeyringStore, SessionStore};

/// Application name used for config directory paths
const APP_NAME: &str = "autolot";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Domain API base URL
pub const ENV_API_URL: &str = "VITE_API_URL";
/// Auth API base URL
pub const ENV_AUTH_API_URL: &str = "VITE_API_URL1";
/// Listing image host
pub const ENV_MEDIA_URL: &str = "VITE_MEDIA_URL";
/// Public site URL
pub const ENV_BASE_URL: &str = "VITE_BASE_URL";
/// Analytics measurement id
pub const ENV_MEASUREMENT_ID: &str = "VITE_MEASUREMENT_ID";

/// Where the session is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    /// JSON file in the user's data directory
    #[default]
    File,
    /// OS keychain
    Keyring,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub api_url: Option<String>,
    pub auth_api_url: Option<String>,
    pub media_url: Option<String>,
    pub base_url: Option<String>,
    pub measurement_id: Option<String>,
    #[serde(default)]
    pub session_backend: SessionBackend,
}

impl Config {
    /// Config file (if any) with environment overrides applied.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn apply_env(&mut self) {
        self.apply_vars(|name| std::env::var(name).ok());
    }

    /// Overlay values from `lookup`; empty values count as unset.
    fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_API_URL) {
            self.api_url = Some(v);
        }
        if let Some(v) = get(ENV_AUTH_API_URL) {
            self.auth_api_url = Some(v);
        }
        if let Some(v) = get(ENV_MEDIA_URL) {
            self.media_url = Some(v);
        }
        if let Some(v) = get(ENV_BASE_URL) {
            self.base_url = Some(v);
        }
        if let Some(v) = get(ENV_MEASUREMENT_ID) {
            self.measurement_id = Some(v);
        }
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Where the configured backend keeps the session, for display.
    pub fn session_location(&self) -> Result<String> {
        Ok(match self.session_backend {
            SessionBackend::File => FileStore::default_location()
                .context("Failed to locate session file")?
                .path()
                .display()
                .to_string(),
            SessionBackend::Keyring => "OS keychain".to_string(),
        })
    }

    /// Open the configured session backend.
    pub fn session_store(&self) -> Result<SessionStore> {
        let backend: Arc<dyn KeyValueStore> = match self.session_backend {
            SessionBackend::File => Arc::new(
                FileStore::default_location().context("Failed to locate session file")?,
            ),
            SessionBackend::Keyring => Arc::new(KeyringStore::new()),
        };
        Ok(SessionStore::new(backend))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::Path;

    #[test]
    fn test_apply_vars_overrides_file_values() {
        let mut config = Config {
            api_url: Some("https://old.example.com".to_string()),
            measurement_id: Some("G-OLD".to_string()),
            ..Default::default()
        };

        let vars: HashMap<&str, &str> = [
            (ENV_API_URL, "https://api.example.com"),
            (ENV_AUTH_API_URL, "https://auth.example.com"),
            (ENV_MEDIA_URL, "https://media.example.com"),
            (ENV_MEASUREMENT_ID, "  "),
        ]
        .into_iter()
        .collect();
        config.apply_vars(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.api_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(config.auth_api_url.as_deref(), Some("https://auth.example.com"));
        assert_eq!(config.media_url.as_deref(), Some("https://media.example.com"));
        assert_eq!(config.base_url, None);
        // Blank values leave the file value alone
        assert_eq!(config.measurement_id.as_deref(), Some("G-OLD"));
    }

    #[test]
    fn test_config_file_format() {
        let json = r#"{"api_url": "https://api.example.com", "session_backend": "keyring"}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.api_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(config.auth_api_url, None);
        assert_eq!(config.session_backend, SessionBackend::Keyring);

        let defaults: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(defaults.session_backend, SessionBackend::File);
    }

    #[test]
    fn test_session_location() {
        let keyring = Config {
            session_backend: SessionBackend::Keyring,
            ..Default::default()
        };
        assert_eq!(keyring.session_location().unwrap(), "OS keychain");

        // No data directory in some sandboxes
        if dirs::data_dir().is_some() {
            let location = Config::default().session_location().unwrap();
            assert!(Path::new(&location).ends_with(Path::new(APP_NAME).join("session.json")));
        }
    }
}
