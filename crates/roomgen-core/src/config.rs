//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which holds the API endpoints, the session storage backend and the
//! last email used to log in.
//!
//! Configuration is stored at `~/.config/roomgen/config.json`. The
//! `ROOMGEN_API_URL`, `ROOMGEN_GENERATE_URL` and `ROOMGEN_SESSION_BACKEND`
//! environment variables take precedence over the file.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "roomgen";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const ENV_API_URL: &str = "ROOMGEN_API_URL";
const ENV_GENERATE_URL: &str = "ROOMGEN_GENERATE_URL";
const ENV_SESSION_BACKEND: &str = "ROOMGEN_SESSION_BACKEND";

/// Where the session token is persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    /// OS keychain via the `keyring` crate
    #[default]
    Keyring,
    /// JSON file in the cache directory
    File,
}

impl FromStr for SessionBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keyring" => Ok(Self::Keyring),
            "file" => Ok(Self::File),
            other => Err(anyhow::anyhow!("Unknown session backend: {}", other)),
        }
    }
}

impl fmt::Display for SessionBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyring => write!(f, "keyring"),
            Self::File => write!(f, "file"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub generate_url: Option<String>,
    #[serde(default)]
    pub session_backend: SessionBackend,
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
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

    /// Apply environment overrides. Empty values are ignored.
    fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup(ENV_API_URL) {
            self.api_base_url = Some(url);
        }
        if let Some(url) = lookup(ENV_GENERATE_URL) {
            self.generate_url = Some(url);
        }
        if let Some(backend) = lookup(ENV_SESSION_BACKEND) {
            self.session_backend = backend
                .parse()
                .with_context(|| format!("Invalid {}", ENV_SESSION_BACKEND))?;
        }
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = Config {
            api_base_url: Some("https://file.example/api".to_string()),
            ..Config::default()
        };
        config
            .apply_env(env(&[
                ("ROOMGEN_API_URL", "https://env.example/api"),
                ("ROOMGEN_SESSION_BACKEND", "file"),
            ]))
            .unwrap();

        assert_eq!(config.api_base_url.as_deref(), Some("https://env.example/api"));
        assert_eq!(config.session_backend, SessionBackend::File);
        assert!(config.generate_url.is_none());
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let mut config = Config {
            generate_url: Some("https://gen.example/generate".to_string()),
            ..Config::default()
        };
        config
            .apply_env(env(&[("ROOMGEN_GENERATE_URL", "  ")]))
            .unwrap();
        assert_eq!(
            config.generate_url.as_deref(),
            Some("https://gen.example/generate")
        );
    }

    #[test]
    fn test_invalid_backend_is_rejected() {
        let mut config = Config::default();
        let result = config.apply_env(env(&[("ROOMGEN_SESSION_BACKEND", "sqlite")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_config_defaults_when_fields_missing() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.session_backend, SessionBackend::Keyring);
        assert!(config.api_base_url.is_none());
        assert!(config.last_email.is_none());
    }

    #[test]
    fn test_session_backend_round_trips_through_display() {
        for backend in [SessionBackend::Keyring, SessionBackend::File] {
            assert_eq!(backend.to_string().parse::<SessionBackend>().unwrap(), backend);
        }
    }
}
