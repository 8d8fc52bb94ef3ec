//! Client configuration
//!
//! Settings are layered: `~/.config/pipedrive/config.toml`, then a `.env`
//! file in the working directory, then the process environment.
//!
//! ```toml
//! api_token = "..."
//! base_url = "https://api.pipedrive.com/"
//! default_version = "v1"
//! timeout_secs = 30
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::api::{ApiVersion, DEFAULT_BASE_URL};

pub const ENV_API_TOKEN: &str = "PIPEDRIVE_API_TOKEN";
pub const ENV_BASE_URL: &str = "PIPEDRIVE_BASE_URL";
pub const ENV_API_VERSION: &str = "PIPEDRIVE_API_VERSION";
pub const ENV_TIMEOUT: &str = "PIPEDRIVE_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_token: Option<String>,
    pub base_url: Option<String>,
    /// Pin every request to one API version instead of the latest supported
    pub default_version: Option<ApiVersion>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load from the config file, `.env` and the environment
    pub fn load() -> Result<Self> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                return Err(err).context("Failed to read .env file");
            }
        }

        let mut config = match config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        log::debug!(
            "Loaded configuration (token {}, version {:?})",
            if config.api_token.is_some() { "set" } else { "unset" },
            config.default_version
        );
        Ok(config)
    }

    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Override settings with the values `lookup` finds for the
    /// `PIPEDRIVE_*` variables. Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = lookup(ENV_API_TOKEN) {
            self.api_token = Some(token);
        }
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            self.base_url = Some(base_url);
        }
        if let Some(version) = lookup(ENV_API_VERSION) {
            let version = version
                .parse::<ApiVersion>()
                .with_context(|| format!("Invalid {}", ENV_API_VERSION))?;
            self.default_version = Some(version);
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT) {
            let timeout = timeout
                .trim()
                .parse::<u64>()
                .with_context(|| format!("Invalid {}: '{}'", ENV_TIMEOUT, timeout))?;
            self.timeout_secs = Some(timeout);
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }
}

/// `~/.config/pipedrive/config.toml` (platform config directory)
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pipedrive").join("config.toml"))
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
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert!(config.default_version.is_none());
    }

    #[test]
    fn test_from_toml() {
        let config = Config::from_toml_str(
            r#"
            api_token = "abc"
            default_version = "v1"
            timeout_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.api_token.as_deref(), Some("abc"));
        assert_eq!(config.default_version, Some(ApiVersion::V1));
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_toml_version() {
        assert!(Config::from_toml_str("default_version = \"v3\"").is_err());
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut config = Config::from_toml_str("api_token = \"from-file\"").unwrap();
        config
            .apply_overrides(env(&[
                (ENV_API_TOKEN, "from-env"),
                (ENV_API_VERSION, "2"),
                (ENV_BASE_URL, ""),
            ]))
            .unwrap();

        assert_eq!(config.api_token.as_deref(), Some("from-env"));
        assert_eq!(config.default_version, Some(ApiVersion::V2));
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_invalid_override_is_reported() {
        let mut config = Config::default();
        assert!(config.apply_overrides(env(&[(ENV_API_VERSION, "v9")])).is_err());
        assert!(config.apply_overrides(env(&[(ENV_TIMEOUT, "soon")])).is_err());
    }

    #[test]
    fn test_config_path_location() {
        if let Some(path) = config_path() {
            assert!(path.ends_with("pipedrive/config.toml"));
        }
    }
}
