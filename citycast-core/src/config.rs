use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::model::Unit;

/// Environment variable that takes precedence over the stored API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// default_unit = "imperial"
/// request_timeout_secs = 10
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub api_key: Option<String>,

    /// Override for the provider base URL, mostly useful against a local mock.
    pub base_url: Option<String>,

    /// Unit used when no unit preference has been saved yet.
    pub default_unit: Option<Unit>,

    /// No timeout when absent.
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    /// API key from the environment, falling back to the stored one.
    pub fn api_key(&self) -> Option<String> {
        self.api_key_with_env(std::env::var(API_KEY_ENV).ok())
    }

    fn api_key_with_env(&self, env_value: Option<String>) -> Option<String> {
        env_value
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|key| !key.trim().is_empty()))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key.trim().to_string());
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory holding persisted favorites and preferences.
    pub fn storage_dir() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().join("storage"))
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "citycast", "citycast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        let cfg = Config::from_toml("").unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn parses_all_fields() {
        let cfg = Config::from_toml(
            r#"
            api_key = "KEY"
            base_url = "http://localhost:8080"
            default_unit = "imperial"
            request_timeout_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(cfg.api_key.as_deref(), Some("KEY"));
        assert_eq!(cfg.default_unit, Some(Unit::Imperial));
        assert_eq!(cfg.request_timeout_secs, Some(5));
    }

    #[test]
    fn unknown_unit_is_rejected() {
        assert!(Config::from_toml(r#"default_unit = "kelvin""#).is_err());
    }

    #[test]
    fn env_key_overrides_stored_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("  STORED  ".into());

        assert_eq!(cfg.api_key_with_env(None).as_deref(), Some("STORED"));
        assert_eq!(cfg.api_key_with_env(Some("ENV".into())).as_deref(), Some("ENV"));
        assert_eq!(cfg.api_key_with_env(Some("   ".into())).as_deref(), Some("STORED"));
    }

    #[test]
    fn missing_key_everywhere_is_none() {
        assert_eq!(Config::default().api_key_with_env(None), None);
    }

    #[test]
    fn toml_roundtrip_keeps_unit() {
        let cfg = Config {
            default_unit: Some(Unit::Metric),
            ..Config::default()
        };
        let text = toml::to_string_pretty(&cfg).unwrap();
        assert!(text.contains(r#"default_unit = "metric""#));
        assert_eq!(Config::from_toml(&text).unwrap(), cfg);
    }
}
