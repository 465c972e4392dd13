//! Desk configuration.
//!
//! Looked up in order: `--config FILE`, then
//! `<config dir>/rental-desk/config.toml` when it exists, then built-in
//! defaults. `RENTAL_API_URL` overrides the base URL from any of them.
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:3000/api"
//! timeout_secs = 10
//!
//! [defaults]
//! staff_id = 1
//! top_limit = 10
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use rental_core::{DEFAULT_BASE_URL, DEFAULT_TOP_LIMIT};
use serde::{Deserialize, Serialize};

pub const URL_ENV: &str = "RENTAL_API_URL";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub defaults: Defaults,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

/// Values the screens fall back to when a field is left blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub staff_id: u32,
    pub top_limit: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            staff_id: 1,
            top_limit: DEFAULT_TOP_LIMIT,
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("rental-desk").join("config.toml"))
    }

    /// An explicit path must exist; the default path is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::read(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::read(&path)?,
                None => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_point_at_local_backend() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:3000/api");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.defaults.staff_id, 1);
        assert_eq!(config.defaults.top_limit, 10);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::from_toml("[api]\ntimeout_secs = 3\n").unwrap();
        assert_eq!(config.api.timeout_secs, 3);
        assert_eq!(config.api.base_url, "http://localhost:3000/api");
        assert_eq!(config.defaults, Defaults::default());
    }

    #[test]
    fn env_overrides_file() {
        let mut config = Config::from_toml("[api]\nbase_url = \"http://a/api\"\n").unwrap();
        config.apply_env(|key| (key == URL_ENV).then(|| "http://b:9000/api".to_string()));
        assert_eq!(config.api.base_url, "http://b:9000/api");

        config.apply_env(|_| Some("   ".to_string()));
        assert_eq!(config.api.base_url, "http://b:9000/api");
    }

    #[test]
    fn zero_timeout_is_clamped() {
        let config = Config::from_toml("[api]\ntimeout_secs = 0\n").unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn load_reads_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[defaults]\nstaff_id = 2").unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.defaults.staff_id, 2);
    }

    #[test]
    fn load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(Config::from_toml("[api]\ntimeout_secs = \"soon\"\n").is_err());
    }
}
