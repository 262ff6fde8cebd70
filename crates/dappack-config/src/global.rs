//! Global configuration for dappack
//!
//! Located at `~/.config/dappack/config.toml`. Every value has a default, so
//! a missing file is not an error. The loaded config is passed explicitly
//! into the lifecycle manager; nothing downstream reads ambient process
//! state to find the registry or the engine socket.

use crate::{ConfigError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Global dappack configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub registry: RegistryConfig,
    pub runtime: RuntimeConfig,
    pub build: BuildConfig,
}

/// Descriptor registry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Git URL of the descriptor registry
    pub url: String,
    /// Branch pulled on refresh
    pub branch: String,
    /// Checkout location; defaults to the platform data directory
    pub path: Option<PathBuf>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: "https://github.com/kevincharm/dappdefs.git".to_string(),
            branch: "master".to_string(),
            path: None,
        }
    }
}

impl RegistryConfig {
    /// Effective checkout path, honoring the configured override
    pub fn effective_path(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.path {
            return Ok(path.clone());
        }
        let dirs = ProjectDirs::from("", "", "dappack").ok_or(ConfigError::NoDataDir)?;
        Ok(dirs.data_dir().join("dappdefs"))
    }
}

/// Container engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Container engine API socket
    pub socket: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            socket: default_engine_socket(),
        }
    }
}

#[cfg(windows)]
fn default_engine_socket() -> String {
    "//./pipe/docker_engine".to_string()
}

#[cfg(not(windows))]
fn default_engine_socket() -> String {
    "/var/run/docker.sock".to_string()
}

/// Source fetch and image build settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Upper bound on source fetches and registry git operations, in seconds
    pub fetch_timeout_secs: u64,
    /// Upper bound on a single image build, in seconds
    pub build_timeout_secs: u64,
    /// Extra KEY=VALUE pairs passed into the image builder
    pub env: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: 120,
            build_timeout_secs: 1800,
            env: Vec::new(),
        }
    }
}

impl BuildConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn build_timeout(&self) -> Duration {
        Duration::from_secs(self.build_timeout_secs)
    }
}

impl GlobalConfig {
    /// Load global configuration from the default path
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load global configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            path: path.clone(),
            source: e,
        })
    }

    /// Default config file path
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "dappack").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GlobalConfig::default();
        assert!(config.registry.url.contains("dappdefs"));
        assert_eq!(config.registry.branch, "master");
        assert_eq!(config.build.fetch_timeout(), Duration::from_secs(120));
        assert_eq!(config.build.build_timeout(), Duration::from_secs(1800));
        assert!(config.build.env.is_empty());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = GlobalConfig::load_from(&tmp.path().join("config.toml")).unwrap();
        assert_eq!(config.registry.branch, "master");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[registry]
url = "https://example.com/defs.git"
branch = "main"

[build]
fetch_timeout_secs = 5
"#,
        )
        .unwrap();

        let config = GlobalConfig::load_from(&path).unwrap();
        assert_eq!(config.registry.url, "https://example.com/defs.git");
        assert_eq!(config.registry.branch, "main");
        assert_eq!(config.build.fetch_timeout_secs, 5);
        assert_eq!(config.build.build_timeout_secs, 1800);
        assert!(!config.runtime.socket.is_empty());
    }

    #[test]
    fn test_registry_path_override() {
        let mut config = GlobalConfig::default();
        config.registry.path = Some(PathBuf::from("/srv/dappdefs"));
        assert_eq!(
            config.registry.effective_path().unwrap(),
            PathBuf::from("/srv/dappdefs")
        );
    }
}
