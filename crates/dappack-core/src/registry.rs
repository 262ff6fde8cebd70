//! Git-backed descriptor registry
//!
//! Descriptors live in a git repository laid out as `<uid>/nixpacks.toml`.
//! The checkout location is an explicit configuration value passed in at
//! construction; nothing here reads ambient process state.

use crate::fetch::run_git;
use crate::{CoreError, Result};
use dappack_config::{validate_uid, DappDescriptor, GlobalConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Local checkout of the descriptor registry
pub struct DescriptorRegistry {
    url: String,
    branch: String,
    path: PathBuf,
    timeout: Duration,
}

impl DescriptorRegistry {
    /// Create a registry over an explicit checkout path
    pub fn new(
        url: impl Into<String>,
        branch: impl Into<String>,
        path: PathBuf,
        timeout: Duration,
    ) -> Self {
        Self {
            url: url.into(),
            branch: branch.into(),
            path,
            timeout,
        }
    }

    /// Create a registry from the global configuration
    pub fn from_config(config: &GlobalConfig) -> Result<Self> {
        let path = config
            .registry
            .effective_path()
            .map_err(|e| CoreError::RegistryUnavailable(e.to_string()))?;
        Ok(Self::new(
            config.registry.url.clone(),
            config.registry.branch.clone(),
            path,
            config.build.fetch_timeout(),
        ))
    }

    /// Registry checkout location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pull the latest descriptors, cloning on first use
    pub async fn refresh(&self) -> Result<&Path> {
        if self.path.join(".git").is_dir() {
            tracing::debug!("Pulling descriptor registry at {:?}", self.path);
            self.git(
                &["pull", "origin", self.branch.as_str()],
                Some(self.path.as_path()),
            )
            .await?;
        } else {
            self.clone_fresh().await?;
        }
        Ok(&self.path)
    }

    /// Make sure a checkout exists, cloning only if missing.
    /// Status and descriptor reads use this; they do not pull.
    pub async fn ensure_present(&self) -> Result<&Path> {
        if !self.path.join(".git").is_dir() {
            self.clone_fresh().await?;
        }
        Ok(&self.path)
    }

    async fn clone_fresh(&self) -> Result<()> {
        tracing::info!("Cloning descriptor registry from {}", self.url);
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let path = self.path.to_string_lossy().to_string();
        self.git(
            &[
                "clone",
                "--branch",
                self.branch.as_str(),
                self.url.as_str(),
                path.as_str(),
            ],
            None,
        )
        .await
    }

    async fn git(&self, args: &[&str], cwd: Option<&Path>) -> Result<()> {
        match tokio::time::timeout(self.timeout, run_git(args, cwd)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(CoreError::RegistryUnavailable(e.to_string())),
            Err(_) => Err(CoreError::RegistryUnavailable(format!(
                "git {} timed out after {}s",
                args.first().unwrap_or(&""),
                self.timeout.as_secs()
            ))),
        }
    }

    /// List the uids of every descriptor in the registry, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        let mut uids = Vec::new();
        for entry in std::fs::read_dir(&self.path)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }
            if !entry.path().join("nixpacks.toml").is_file() {
                continue;
            }
            uids.push(name);
        }
        uids.sort();
        Ok(uids)
    }

    /// Load and validate the descriptor for `uid`
    pub fn load(&self, uid: &str) -> Result<DappDescriptor> {
        validate_uid(uid).map_err(|e| CoreError::DescriptorInvalid {
            uid: uid.to_string(),
            source: e,
        })?;

        let descriptor_path = self.path.join(uid).join("nixpacks.toml");
        if !descriptor_path.is_file() {
            return Err(CoreError::UnknownDapp(uid.to_string()));
        }

        let descriptor = DappDescriptor::load_from(&descriptor_path).map_err(|e| {
            CoreError::DescriptorInvalid {
                uid: uid.to_string(),
                source: e,
            }
        })?;

        // The registry entry and the descriptor must agree on identity.
        if descriptor.dapp.uid != uid {
            return Err(CoreError::DescriptorInvalid {
                uid: uid.to_string(),
                source: dappack_config::ConfigError::Invalid(format!(
                    "descriptor declares uid '{}' under registry entry '{}'",
                    descriptor.dapp.uid, uid
                )),
            });
        }

        Ok(descriptor)
    }
}
