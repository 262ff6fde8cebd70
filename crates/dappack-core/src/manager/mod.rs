//! Lifecycle manager - coordinates status resolution, builds, and runs

mod build;
mod lifecycle;
mod status;

use crate::{
    service_url, CoreError, DappReport, DescriptorRegistry, GitFetcher, ImageBuilder,
    NixpacksBuilder, Result, SourceFetcher,
};
use dappack_config::{DappDescriptor, GlobalConfig};
use dappack_runtime::{ContainerRuntime, RuntimeError, RuntimeInfo};
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex as AsyncMutex;

/// Coordinates dapp lifecycle operations against the container runtime.
///
/// Holds no state of its own beyond per-uid locks: statuses, images, and
/// containers are re-derived from the runtime on every call, so the engine
/// stays the single source of truth.
pub struct LifecycleManager {
    runtime: Box<dyn ContainerRuntime>,
    fetcher: Box<dyn SourceFetcher>,
    builder: Box<dyn ImageBuilder>,
    registry: DescriptorRegistry,
    config: GlobalConfig,
    /// Serializes the check-then-act sequence per uid
    locks: StdMutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl LifecycleManager {
    /// Create a manager with the default git fetcher and nixpacks builder
    pub fn new(runtime: Box<dyn ContainerRuntime>, config: GlobalConfig) -> Result<Self> {
        let builder = NixpacksBuilder::new(config.build.env.clone());
        Self::with_collaborators(runtime, Box::new(GitFetcher), Box::new(builder), config)
    }

    /// Create a manager with explicit fetch and build collaborators
    pub fn with_collaborators(
        runtime: Box<dyn ContainerRuntime>,
        fetcher: Box<dyn SourceFetcher>,
        builder: Box<dyn ImageBuilder>,
        config: GlobalConfig,
    ) -> Result<Self> {
        let registry = DescriptorRegistry::from_config(&config)?;
        Ok(Self {
            runtime,
            fetcher,
            builder,
            registry,
            config,
            locks: StdMutex::new(HashMap::new()),
        })
    }

    /// Engine information from the connected runtime
    pub fn runtime_info(&self) -> RuntimeInfo {
        self.runtime.info()
    }

    /// List every dapp known to the registry, refreshing it first
    pub async fn list_dapps(&self) -> Result<Vec<String>> {
        self.registry.refresh().await?;
        self.registry.list()
    }

    /// Load the descriptor for `uid`
    pub async fn descriptor(&self, uid: &str) -> Result<DappDescriptor> {
        self.registry.ensure_present().await?;
        self.registry.load(uid)
    }

    /// Current status and service URL for `uid`
    pub async fn status(&self, uid: &str) -> Result<DappReport> {
        let descriptor = self.descriptor(uid).await?;
        let status = self.resolve_status(uid).await?;
        Ok(DappReport {
            status,
            service_url: service_url(descriptor.dapp.http_port),
        })
    }

    /// Launch `uid`: refresh the registry, then take the dapp to running
    pub async fn run(&self, uid: &str, force_rebuild: bool) -> Result<DappReport> {
        self.registry.refresh().await?;
        let descriptor = self.registry.load(uid)?;
        let service_url = self.ensure_running(&descriptor, force_rebuild).await?;
        Ok(DappReport {
            status: crate::DappStatus::Running,
            service_url,
        })
    }

    /// Lock guarding the check-then-act sequence for one uid
    fn lock_for(&self, uid: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(uid.to_string()).or_default().clone()
    }
}

/// Map a runtime failure for `uid` to the right core error: an unreachable
/// engine is its own condition, never folded into a command failure.
pub(crate) fn runtime_failure(uid: &str, err: RuntimeError) -> CoreError {
    match err {
        RuntimeError::Unavailable(msg) => CoreError::RuntimeUnavailable(msg),
        other => CoreError::RuntimeCommandFailed {
            uid: uid.to_string(),
            source: other,
        },
    }
}
