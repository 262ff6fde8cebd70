//! Container runtime trait and implementations for dappack
//!
//! This crate provides a narrow abstraction over Docker-compatible container
//! engines: only the handful of operations the lifecycle manager needs,
//! backed by the engine's structured API rather than CLI output parsing.

mod docker;
mod error;
mod types;

pub use docker::DockerRuntime;
pub use error::*;
pub use types::*;

use async_trait::async_trait;

/// Trait for container runtimes (Docker, or Podman via its compatible API)
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// List containers whose name matches `name` exactly.
    /// With `all` set, containers that are not running are included.
    async fn list_containers(&self, name: &str, all: bool) -> Result<Vec<ContainerSummary>>;

    /// List images whose repository matches `repository` exactly, any tag
    async fn list_images(&self, repository: &str) -> Result<Vec<ImageSummary>>;

    /// Create a named container from an image and start it
    async fn run(&self, config: &RunContainerConfig) -> Result<ContainerId>;

    /// Restart a container by name
    async fn restart(&self, name: &str) -> Result<()>;

    /// Stop a container by name, leaving it restartable
    async fn stop(&self, name: &str, timeout: Option<u32>) -> Result<()>;

    /// Check that the engine is reachable
    async fn ping(&self) -> Result<()>;

    /// Get engine information
    fn info(&self) -> RuntimeInfo;
}

/// Connect to the engine configured in `config`
pub async fn connect_runtime(
    config: &dappack_config::GlobalConfig,
) -> Result<Box<dyn ContainerRuntime>> {
    let runtime = DockerRuntime::connect(&config.runtime.socket).await?;
    Ok(Box::new(runtime))
}
