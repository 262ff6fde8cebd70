//! Test support utilities for dappack-core
//!
//! Provides mock collaborators for unit testing the LifecycleManager
//! without a real container engine, git, or nixpacks. The mocks are cheaply
//! cloneable handles over shared state, so tests can keep a handle after
//! moving a mock into the manager.

use crate::builder::{BuildError, ImageBuilder};
use crate::fetch::{FetchError, SourceFetcher};
use async_trait::async_trait;
use dappack_runtime::{
    ContainerId, ContainerRuntime, ContainerStatus, ContainerSummary, ImageSummary,
    RunContainerConfig, RuntimeError, RuntimeInfo,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Records which methods were called on the mock runtime
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    ListContainers { name: String, all: bool },
    ListImages { repository: String },
    Run { image: String, name: String },
    Restart { name: String },
    Stop { name: String },
    Ping,
}

/// Which error the mock runtime should produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    Unavailable,
    CommandFailed,
}

/// Configurable in-memory container engine.
///
/// Mutating calls update the recorded containers, so a status query after a
/// run/restart/stop sees what a real engine would report.
#[derive(Clone, Default)]
pub struct MockRuntime {
    calls: Arc<Mutex<Vec<MockCall>>>,
    containers: Arc<Mutex<Vec<ContainerSummary>>>,
    images: Arc<Mutex<Vec<ImageSummary>>>,
    failure: Arc<Mutex<Option<MockFailure>>>,
    last_run: Arc<Mutex<Option<RunContainerConfig>>>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle sharing this mock's state, usable after the mock is moved
    pub fn handle(&self) -> Self {
        self.clone()
    }

    /// Seed a container in the given state
    pub fn add_container(&self, name: &str, status: ContainerStatus) {
        self.containers.lock().unwrap().push(ContainerSummary {
            id: ContainerId::new(format!("mock-{}", name)),
            name: name.to_string(),
            image: "mock-image:latest".to_string(),
            status,
            created: 0,
            labels: HashMap::new(),
        });
    }

    /// Seed an image tagged `latest`
    pub fn add_image(&self, repository: &str, created: i64) {
        self.add_image_tagged(repository, "latest", created);
    }

    /// Seed an image with an explicit tag
    pub fn add_image_tagged(&self, repository: &str, tag: &str, created: i64) {
        self.images.lock().unwrap().push(ImageSummary {
            id: format!("sha256:mock-{}-{}", repository.replace('/', "-"), tag),
            repo_tags: vec![format!("{}:{}", repository, tag)],
            created,
        });
    }

    /// Make every subsequent call fail with the given error
    pub fn fail_with(&self, failure: MockFailure) {
        *self.failure.lock().unwrap() = Some(failure);
    }

    /// All recorded calls
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Image the last `run` call used, if any
    pub fn last_run_image(&self) -> Option<String> {
        self.last_run.lock().unwrap().as_ref().map(|c| c.image.clone())
    }

    /// `(host, container)` ports the last `run` call published
    pub fn last_run_ports(&self) -> Vec<(u16, u16)> {
        self.last_run
            .lock()
            .unwrap()
            .as_ref()
            .map(|c| {
                c.ports
                    .iter()
                    .map(|p| (p.host_port, p.container_port))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn record(&self, call: MockCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_failure(&self) -> Result<(), RuntimeError> {
        match *self.failure.lock().unwrap() {
            Some(MockFailure::Unavailable) => Err(RuntimeError::Unavailable(
                "mock engine unreachable".to_string(),
            )),
            Some(MockFailure::CommandFailed) => Err(RuntimeError::CommandFailed(
                "mock command failed".to_string(),
            )),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ContainerRuntime for MockRuntime {
    async fn list_containers(
        &self,
        name: &str,
        all: bool,
    ) -> Result<Vec<ContainerSummary>, RuntimeError> {
        self.record(MockCall::ListContainers {
            name: name.to_string(),
            all,
        });
        self.check_failure()?;
        Ok(self
            .containers
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.name == name)
            .filter(|c| all || c.status.is_live())
            .cloned()
            .collect())
    }

    async fn list_images(&self, repository: &str) -> Result<Vec<ImageSummary>, RuntimeError> {
        self.record(MockCall::ListImages {
            repository: repository.to_string(),
        });
        self.check_failure()?;
        Ok(self
            .images
            .lock()
            .unwrap()
            .iter()
            .filter(|img| {
                img.repo_tags.iter().any(|tag| {
                    tag == repository
                        || tag
                            .rsplit_once(':')
                            .map(|(repo, _)| repo == repository)
                            .unwrap_or(false)
                })
            })
            .cloned()
            .collect())
    }

    async fn run(&self, config: &RunContainerConfig) -> Result<ContainerId, RuntimeError> {
        self.record(MockCall::Run {
            image: config.image.clone(),
            name: config.name.clone(),
        });
        self.check_failure()?;

        let mut containers = self.containers.lock().unwrap();
        if containers.iter().any(|c| c.name == config.name) {
            return Err(RuntimeError::CommandFailed(format!(
                "container name {} already in use",
                config.name
            )));
        }
        containers.push(ContainerSummary {
            id: ContainerId::new(format!("mock-{}", config.name)),
            name: config.name.clone(),
            image: config.image.clone(),
            status: ContainerStatus::Running,
            created: 0,
            labels: config.labels.clone(),
        });
        drop(containers);

        *self.last_run.lock().unwrap() = Some(config.clone());
        Ok(ContainerId::new("mock_container_id"))
    }

    async fn restart(&self, name: &str) -> Result<(), RuntimeError> {
        self.record(MockCall::Restart {
            name: name.to_string(),
        });
        self.check_failure()?;

        let mut containers = self.containers.lock().unwrap();
        match containers.iter_mut().find(|c| c.name == name) {
            Some(container) => {
                container.status = ContainerStatus::Running;
                Ok(())
            }
            None => Err(RuntimeError::ContainerNotFound(name.to_string())),
        }
    }

    async fn stop(&self, name: &str, _timeout: Option<u32>) -> Result<(), RuntimeError> {
        self.record(MockCall::Stop {
            name: name.to_string(),
        });
        self.check_failure()?;

        let mut containers = self.containers.lock().unwrap();
        match containers.iter_mut().find(|c| c.name == name) {
            Some(container) => {
                container.status = ContainerStatus::Exited;
                Ok(())
            }
            None => Err(RuntimeError::ContainerNotFound(name.to_string())),
        }
    }

    async fn ping(&self) -> Result<(), RuntimeError> {
        self.record(MockCall::Ping);
        self.check_failure()
    }

    fn info(&self) -> RuntimeInfo {
        RuntimeInfo {
            engine: "mock".to_string(),
            api_version: "mock".to_string(),
            os: "test".to_string(),
            arch: "test".to_string(),
        }
    }
}

/// Fetcher that fabricates a source checkout on disk
#[derive(Clone, Default)]
pub struct MockFetcher {
    calls: Arc<Mutex<Vec<(String, Option<String>)>>>,
    fail: Arc<Mutex<bool>>,
    delay: Arc<Mutex<Option<Duration>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> Self {
        self.clone()
    }

    /// Make subsequent fetches fail
    pub fn fail(&self) {
        *self.fail.lock().unwrap() = true;
    }

    /// Artificial latency, for exercising the per-uid critical section
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// All recorded `(repository, tag)` fetches
    pub fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceFetcher for MockFetcher {
    async fn fetch(
        &self,
        repository: &str,
        tag: Option<&str>,
        dest: &Path,
    ) -> Result<(), FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push((repository.to_string(), tag.map(|t| t.to_string())));

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if *self.fail.lock().unwrap() {
            return Err(FetchError::Command {
                command: format!("git clone {}", repository),
                stderr: "mock fetch failure".to_string(),
            });
        }

        std::fs::create_dir_all(dest)?;
        Ok(())
    }
}

/// One recorded build invocation
#[derive(Debug, Clone)]
pub struct MockBuild {
    pub image_name: String,
    pub source_dir: PathBuf,
    /// Whether `nixpacks.toml` was staged in the workspace at build time
    pub saw_descriptor: bool,
}

/// Builder that records invocations instead of building
#[derive(Clone, Default)]
pub struct MockBuilder {
    calls: Arc<Mutex<Vec<MockBuild>>>,
    fail: Arc<Mutex<bool>>,
}

impl MockBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> Self {
        self.clone()
    }

    /// Make subsequent builds fail
    pub fn fail(&self) {
        *self.fail.lock().unwrap() = true;
    }

    /// Make subsequent builds succeed again
    pub fn succeed(&self) {
        *self.fail.lock().unwrap() = false;
    }

    /// All recorded builds
    pub fn calls(&self) -> Vec<MockBuild> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageBuilder for MockBuilder {
    async fn build(&self, image_name: &str, source_dir: &Path) -> Result<String, BuildError> {
        self.calls.lock().unwrap().push(MockBuild {
            image_name: image_name.to_string(),
            source_dir: source_dir.to_path_buf(),
            saw_descriptor: source_dir.join("nixpacks.toml").is_file(),
        });

        if *self.fail.lock().unwrap() {
            return Err(BuildError::Tool("mock build failure".to_string()));
        }

        Ok(image_name.to_string())
    }
}
