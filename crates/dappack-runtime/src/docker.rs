//! Docker Engine runtime implementation using bollard

use crate::{
    ContainerId, ContainerRuntime, ContainerStatus, ContainerSummary, ImageSummary, Result,
    RunContainerConfig, RuntimeError, RuntimeInfo,
};
use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, ListContainersOptions, StartContainerOptions,
    StopContainerOptions,
};
use bollard::image::ListImagesOptions;
use bollard::service::{HostConfig, PortBinding};
use bollard::Docker;
use std::collections::HashMap;

/// Container runtime backed by the Docker Engine API.
///
/// Works against any Docker-compatible socket, Podman included.
pub struct DockerRuntime {
    client: Docker,
}

impl DockerRuntime {
    /// Connect to an engine API socket and verify it responds
    pub async fn connect(socket_path: &str) -> Result<Self> {
        let client = if socket_path.starts_with("unix://") || socket_path.starts_with('/') {
            let path = socket_path.trim_start_matches("unix://");
            Docker::connect_with_socket(path, 120, bollard::API_DEFAULT_VERSION)
                .map_err(|e| RuntimeError::Unavailable(e.to_string()))?
        } else if socket_path.starts_with("http://") || socket_path.starts_with("https://") {
            Docker::connect_with_http(socket_path, 120, bollard::API_DEFAULT_VERSION)
                .map_err(|e| RuntimeError::Unavailable(e.to_string()))?
        } else {
            // Assume it's a unix socket path
            Docker::connect_with_socket(socket_path, 120, bollard::API_DEFAULT_VERSION)
                .map_err(|e| RuntimeError::Unavailable(e.to_string()))?
        };

        // Test connection
        client
            .ping()
            .await
            .map_err(|e| RuntimeError::Unavailable(e.to_string()))?;

        Ok(Self { client })
    }

    /// Get the underlying Docker client
    pub fn client(&self) -> &Docker {
        &self.client
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn list_containers(&self, name: &str, all: bool) -> Result<Vec<ContainerSummary>> {
        let options = ListContainersOptions {
            all,
            filters: HashMap::from([("name".to_string(), vec![name.to_string()])]),
            ..Default::default()
        };

        let containers = self.client.list_containers(Some(options)).await?;

        // The engine's name filter is a substring match; keep exact matches only.
        Ok(containers
            .into_iter()
            .filter_map(|c| {
                let container_name = c
                    .names
                    .as_ref()
                    .and_then(|n| n.first())
                    .map(|n| n.trim_start_matches('/').to_string())?;
                if container_name != name {
                    return None;
                }
                Some(ContainerSummary {
                    id: ContainerId::new(c.id.unwrap_or_default()),
                    name: container_name,
                    image: c.image.unwrap_or_default(),
                    status: c
                        .state
                        .as_deref()
                        .map(ContainerStatus::from)
                        .unwrap_or(ContainerStatus::Unknown),
                    created: c.created.unwrap_or(0),
                    labels: c.labels.unwrap_or_default(),
                })
            })
            .collect())
    }

    async fn list_images(&self, repository: &str) -> Result<Vec<ImageSummary>> {
        let options = ListImagesOptions {
            all: false,
            filters: HashMap::from([("reference".to_string(), vec![repository.to_string()])]),
            ..Default::default()
        };

        let images = self.client.list_images(Some(options)).await?;

        // Keep images whose repository component matches exactly, any tag.
        Ok(images
            .into_iter()
            .filter(|img| {
                img.repo_tags.iter().any(|tag| {
                    tag == repository
                        || tag
                            .rsplit_once(':')
                            .map(|(repo, _)| repo == repository)
                            .unwrap_or(false)
                })
            })
            .map(|img| ImageSummary {
                id: img.id,
                repo_tags: img.repo_tags,
                created: img.created,
            })
            .collect())
    }

    async fn run(&self, config: &RunContainerConfig) -> Result<ContainerId> {
        let options = CreateContainerOptions {
            name: config.name.as_str(),
            platform: None,
        };

        // Build port bindings
        let mut port_bindings: HashMap<String, Option<Vec<PortBinding>>> = HashMap::new();
        let mut exposed_ports: HashMap<String, HashMap<(), ()>> = HashMap::new();

        for port in &config.ports {
            let container_port = format!("{}/{}", port.container_port, port.protocol);
            exposed_ports.insert(container_port.clone(), HashMap::new());

            let binding = PortBinding {
                host_ip: None,
                host_port: Some(port.host_port.to_string()),
            };
            port_bindings.insert(container_port, Some(vec![binding]));
        }

        let host_config = HostConfig {
            port_bindings: if port_bindings.is_empty() {
                None
            } else {
                Some(port_bindings)
            },
            ..Default::default()
        };

        let container_config = Config {
            image: Some(config.image.clone()),
            labels: if config.labels.is_empty() {
                None
            } else {
                Some(config.labels.clone())
            },
            exposed_ports: if exposed_ports.is_empty() {
                None
            } else {
                Some(exposed_ports)
            },
            host_config: Some(host_config),
            ..Default::default()
        };

        tracing::debug!("Creating container {} from {}", config.name, config.image);
        let response = self
            .client
            .create_container(Some(options), container_config)
            .await?;

        self.client
            .start_container(&response.id, None::<StartContainerOptions<String>>)
            .await?;

        Ok(ContainerId::new(response.id))
    }

    async fn restart(&self, name: &str) -> Result<()> {
        tracing::debug!("Restarting container {}", name);
        self.client.restart_container(name, None).await?;
        Ok(())
    }

    async fn stop(&self, name: &str, timeout: Option<u32>) -> Result<()> {
        let options = StopContainerOptions {
            t: timeout.unwrap_or(10) as i64,
        };
        tracing::debug!("Stopping container {}", name);
        self.client.stop_container(name, Some(options)).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.client
            .ping()
            .await
            .map_err(|e| RuntimeError::Unavailable(e.to_string()))?;
        Ok(())
    }

    fn info(&self) -> RuntimeInfo {
        RuntimeInfo {
            engine: "docker".to_string(),
            api_version: bollard::API_DEFAULT_VERSION.to_string(),
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        }
    }
}
