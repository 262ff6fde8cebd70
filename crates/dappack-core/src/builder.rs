//! Image building for dapps
//!
//! The builder turns a fetched source workspace into a runnable container
//! image. The default implementation drives nixpacks, which plans the build
//! from the `nixpacks.toml` the coordinator stages next to the source.

use async_trait::async_trait;
use nixpacks::nixpacks::builder::docker::DockerBuilderOptions;
use nixpacks::nixpacks::plan::generator::GeneratePlanOptions;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("invalid build workspace path: {0}")]
    BadPath(String),

    #[error("{0}")]
    Tool(String),
}

/// Builds a container image from a prepared source directory
#[async_trait]
pub trait ImageBuilder: Send + Sync {
    /// Build `image_name` from `source_dir`, returning the image name
    async fn build(
        &self,
        image_name: &str,
        source_dir: &Path,
    ) -> std::result::Result<String, BuildError>;
}

/// Nixpacks-backed builder
pub struct NixpacksBuilder {
    /// Extra KEY=VALUE environment entries passed into the build
    env: Vec<String>,
}

impl NixpacksBuilder {
    pub fn new(env: Vec<String>) -> Self {
        Self { env }
    }
}

#[async_trait]
impl ImageBuilder for NixpacksBuilder {
    async fn build(
        &self,
        image_name: &str,
        source_dir: &Path,
    ) -> std::result::Result<String, BuildError> {
        let path = source_dir
            .to_str()
            .ok_or_else(|| BuildError::BadPath(source_dir.display().to_string()))?;
        let config_file = source_dir.join("nixpacks.toml");

        let envs: Vec<&str> = self.env.iter().map(|s| s.as_str()).collect();

        let plan_options = GeneratePlanOptions {
            config_file: config_file.to_str().map(|s| s.to_string()),
            ..Default::default()
        };
        let build_options = DockerBuilderOptions {
            name: Some(image_name.to_string()),
            quiet: false,
            ..Default::default()
        };

        nixpacks::create_docker_image(path, envs, &plan_options, &build_options)
            .await
            .map_err(|e| BuildError::Tool(format!("{:?}", e)))?;

        Ok(image_name.to_string())
    }
}
