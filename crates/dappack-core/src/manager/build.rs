//! Build coordination
//!
//! Ensures a runnable image exists for a dapp, building only when required.
//! Each build attempt gets its own staging workspace, so retried builds and
//! concurrent builds of different dapps never collide.

use super::{runtime_failure, LifecycleManager};
use crate::{image_name, CoreError, Result};
use dappack_config::DappDescriptor;
use std::path::Path;
use uuid::Uuid;

impl LifecycleManager {
    /// Ensure a runnable image exists for the descriptor, returning its name.
    ///
    /// Unless `force_rebuild` is set, the newest existing image for the
    /// derived name is reused without building.
    pub async fn ensure_image(
        &self,
        descriptor: &DappDescriptor,
        force_rebuild: bool,
    ) -> Result<String> {
        let uid = &descriptor.dapp.uid;
        let image = image_name(uid);

        if !force_rebuild {
            let mut existing = self
                .runtime
                .list_images(&image)
                .await
                .map_err(|e| runtime_failure(uid, e))?;
            if !existing.is_empty() {
                existing.sort_by(|a, b| b.created.cmp(&a.created));
                let newest = existing
                    .first()
                    .and_then(|img| img.repo_tags.iter().find(|t| t.starts_with(&image)))
                    .cloned()
                    .unwrap_or_else(|| image.clone());
                tracing::debug!("Reusing existing image {} for '{}'", newest, uid);
                return Ok(newest);
            }
        }

        self.build_image(descriptor, &image).await
    }

    /// Stage a workspace, fetch the source, and drive a fresh build
    async fn build_image(&self, descriptor: &DappDescriptor, image: &str) -> Result<String> {
        let uid = &descriptor.dapp.uid;
        let staging = std::env::temp_dir().join(format!("dappack-build-{}", Uuid::new_v4()));
        let workspace = staging.join(uid);

        let result = self.build_in(descriptor, image, &workspace).await;

        // The staging directory is unique per attempt; removal is best-effort.
        if let Err(e) = tokio::fs::remove_dir_all(&staging).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to clean build workspace {:?}: {}", staging, e);
            }
        }

        result
    }

    async fn build_in(
        &self,
        descriptor: &DappDescriptor,
        image: &str,
        workspace: &Path,
    ) -> Result<String> {
        let uid = &descriptor.dapp.uid;

        tracing::info!(
            "Fetching source for '{}' from {}",
            uid,
            descriptor.dapp.repository
        );
        let fetch = self.fetcher.fetch(
            &descriptor.dapp.repository,
            descriptor.dapp.tag.as_deref(),
            workspace,
        );
        match tokio::time::timeout(self.config.build.fetch_timeout(), fetch).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(CoreError::SourceFetchFailed {
                    uid: uid.clone(),
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(CoreError::SourceFetchFailed {
                    uid: uid.clone(),
                    reason: format!("timed out after {}s", self.config.build.fetch_timeout_secs),
                })
            }
        }

        // The build tool plans from the same document the registry served.
        let rendered = descriptor
            .to_toml()
            .map_err(|e| CoreError::DescriptorInvalid {
                uid: uid.clone(),
                source: e,
            })?;
        tokio::fs::write(workspace.join("nixpacks.toml"), rendered).await?;

        tracing::info!("Building image {} for '{}'", image, uid);
        let build = self.builder.build(image, workspace);
        match tokio::time::timeout(self.config.build.build_timeout(), build).await {
            Ok(Ok(built)) => {
                tracing::info!("Built image {} for '{}'", built, uid);
                Ok(built)
            }
            Ok(Err(e)) => Err(CoreError::BuildFailed {
                uid: uid.clone(),
                reason: e.to_string(),
            }),
            Err(_) => Err(CoreError::BuildFailed {
                uid: uid.clone(),
                reason: format!("timed out after {}s", self.config.build.build_timeout_secs),
            }),
        }
    }
}
