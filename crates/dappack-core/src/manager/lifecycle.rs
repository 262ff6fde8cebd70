//! Run control: the state machine that takes a dapp to running

use super::{runtime_failure, LifecycleManager};
use crate::{container_name, service_url, CoreError, DappStatus, Result};
use dappack_config::DappDescriptor;
use dappack_runtime::{PublishedPort, RunContainerConfig};
use std::collections::HashMap;

impl LifecycleManager {
    /// Take the dapp to running and return its service URL.
    ///
    /// The full status-check-then-act sequence runs inside the per-uid
    /// critical section, so concurrent calls for one dapp cannot race each
    /// other into duplicate builds or container name conflicts.
    pub async fn ensure_running(
        &self,
        descriptor: &DappDescriptor,
        force_rebuild: bool,
    ) -> Result<String> {
        let uid = &descriptor.dapp.uid;
        descriptor
            .validate()
            .map_err(|e| CoreError::DescriptorInvalid {
                uid: uid.clone(),
                source: e,
            })?;

        let lock = self.lock_for(uid);
        let _guard = lock.lock().await;

        let url = service_url(descriptor.dapp.http_port);

        match self.resolve_status(uid).await? {
            DappStatus::Running => {
                tracing::debug!("'{}' is already running", uid);
                Ok(url)
            }
            DappStatus::Stopped => {
                // A stopped container is always just restarted, even when a
                // rebuild was requested; the image it runs is the one it was
                // created from.
                if force_rebuild {
                    tracing::debug!(
                        "'{}' has a stopped container; restarting it and ignoring the rebuild request",
                        uid
                    );
                }
                let name = container_name(uid);
                tracing::info!("Restarting container {} for '{}'", name, uid);
                self.runtime
                    .restart(&name)
                    .await
                    .map_err(|e| runtime_failure(uid, e))?;
                Ok(url)
            }
            DappStatus::Nonexistent => {
                let image = self.ensure_image(descriptor, force_rebuild).await?;
                let name = container_name(uid);

                let ports = descriptor
                    .exposed_ports()
                    .iter()
                    .map(|p| PublishedPort {
                        host_port: p.host,
                        container_port: p.container,
                        protocol: "tcp".to_string(),
                    })
                    .collect();

                let labels = HashMap::from([
                    ("dappack.managed".to_string(), "true".to_string()),
                    ("dappack.uid".to_string(), uid.clone()),
                ]);

                tracing::info!("Starting container {} from {} for '{}'", name, image, uid);
                self.runtime
                    .run(&RunContainerConfig {
                        image,
                        name,
                        ports,
                        labels,
                    })
                    .await
                    .map_err(|e| runtime_failure(uid, e))?;

                Ok(url)
            }
        }
    }

    /// Stop a running dapp, leaving its container restartable.
    ///
    /// A dapp that is not running is left untouched.
    pub async fn stop(&self, uid: &str) -> Result<()> {
        dappack_config::validate_uid(uid).map_err(|e| CoreError::DescriptorInvalid {
            uid: uid.to_string(),
            source: e,
        })?;

        let lock = self.lock_for(uid);
        let _guard = lock.lock().await;

        match self.resolve_status(uid).await? {
            DappStatus::Running => {
                let name = container_name(uid);
                tracing::info!("Stopping container {} for '{}'", name, uid);
                self.runtime
                    .stop(&name, Some(10))
                    .await
                    .map_err(|e| runtime_failure(uid, e))
            }
            _ => {
                tracing::debug!("'{}' is not running; nothing to stop", uid);
                Ok(())
            }
        }
    }
}
