//! Status resolution
//!
//! Statuses are never cached: every query re-derives the answer from what
//! the engine reports right now.

use super::{runtime_failure, LifecycleManager};
use crate::{container_name, DappStatus, Result};

impl LifecycleManager {
    /// Classify the current state of `uid` from the runtime alone.
    ///
    /// A container that exists but is not live counts as stopped, whatever
    /// the engine calls its state; that lets a container whose start failed
    /// be revived by the restart path. Images are deliberately not
    /// consulted: an image with no container reports nonexistent, matching
    /// the launch path that will reuse the image without rebuilding.
    pub async fn resolve_status(&self, uid: &str) -> Result<DappStatus> {
        let name = container_name(uid);

        let running = self
            .runtime
            .list_containers(&name, false)
            .await
            .map_err(|e| runtime_failure(uid, e))?;
        if !running.is_empty() {
            return Ok(DappStatus::Running);
        }

        let all = self
            .runtime
            .list_containers(&name, true)
            .await
            .map_err(|e| runtime_failure(uid, e))?;
        if let Some(existing) = all.first() {
            if existing.status.is_live() {
                return Ok(DappStatus::Running);
            }
            return Ok(DappStatus::Stopped);
        }

        Ok(DappStatus::Nonexistent)
    }
}
