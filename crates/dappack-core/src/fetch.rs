//! Source fetching for dapp builds

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("{command} failed: {stderr}")]
    Command { command: String, stderr: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fetches application source into a build workspace
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Clone `repository` into `dest`, checking out `tag` when given
    async fn fetch(
        &self,
        repository: &str,
        tag: Option<&str>,
        dest: &Path,
    ) -> std::result::Result<(), FetchError>;
}

/// Git-based fetcher shelling out to the `git` binary
pub struct GitFetcher;

#[async_trait]
impl SourceFetcher for GitFetcher {
    async fn fetch(
        &self,
        repository: &str,
        tag: Option<&str>,
        dest: &Path,
    ) -> std::result::Result<(), FetchError> {
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let dest_str = dest.to_string_lossy().to_string();
        run_git(&["clone", repository, dest_str.as_str()], None).await?;

        if let Some(tag) = tag {
            run_git(&["checkout", tag], Some(dest)).await?;
        }

        Ok(())
    }
}

/// Run a git command, capturing output. The child is killed if the calling
/// future is dropped, so fetches stay cancellable.
pub(crate) async fn run_git(
    args: &[&str],
    cwd: Option<&Path>,
) -> std::result::Result<(), FetchError> {
    let mut cmd = Command::new("git");
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(cwd) = cwd {
        cmd.current_dir(cwd);
    }

    let output = cmd.output().await?;
    if !output.status.success() {
        return Err(FetchError::Command {
            command: format!("git {}", args.join(" ")),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(())
}
