//! CLI command implementations

use anyhow::Result;
use dappack_core::{DappStatus, LifecycleManager};
use serde::Serialize;

/// One row of `list --json` output
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DappRow {
    uid: String,
    status: DappStatus,
    service_url: String,
}

/// List registry dapps with their current status
pub async fn list(manager: &LifecycleManager, json: bool) -> Result<()> {
    let uids = manager.list_dapps().await?;

    if json {
        let mut rows = Vec::new();
        for uid in uids {
            let report = manager.status(&uid).await?;
            rows.push(DappRow {
                uid,
                status: report.status,
                service_url: report.service_url,
            });
        }
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if uids.is_empty() {
        println!("No dapps found in the registry.");
        return Ok(());
    }

    const UID_WIDTH: usize = 28;
    const STATUS_WIDTH: usize = 12;

    println!("  {:<UID_WIDTH$} {:<STATUS_WIDTH$} URL", "UID", "STATUS");
    println!("{}", "-".repeat(60));

    for uid in uids {
        match manager.status(&uid).await {
            Ok(report) => {
                let symbol = match report.status {
                    DappStatus::Running => "●",
                    DappStatus::Stopped => "○",
                    DappStatus::Nonexistent => "◌",
                };
                let url = if report.status == DappStatus::Running {
                    report.service_url.as_str()
                } else {
                    "-"
                };
                println!(
                    "{} {:<UID_WIDTH$} {:<STATUS_WIDTH$} {}",
                    symbol,
                    uid,
                    report.status.to_string(),
                    url
                );
            }
            Err(e) => {
                println!("? {:<UID_WIDTH$} {}", uid, e);
            }
        }
    }

    Ok(())
}

/// Show the status of a single dapp
pub async fn status(manager: &LifecycleManager, uid: &str, json: bool) -> Result<()> {
    let report = manager.status(uid).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("'{}' is {}", uid, report.status);
    if report.status == DappStatus::Running {
        println!("Serving at {}", report.service_url);
    }
    Ok(())
}

/// Print the descriptor as it will be handed to the build tool
pub async fn show(manager: &LifecycleManager, uid: &str) -> Result<()> {
    let descriptor = manager.descriptor(uid).await?;
    print!("{}", descriptor.to_toml()?);
    Ok(())
}

/// Build (if needed) and run a dapp
pub async fn run(manager: &LifecycleManager, uid: &str, reset: bool) -> Result<()> {
    if reset {
        println!("Rebuilding and launching '{}'...", uid);
    } else {
        println!("Launching '{}'...", uid);
    }

    let report = manager.run(uid, reset).await?;
    println!("'{}' is running at {}", uid, report.service_url);
    Ok(())
}

/// Stop a running dapp
pub async fn stop(manager: &LifecycleManager, uid: &str) -> Result<()> {
    manager.stop(uid).await?;
    println!("Stopped '{}'", uid);
    Ok(())
}
