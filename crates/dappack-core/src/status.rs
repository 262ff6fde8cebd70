//! Dapp status reporting

use serde::{Deserialize, Serialize};

/// Authoritative status of a dapp, re-derived from the runtime on every query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DappStatus {
    /// A live container exists under the derived container name
    Running,
    /// A container exists under the derived name but is not live
    Stopped,
    /// No container exists under the derived name
    Nonexistent,
}

impl std::fmt::Display for DappStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
            Self::Nonexistent => write!(f, "nonexistent"),
        }
    }
}

/// Status payload returned to callers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DappReport {
    pub status: DappStatus,
    pub service_url: String,
}
