//! Error types for dappack-core
//!
//! Failures carry the dapp uid wherever one is in scope, so callers always
//! know which application an error belongs to.

use dappack_config::ConfigError;
use dappack_runtime::RuntimeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Descriptor registry unavailable: {0}")]
    RegistryUnavailable(String),

    #[error("Unknown dapp: {0}")]
    UnknownDapp(String),

    #[error("Invalid descriptor for '{uid}': {source}")]
    DescriptorInvalid {
        uid: String,
        #[source]
        source: ConfigError,
    },

    #[error("Container runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    #[error("Failed to fetch source for '{uid}': {reason}")]
    SourceFetchFailed { uid: String, reason: String },

    #[error("Build failed for '{uid}': {reason}")]
    BuildFailed { uid: String, reason: String },

    #[error("Runtime command failed for '{uid}': {source}")]
    RuntimeCommandFailed {
        uid: String,
        #[source]
        source: RuntimeError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
