//! Error types for container runtimes

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Failed to connect to container runtime: {0}")]
    Unavailable(String),

    #[error("Container not found: {0}")]
    ContainerNotFound(String),

    #[error("Runtime command failed: {0}")]
    CommandFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<bollard::errors::Error> for RuntimeError {
    fn from(e: bollard::errors::Error) -> Self {
        use bollard::errors::Error as BollardError;
        match &e {
            BollardError::DockerResponseServerError {
                status_code: 404,
                message,
            } => Self::ContainerNotFound(message.clone()),
            BollardError::RequestTimeoutError | BollardError::IOError { .. } => {
                Self::Unavailable(e.to_string())
            }
            _ => Self::CommandFailed(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
