//! Remote gateway error types

use thiserror::Error;

/// Errors reported by remote collaborators
///
/// Messages carry the remote service's own wording; they are not translated.
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Object storage error: {0}")]
    Storage(String),

    #[error("Deployment service error: {0}")]
    Deployment(String),

    #[error("Application not found: {0}")]
    ApplicationNotFound(String),

    #[error("Credentials error: {0}")]
    Credentials(String),
}

pub type Result<T> = std::result::Result<T, CloudError>;
