//! Error types for pagecheck.

use thiserror::Error;

/// pagecheck error type.
///
/// Every variant ends up as the message of a failed run; none of them is
/// retried.
#[derive(Error, Debug)]
pub enum Error {
    /// Neither an audit URL nor a publish directory was supplied
    #[error("{0}")]
    Configuration(String),

    /// No browser revision is installed locally
    #[error("Could not find local browser")]
    EngineNotFound,

    /// The audit completed but its report carries a runtime error
    #[error("{0}")]
    Runtime(String),

    /// Local static server error
    #[error("Server error: {0}")]
    Server(#[from] crate::target::server::ServerError),

    /// Engine launch or shutdown error
    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] crate::engine::launcher::LifecycleError),

    /// Auditing engine error
    #[error("Audit error: {0}")]
    Audit(#[from] crate::audit::AuditError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for pagecheck operations.
pub type Result<T> = std::result::Result<T, Error>;
