//! Running one audit against a launched engine.

mod lighthouse;
mod report;
mod runner;

use async_trait::async_trait;
use thiserror::Error;

pub use lighthouse::LighthouseCli;
pub use report::{AuditReport, RuntimeError};
pub use runner::{classify, AuditResult, AuditRunner};

/// Errors raised by the auditing engine itself.
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Auditor exited with {status} without a report ({parse}): {stderr}")]
    Failed {
        status: String,
        parse: String,
        stderr: String,
    },
}

/// The auditing engine: audits `url` through an engine's debugging port.
#[async_trait]
pub trait Auditor: Send + Sync {
    async fn audit(&self, url: &str, port: u16) -> crate::Result<AuditReport>;
}
