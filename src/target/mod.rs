//! Audit target provisioning.
//!
//! A target is either a URL that is already reachable, or a publish
//! directory served by a temporary local [`StaticServer`]. Either way the
//! caller gets back the URL to audit plus a [`ServerLifecycle`] to start
//! before the audit and stop after it.

pub mod server;

use std::path::Path;

use async_trait::async_trait;

use crate::defaults;
use crate::error::{Error, Result};

pub use server::{ServerError, StaticServer};

/// The URL an audit runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditTarget {
    url: String,
}

impl AuditTarget {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Start/stop capability for whatever serves an [`AuditTarget`].
///
/// `stop` must be safe to call when `start` never ran, and safe to call
/// more than once.
#[async_trait]
pub trait ServerLifecycle: Send {
    async fn start(&mut self) -> Result<()>;

    async fn stop(&mut self) -> Result<()>;

    /// True for lifecycles that never open a socket.
    fn is_noop(&self) -> bool {
        false
    }
}

/// Lifecycle for externally hosted targets.
#[derive(Debug, Default)]
pub struct NoopLifecycle;

#[async_trait]
impl ServerLifecycle for NoopLifecycle {
    async fn start(&mut self) -> Result<()> {
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn is_noop(&self) -> bool {
        true
    }
}

/// A target URL together with the lifecycle that makes it reachable.
pub struct ProvisionedTarget {
    pub target: AuditTarget,
    pub lifecycle: Box<dyn ServerLifecycle>,
}

impl std::fmt::Debug for ProvisionedTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisionedTarget")
            .field("target", &self.target)
            .field("noop", &self.lifecycle.is_noop())
            .finish()
    }
}

/// Produces the `(url, lifecycle)` pair for one run.
///
/// Provisioning does no I/O; any socket is opened by the lifecycle's `start`.
pub trait TargetProvisioner: Send + Sync {
    fn provision(
        &self,
        audit_url: Option<&str>,
        publish_dir: Option<&Path>,
    ) -> Result<ProvisionedTarget>;
}

/// Provisioner that serves publish directories on the fixed local address.
#[derive(Debug, Clone)]
pub struct SiteProvisioner {
    host: String,
    port: u16,
}

impl SiteProvisioner {
    pub fn new() -> Self {
        Self {
            host: defaults::LOCAL_HOST.to_string(),
            port: defaults::LOCAL_PORT,
        }
    }
}

impl Default for SiteProvisioner {
    fn default() -> Self {
        Self::new()
    }
}

impl TargetProvisioner for SiteProvisioner {
    fn provision(
        &self,
        audit_url: Option<&str>,
        publish_dir: Option<&Path>,
    ) -> Result<ProvisionedTarget> {
        if let Some(url) = audit_url {
            return Ok(ProvisionedTarget {
                target: AuditTarget::new(url),
                lifecycle: Box::new(NoopLifecycle),
            });
        }

        let Some(dir) = publish_dir else {
            return Err(Error::Configuration("Empty publish dir".into()));
        };

        log::info!("Serving and scanning site from directory '{}'", dir.display());

        Ok(ProvisionedTarget {
            target: AuditTarget::new(format!("http://{}:{}", self.host, self.port)),
            lifecycle: Box::new(StaticServer::new(dir, self.host.clone(), self.port)),
        })
    }
}
