//! pagecheck - run a Lighthouse audit as a build pipeline step.
//!
//! Audits either an already reachable URL or a publish directory served on
//! `http://localhost:5000`, using a locally installed Chromium revision, and
//! reduces the run to a pass/fail [`Outcome`].

mod defaults;
pub mod error;

pub mod audit;
pub mod config;
pub mod engine;
pub mod orchestrator;
pub mod target;
pub mod utils;

pub use error::{Error, Result};

pub use config::AuditInputs;

pub use target::{
    AuditTarget, NoopLifecycle, ProvisionedTarget, ServerLifecycle, SiteProvisioner, StaticServer,
    TargetProvisioner,
};

pub use engine::{
    resolve_engine, BrowserFetcher, ChromeLauncher, ChromeProcess, EngineDiscovery, EngineHandle,
    EngineLauncher, EngineProcess, RevisionInfo,
};

pub use audit::{AuditReport, AuditResult, AuditRunner, Auditor, LighthouseCli, RuntimeError};

pub use orchestrator::{CleanupStack, Orchestrator, Outcome};
pub use utils::{BuildUtils, ExitProcess};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
