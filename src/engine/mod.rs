//! Browser engine management.
//!
//! This module provides:
//! - Discovery of locally installed revisions (`discovery`)
//! - Subprocess launch and readiness (`launcher`)
//! - Subprocess shutdown (`process`)

pub mod discovery;
pub mod launcher;
pub mod process;

pub use discovery::{resolve_engine, BrowserFetcher, EngineDiscovery, EngineHandle, RevisionInfo};
pub use launcher::{ChromeLauncher, EngineLauncher, LifecycleError};
pub use process::{ChromeProcess, EngineProcess};
