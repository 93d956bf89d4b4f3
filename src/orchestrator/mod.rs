//! Audit orchestration.
//!
//! One run moves through `Start → TargetReady → EngineResolved →
//! AuditRunning → Cleanup → Done` without ever going back. Whatever happens
//! before `Cleanup`, the engine is killed and then the target is stopped
//! before the [`Outcome`] is handed out.

mod cleanup;

use std::fmt;

use crate::audit::{AuditReport, AuditResult, AuditRunner, Auditor, LighthouseCli};
use crate::config::AuditInputs;
use crate::engine::{resolve_engine, BrowserFetcher, ChromeLauncher, EngineDiscovery, EngineLauncher};
use crate::error::{Error, Result};
use crate::target::{ProvisionedTarget, SiteProvisioner, TargetProvisioner};
use crate::utils::{BuildUtils, ExitProcess};

pub use cleanup::CleanupStack;

/// Terminal result of one run.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(AuditReport),
    Failure(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Outcome::Failure(message) => Some(message),
            Outcome::Success(_) => None,
        }
    }

    pub fn into_report(self) -> Option<AuditReport> {
        match self {
            Outcome::Success(report) => Some(report),
            Outcome::Failure(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Start,
    TargetReady,
    EngineResolved,
    AuditRunning,
    Cleanup,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::TargetReady => "target-ready",
            Stage::EngineResolved => "engine-resolved",
            Stage::AuditRunning => "audit-running",
            Stage::Cleanup => "cleanup",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Sequences provisioning, engine resolution and the audit for one run.
pub struct Orchestrator {
    provisioner: Box<dyn TargetProvisioner>,
    discovery: Box<dyn EngineDiscovery>,
    runner: AuditRunner,
}

impl Orchestrator {
    pub fn new(
        provisioner: impl TargetProvisioner + 'static,
        discovery: impl EngineDiscovery + 'static,
        launcher: impl EngineLauncher + 'static,
        auditor: impl Auditor + 'static,
    ) -> Self {
        Self {
            provisioner: Box::new(provisioner),
            discovery: Box::new(discovery),
            runner: AuditRunner::new(launcher, auditor),
        }
    }

    /// Run one audit. Never fails: every error becomes [`Outcome::Failure`].
    pub async fn run(&self, inputs: &AuditInputs) -> Outcome {
        let mut stage = Stage::Start;
        let mut cleanup = CleanupStack::new();

        let result = self.drive(inputs, &mut cleanup, &mut stage).await;
        if let Err(e) = &result {
            log::debug!("Run failed in stage {}: {}", stage, e);
        }

        advance(&mut stage, Stage::Cleanup);
        cleanup.release_all().await;
        advance(&mut stage, Stage::Done);

        match result {
            Ok(AuditResult::Report(report)) => Outcome::Success(report),
            Ok(AuditResult::RuntimeError(message)) => {
                Outcome::Failure(Error::Runtime(message).to_string())
            }
            Err(e) => Outcome::Failure(e.to_string()),
        }
    }

    /// Build-plugin entry point.
    ///
    /// On failure, reports `failed with error: <reason>` through `utils`,
    /// or through [`ExitProcess`] when no utilities are supplied.
    pub async fn on_success(
        &self,
        inputs: &AuditInputs,
        utils: Option<&dyn BuildUtils>,
    ) -> Option<AuditReport> {
        match self.run(inputs).await {
            Outcome::Success(report) => {
                for (category, score) in report.category_scores() {
                    match score {
                        Some(score) => log::info!("{}: {:.0}", category, score * 100.0),
                        None => log::info!("{}: not scored", category),
                    }
                }
                Some(report)
            }
            Outcome::Failure(message) => {
                log::error!("Error: {}", message);
                let utils = utils.unwrap_or(&ExitProcess);
                utils.fail_build(&format!("failed with error: {}", message));
                None
            }
        }
    }

    async fn drive(
        &self,
        inputs: &AuditInputs,
        cleanup: &mut CleanupStack,
        stage: &mut Stage,
    ) -> Result<AuditResult> {
        let ProvisionedTarget {
            target,
            mut lifecycle,
        } = self
            .provisioner
            .provision(inputs.audit_url(), inputs.publish_dir())?;

        // Registered before the start result is checked, so a half-started
        // server is still stopped
        let started = lifecycle.start().await;
        cleanup.push_target(lifecycle);
        started?;
        advance(stage, Stage::TargetReady);

        let engine = resolve_engine(self.discovery.as_ref())?;
        advance(stage, Stage::EngineResolved);

        advance(stage, Stage::AuditRunning);
        self.runner.run(target.url(), &engine, cleanup).await
    }
}

impl Default for Orchestrator {
    /// Local site provisioning, Puppeteer browser downloads, Chromium and
    /// the Lighthouse CLI.
    fn default() -> Self {
        Self::new(
            SiteProvisioner::new(),
            BrowserFetcher::new(),
            ChromeLauncher::new(),
            LighthouseCli::new(),
        )
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    log::debug!("{} -> {}", stage, next);
    *stage = next;
}
