use super::{AuditReport, Auditor};
use crate::engine::{EngineHandle, EngineLauncher};
use crate::orchestrator::CleanupStack;

/// Classification of a report that was returned without error.
#[derive(Debug, Clone, PartialEq)]
pub enum AuditResult {
    Report(AuditReport),
    /// The report carried `runtimeError`; holds the engine's message.
    RuntimeError(String),
}

/// A report is only a pass when it carries no runtime error.
pub fn classify(report: AuditReport) -> AuditResult {
    match report.runtime_error() {
        Some(err) => AuditResult::RuntimeError(err.message),
        None => AuditResult::Report(report),
    }
}

/// Launches the engine and audits one URL through it.
pub struct AuditRunner {
    launcher: Box<dyn EngineLauncher>,
    auditor: Box<dyn Auditor>,
}

impl AuditRunner {
    pub fn new(launcher: impl EngineLauncher + 'static, auditor: impl Auditor + 'static) -> Self {
        Self {
            launcher: Box::new(launcher),
            auditor: Box::new(auditor),
        }
    }

    /// The launched process goes onto `cleanup` before the audit starts, so
    /// an audit failure still leaves it to be killed by the caller.
    pub async fn run(
        &self,
        url: &str,
        engine: &EngineHandle,
        cleanup: &mut CleanupStack,
    ) -> crate::Result<AuditResult> {
        let process = self.launcher.launch(engine).await?;
        let port = process.debug_port();
        cleanup.push_engine(process);

        log::info!("Auditing {} through debugging port {}", url, port);
        let report = self.auditor.audit(url, port).await?;

        Ok(classify(report))
    }
}
