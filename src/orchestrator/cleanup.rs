//! Ordered release of the resources acquired during one run.

use crate::engine::EngineProcess;
use crate::target::ServerLifecycle;

enum Pending {
    Target(Box<dyn ServerLifecycle>),
    Engine(Box<dyn EngineProcess>),
}

impl Pending {
    fn label(&self) -> &'static str {
        match self {
            Pending::Target(_) => "audit target",
            Pending::Engine(_) => "browser engine",
        }
    }

    async fn release(&mut self) -> crate::Result<()> {
        match self {
            Pending::Target(lifecycle) => lifecycle.stop().await,
            Pending::Engine(process) => process.kill().await,
        }
    }
}

/// Release actions registered as resources are acquired.
///
/// `release_all` runs them newest first, each exactly once. A failing
/// release is logged and the remaining ones still run.
#[derive(Default)]
pub struct CleanupStack {
    pending: Vec<Pending>,
}

impl CleanupStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_target(&mut self, lifecycle: Box<dyn ServerLifecycle>) {
        self.pending.push(Pending::Target(lifecycle));
    }

    pub fn push_engine(&mut self, process: Box<dyn EngineProcess>) {
        self.pending.push(Pending::Engine(process));
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub async fn release_all(&mut self) {
        while let Some(mut resource) = self.pending.pop() {
            match resource.release().await {
                Ok(()) => log::debug!("Released {}", resource.label()),
                Err(e) => log::warn!("Failed to release {}: {}", resource.label(), e),
            }
        }
    }
}

impl Drop for CleanupStack {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            log::warn!(
                "Dropping {} unreleased resource(s); relying on drop handlers",
                self.pending.len()
            );
        }
    }
}

impl std::fmt::Debug for CleanupStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.pending.iter().map(Pending::label))
            .finish()
    }
}
