//! Browser engine subprocess handle and signal helpers.

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::process::Child;

use crate::defaults::ENGINE_KILL_GRACE;
use crate::engine::launcher::LifecycleError;

/// A live engine subprocess exposing a debugging port.
///
/// `kill` must be idempotent: the orchestrator calls it exactly once, but
/// the launcher may already have called it on a failed startup.
#[async_trait]
pub trait EngineProcess: Send {
    fn debug_port(&self) -> u16;

    async fn kill(&mut self) -> crate::Result<()>;
}

/// Stop a child process: SIGTERM, then SIGKILL once `grace` runs out.
///
/// The child is always reaped before this returns successfully.
pub async fn terminate(child: &mut Child, grace: Duration) -> io::Result<()> {
    if child.try_wait()?.is_some() {
        return Ok(());
    }

    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            if unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) } == 0 {
                match tokio::time::timeout(grace, child.wait()).await {
                    Ok(status) => return status.map(|_| ()),
                    Err(_) => {
                        log::warn!("Engine PID {} did not respond to SIGTERM, sending SIGKILL", pid)
                    }
                }
            }
        }
    }

    #[cfg(not(unix))]
    let _ = grace;

    child.kill().await
}

/// A Chromium subprocess launched for one audit.
pub struct ChromeProcess {
    child: Child,
    debug_port: u16,
    user_data_dir: Option<TempDir>,
    kill_grace: Duration,
    killed: bool,
}

impl ChromeProcess {
    pub(crate) fn new(child: Child, debug_port: u16, user_data_dir: Option<TempDir>) -> Self {
        Self {
            child,
            debug_port,
            user_data_dir,
            kill_grace: ENGINE_KILL_GRACE,
            killed: false,
        }
    }

    #[cfg(all(test, unix))]
    fn with_kill_grace(mut self, grace: Duration) -> Self {
        self.kill_grace = grace;
        self
    }

    /// OS process id, until the process has been reaped.
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    pub(crate) fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
        self.child.try_wait()
    }
}

#[async_trait]
impl EngineProcess for ChromeProcess {
    fn debug_port(&self) -> u16 {
        self.debug_port
    }

    async fn kill(&mut self) -> crate::Result<()> {
        if self.killed {
            return Ok(());
        }
        self.killed = true;

        let pid = self.child.id();
        terminate(&mut self.child, self.kill_grace)
            .await
            .map_err(|e| {
                LifecycleError::ShutdownFailed(format!("Failed to stop engine {:?}: {}", pid, e))
            })?;
        log::debug!("Engine PID {:?} stopped", pid);

        if let Some(dir) = self.user_data_dir.take() {
            if let Err(e) = dir.close() {
                log::debug!("Failed to remove engine profile directory: {}", e);
            }
        }
        Ok(())
    }
}
