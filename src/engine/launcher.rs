//! Browser engine launch.
//!
//! Provides the `ChromeLauncher` which:
//! - Spawns the resolved executable with the fixed headless flag set
//! - Waits for the DevTools debugging port to answer
//! - Kills the subprocess again if it never becomes ready

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tokio::process::Command;

use crate::defaults::{
    ENGINE_FLAGS, ENGINE_STARTUP_TIMEOUT, READY_POLL_INTERVAL, READY_PROBE_TIMEOUT,
};
use crate::engine::discovery::EngineHandle;
use crate::engine::process::{ChromeProcess, EngineProcess};

/// Errors that can occur during engine lifecycle management.
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("Engine startup failed: {0}")]
    StartupFailed(String),

    #[error("Engine shutdown failed: {0}")]
    ShutdownFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LifecycleError>;

/// Starts an engine subprocess for a resolved [`EngineHandle`].
///
/// On error no subprocess may be left running.
#[async_trait]
pub trait EngineLauncher: Send + Sync {
    async fn launch(&self, engine: &EngineHandle) -> crate::Result<Box<dyn EngineProcess>>;
}

/// Subset of the `/json/version` DevTools endpoint.
#[derive(Debug, Deserialize)]
struct VersionInfo {
    #[serde(rename = "Browser", default)]
    browser: String,
    #[serde(rename = "webSocketDebuggerUrl", default)]
    web_socket_debugger_url: Option<String>,
}

/// Launches Chromium with remote debugging enabled.
pub struct ChromeLauncher {
    client: Client,
    startup_timeout: Duration,
}

impl ChromeLauncher {
    pub fn new() -> Self {
        Self::with_startup_timeout(ENGINE_STARTUP_TIMEOUT)
    }

    pub fn with_startup_timeout(startup_timeout: Duration) -> Self {
        let client = Client::builder()
            .no_proxy()
            .timeout(READY_PROBE_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            startup_timeout,
        }
    }

    async fn wait_for_debug_port(&self, process: &mut ChromeProcess) -> Result<()> {
        let port = process.debug_port();
        let url = format!("http://127.0.0.1:{}/json/version", port);
        let deadline = Instant::now() + self.startup_timeout;

        log::debug!("Waiting for engine debugging port {}", port);

        while Instant::now() < deadline {
            if let Some(status) = process.try_wait()? {
                return Err(LifecycleError::StartupFailed(format!(
                    "Engine exited with {} before exposing its debugging port",
                    status
                )));
            }

            match self.client.get(&url).send().await {
                Ok(response) if response.status().is_success() => {
                    match response.json::<VersionInfo>().await {
                        Ok(info) => log::info!(
                            "Engine {} ready on port {} ({})",
                            info.browser,
                            port,
                            info.web_socket_debugger_url.as_deref().unwrap_or("no websocket")
                        ),
                        Err(e) => log::debug!("Unreadable /json/version payload: {}", e),
                    }
                    return Ok(());
                }
                Ok(response) => {
                    log::debug!("Debugging port {} answered {}", port, response.status())
                }
                Err(e) => log::trace!("Debugging port {} not ready: {}", port, e),
            }

            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }

        Err(LifecycleError::StartupFailed(format!(
            "Timed out after {}s waiting for debugging port {}",
            self.startup_timeout.as_secs_f32(),
            port
        )))
    }
}

impl Default for ChromeLauncher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EngineLauncher for ChromeLauncher {
    async fn launch(&self, engine: &EngineHandle) -> crate::Result<Box<dyn EngineProcess>> {
        let port = free_port()?;
        let user_data_dir = tempfile::Builder::new()
            .prefix("pagecheck-profile-")
            .tempdir()?;

        log::info!("Launching browser from {:?}", engine.executable_path());

        let child = Command::new(engine.executable_path())
            .args(engine_args(port, user_data_dir.path()))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| LifecycleError::StartupFailed(format!("Failed to spawn engine: {}", e)))?;

        let mut process = ChromeProcess::new(child, port, Some(user_data_dir));

        if let Err(e) = self.wait_for_debug_port(&mut process).await {
            if let Err(kill_err) = process.kill().await {
                log::warn!("Failed to stop engine after startup failure: {}", kill_err);
            }
            return Err(e.into());
        }

        Ok(Box::new(process))
    }
}

/// Command line for one engine launch.
pub fn engine_args(port: u16, user_data_dir: &Path) -> Vec<String> {
    let mut args: Vec<String> = ENGINE_FLAGS.iter().map(|f| f.to_string()).collect();
    args.push(format!("--remote-debugging-port={}", port));
    args.push(format!("--user-data-dir={}", user_data_dir.display()));
    args.push("--no-first-run".into());
    args.push("--no-default-browser-check".into());
    args.push("about:blank".into());
    args
}

/// Ask the OS for an unused loopback port.
fn free_port() -> std::io::Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_args_carry_fixed_flags() {
        let args = engine_args(9333, Path::new("/tmp/profile"));
        assert_eq!(&args[..3], &["--headless", "--no-sandbox", "--disable-gpu"]);
        assert!(args.contains(&"--remote-debugging-port=9333".to_string()));
        assert!(args.contains(&"--user-data-dir=/tmp/profile".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("about:blank"));
    }

    #[test]
    fn test_free_port_is_nonzero() {
        assert_ne!(free_port().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_executable_fails_startup() {
        let launcher = ChromeLauncher::with_startup_timeout(Duration::from_secs(1));
        let engine = EngineHandle::new("0", "/nonexistent/pagecheck/chrome");

        let err = launcher.launch(&engine).await.err().unwrap();
        assert!(matches!(
            err,
            crate::Error::Lifecycle(LifecycleError::StartupFailed(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_engine_exiting_early_fails_startup() {
        let launcher = ChromeLauncher::with_startup_timeout(Duration::from_secs(5));
        let engine = EngineHandle::new("0", "true");

        let err = launcher.launch(&engine).await.err().unwrap();
        assert!(err.to_string().contains("exited"), "unexpected error: {}", err);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_silent_engine_times_out() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("chrome");
        std::fs::write(&script, "#!/bin/sh\nexec sleep 30\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let launcher = ChromeLauncher::with_startup_timeout(Duration::from_millis(500));
        let err = launcher
            .launch(&EngineHandle::new("0", &script))
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("Timed out"), "unexpected error: {}", err);
    }
}
