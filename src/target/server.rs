//! Temporary static-file server over a publish directory.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::services::ServeDir;

use super::ServerLifecycle;
use crate::defaults::SERVER_STOP_TIMEOUT;

/// Errors that can occur while serving a publish directory.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server already started")]
    AlreadyStarted,

    #[error("Server exited with error: {0}")]
    Serve(std::io::Error),

    #[error("Server task failed: {0}")]
    Task(String),

    #[error("Server did not shut down within {0:?}")]
    ShutdownTimedOut(std::time::Duration),
}

struct Running {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<std::io::Result<()>>,
}

/// Serves a directory over HTTP until stopped.
pub struct StaticServer {
    root: PathBuf,
    host: String,
    port: u16,
    running: Option<Running>,
}

impl StaticServer {
    pub fn new(root: impl Into<PathBuf>, host: impl Into<String>, port: u16) -> Self {
        Self {
            root: root.into(),
            host: host.into(),
            port,
            running: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Address the listener is bound to, while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|r| r.addr)
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }
}

#[async_trait]
impl ServerLifecycle for StaticServer {
    async fn start(&mut self) -> crate::Result<()> {
        if self.running.is_some() {
            return Err(ServerError::AlreadyStarted.into());
        }

        let listener = TcpListener::bind((self.host.as_str(), self.port))
            .await
            .map_err(|source| ServerError::Bind {
                addr: format!("{}:{}", self.host, self.port),
                source,
            })?;
        let addr = listener.local_addr()?;

        let app = Router::new().fallback_service(ServeDir::new(&self.root));
        let (shutdown, signal) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = signal.await;
                })
                .await
        });

        log::debug!("Serving {:?} on {}", self.root, addr);
        self.running = Some(Running {
            addr,
            shutdown,
            task,
        });
        Ok(())
    }

    async fn stop(&mut self) -> crate::Result<()> {
        let Some(Running {
            addr,
            shutdown,
            mut task,
        }) = self.running.take()
        else {
            return Ok(());
        };

        let _ = shutdown.send(());

        match tokio::time::timeout(SERVER_STOP_TIMEOUT, &mut task).await {
            Ok(Ok(Ok(()))) => {
                log::debug!("Server on {} stopped", addr);
                Ok(())
            }
            Ok(Ok(Err(e))) => Err(ServerError::Serve(e).into()),
            Ok(Err(e)) => Err(ServerError::Task(e.to_string()).into()),
            Err(_) => {
                task.abort();
                Err(ServerError::ShutdownTimedOut(SERVER_STOP_TIMEOUT).into())
            }
        }
    }
}

impl Drop for StaticServer {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.task.abort();
        }
    }
}
