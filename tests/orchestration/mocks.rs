use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use pagecheck::audit::AuditError;
use pagecheck::engine::LifecycleError;
use pagecheck::{
    AuditReport, Auditor, BuildUtils, EngineDiscovery, EngineHandle, EngineLauncher,
    EngineProcess, ProvisionedTarget, RevisionInfo, ServerLifecycle, SiteProvisioner,
    StaticServer, TargetProvisioner,
};

pub(crate) type Events = Arc<Mutex<Vec<String>>>;
pub(crate) type AddrSlot = Arc<Mutex<Option<SocketAddr>>>;

pub(crate) fn recorded(events: &Events) -> Vec<String> {
    events.lock().unwrap().clone()
}

fn push(events: &Events, event: impl Into<String>) {
    events.lock().unwrap().push(event.into());
}

/// How a publish directory is served in a test.
#[derive(Clone)]
pub(crate) enum Site {
    /// Nothing is bound; start/stop are only recorded.
    Fake { fail_start: bool, fail_stop: bool },
    /// A real server on an ephemeral loopback port.
    Ephemeral(AddrSlot),
}

/// Wraps the real provisioner so every lifecycle call is recorded.
pub(crate) struct Provisioner {
    pub(crate) events: Events,
    pub(crate) site: Site,
}

impl TargetProvisioner for Provisioner {
    fn provision(
        &self,
        audit_url: Option<&str>,
        publish_dir: Option<&Path>,
    ) -> pagecheck::Result<ProvisionedTarget> {
        let provisioned = SiteProvisioner::new().provision(audit_url, publish_dir)?;

        let inner: Box<dyn ServerLifecycle> = if provisioned.lifecycle.is_noop() {
            provisioned.lifecycle
        } else {
            match &self.site {
                Site::Fake {
                    fail_start,
                    fail_stop,
                } => Box::new(FakeServer {
                    fail_start: *fail_start,
                    fail_stop: *fail_stop,
                }),
                Site::Ephemeral(slot) => Box::new(EphemeralServer {
                    server: StaticServer::new(
                        publish_dir.map(PathBuf::from).unwrap_or_default(),
                        "127.0.0.1",
                        0,
                    ),
                    slot: slot.clone(),
                }),
            }
        };

        Ok(ProvisionedTarget {
            target: provisioned.target,
            lifecycle: Box::new(Recording {
                inner,
                events: self.events.clone(),
            }),
        })
    }
}

struct Recording {
    inner: Box<dyn ServerLifecycle>,
    events: Events,
}

#[async_trait]
impl ServerLifecycle for Recording {
    async fn start(&mut self) -> pagecheck::Result<()> {
        let kind = if self.inner.is_noop() { "noop" } else { "server" };
        push(&self.events, format!("start {}", kind));
        self.inner.start().await
    }

    async fn stop(&mut self) -> pagecheck::Result<()> {
        push(&self.events, "stop");
        self.inner.stop().await
    }

    fn is_noop(&self) -> bool {
        self.inner.is_noop()
    }
}

struct FakeServer {
    fail_start: bool,
    fail_stop: bool,
}

#[async_trait]
impl ServerLifecycle for FakeServer {
    async fn start(&mut self) -> pagecheck::Result<()> {
        if self.fail_start {
            return Err(pagecheck::Error::Io(std::io::Error::new(
                std::io::ErrorKind::AddrInUse,
                "port taken",
            )));
        }
        Ok(())
    }

    async fn stop(&mut self) -> pagecheck::Result<()> {
        if self.fail_stop {
            return Err(pagecheck::Error::Io(std::io::Error::other("close failed")));
        }
        Ok(())
    }
}

struct EphemeralServer {
    server: StaticServer,
    slot: AddrSlot,
}

#[async_trait]
impl ServerLifecycle for EphemeralServer {
    async fn start(&mut self) -> pagecheck::Result<()> {
        self.server.start().await?;
        *self.slot.lock().unwrap() = self.server.local_addr();
        Ok(())
    }

    async fn stop(&mut self) -> pagecheck::Result<()> {
        self.server.stop().await
    }
}

pub(crate) struct Discovery {
    pub(crate) revisions: Vec<&'static str>,
    /// Listing the downloads folder fails with a permission error.
    pub(crate) unreadable: bool,
}

impl EngineDiscovery for Discovery {
    fn local_revisions(&self) -> pagecheck::Result<Vec<String>> {
        if self.unreadable {
            return Err(pagecheck::Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "downloads unreadable",
            )));
        }
        Ok(self.revisions.iter().map(|r| r.to_string()).collect())
    }

    fn revision_info(&self, revision: &str) -> RevisionInfo {
        let folder_path = PathBuf::from("/browsers").join(revision);
        RevisionInfo {
            revision: revision.to_string(),
            executable_path: folder_path.join("chrome"),
            folder_path,
            local: true,
        }
    }
}

pub(crate) struct Launcher {
    pub(crate) events: Events,
    pub(crate) fail: bool,
    pub(crate) kill_fails: bool,
}

#[async_trait]
impl EngineLauncher for Launcher {
    async fn launch(&self, engine: &EngineHandle) -> pagecheck::Result<Box<dyn EngineProcess>> {
        push(&self.events, format!("launch {}", engine.revision()));
        if self.fail {
            return Err(LifecycleError::StartupFailed("engine crashed".into()).into());
        }
        Ok(Box::new(Process {
            events: self.events.clone(),
            kill_fails: self.kill_fails,
        }))
    }
}

struct Process {
    events: Events,
    kill_fails: bool,
}

#[async_trait]
impl EngineProcess for Process {
    fn debug_port(&self) -> u16 {
        9222
    }

    async fn kill(&mut self) -> pagecheck::Result<()> {
        push(&self.events, "kill");
        if self.kill_fails {
            return Err(LifecycleError::ShutdownFailed("still running".into()).into());
        }
        Ok(())
    }
}

pub(crate) enum Response {
    Report(serde_json::Value),
    Error(&'static str),
}

pub(crate) struct Audit {
    pub(crate) events: Events,
    pub(crate) response: Response,
    /// When set, records whether the local server accepts connections.
    pub(crate) site_addr: Option<AddrSlot>,
}

#[async_trait]
impl Auditor for Audit {
    async fn audit(&self, url: &str, port: u16) -> pagecheck::Result<AuditReport> {
        push(&self.events, format!("audit {} port {}", url, port));

        let addr = self.site_addr.as_ref().and_then(|slot| *slot.lock().unwrap());
        if let Some(addr) = addr {
            let listening = tokio::net::TcpStream::connect(addr).await.is_ok();
            push(&self.events, format!("listening {}", listening));
        }

        match &self.response {
            Response::Report(value) => Ok(AuditReport::new(value.clone())),
            Response::Error(message) => Err(AuditError::Failed {
                status: "exit status: 1".into(),
                parse: "EOF while parsing a value at line 1 column 0".into(),
                stderr: message.to_string(),
            }
            .into()),
        }
    }
}

#[derive(Default)]
pub(crate) struct Utils {
    pub(crate) failures: Mutex<Vec<String>>,
}

impl BuildUtils for Utils {
    fn fail_build(&self, message: &str) {
        self.failures.lock().unwrap().push(message.to_string());
    }
}
