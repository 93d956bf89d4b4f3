//! Fixed values for the local server, the browser engine and the audit.

use std::time::Duration;

/// Host the local static server binds to.
pub const LOCAL_HOST: &str = "localhost";
/// Port the local static server binds to.
pub const LOCAL_PORT: u16 = 5000;

/// Flags every engine launch carries. The pipeline runs unattended in a
/// container, so these are not configurable.
pub const ENGINE_FLAGS: &[&str] = &["--headless", "--no-sandbox", "--disable-gpu"];

pub const ENGINE_STARTUP_TIMEOUT: Duration = Duration::from_secs(60);
pub const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const READY_PROBE_TIMEOUT: Duration = Duration::from_secs(2);
pub const ENGINE_KILL_GRACE: Duration = Duration::from_secs(5);
pub const SERVER_STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Lighthouse CLI program name, resolved through `PATH`.
pub const LIGHTHOUSE_PROGRAM: &str = "lighthouse";
