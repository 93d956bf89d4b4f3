//! Lighthouse CLI as the auditing engine.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;

use super::{AuditError, AuditReport, Auditor};
use crate::defaults::LIGHTHOUSE_PROGRAM;

const STDERR_TAIL_BYTES: usize = 2048;

/// Runs `lighthouse <url> --port=<port> --output=json` against an engine
/// that is already running.
#[derive(Debug, Clone)]
pub struct LighthouseCli {
    program: PathBuf,
}

impl LighthouseCli {
    pub fn new() -> Self {
        Self::with_program(LIGHTHOUSE_PROGRAM)
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for LighthouseCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Auditor for LighthouseCli {
    async fn audit(&self, url: &str, port: u16) -> crate::Result<AuditReport> {
        let output = Command::new(&self.program)
            .arg(url)
            .arg(format!("--port={}", port))
            .arg("--output=json")
            .arg("--quiet")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| AuditError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        let parse = match serde_json::from_slice::<Value>(&output.stdout) {
            Ok(lhr) if lhr.is_object() => {
                if !output.status.success() {
                    log::warn!("Lighthouse exited with {} but produced a report", output.status);
                }
                return Ok(AuditReport::from_lhr(lhr));
            }
            Ok(other) => format!("expected a JSON object, got {}", json_kind(&other)),
            Err(e) => e.to_string(),
        };

        Err(AuditError::Failed {
            status: output.status.to_string(),
            parse,
            stderr: stderr_tail(&output.stderr),
        }
        .into())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let start = stderr.len().saturating_sub(STDERR_TAIL_BYTES);
    String::from_utf8_lossy(&stderr[start..]).trim().to_string()
}
