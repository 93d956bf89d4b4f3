//! Invocation inputs.

use std::path::{Path, PathBuf};

/// What to audit: an externally reachable URL, or a directory to serve.
///
/// Blank values count as absent, matching how pipeline platforms hand over
/// unset inputs as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditInputs {
    audit_url: Option<String>,
    publish_dir: Option<PathBuf>,
}

impl AuditInputs {
    pub fn new(audit_url: Option<String>, publish_dir: Option<PathBuf>) -> Self {
        Self {
            audit_url: audit_url
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty()),
            publish_dir: publish_dir.filter(|d| !d.as_os_str().is_empty()),
        }
    }

    /// Audit an already reachable URL.
    pub fn url(url: impl Into<String>) -> Self {
        Self::new(Some(url.into()), None)
    }

    /// Serve and audit a local build output directory.
    pub fn directory(dir: impl Into<PathBuf>) -> Self {
        Self::new(None, Some(dir.into()))
    }

    pub fn audit_url(&self) -> Option<&str> {
        self.audit_url.as_deref()
    }

    pub fn publish_dir(&self) -> Option<&Path> {
        self.publish_dir.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values_are_absent() {
        let inputs = AuditInputs::new(Some("  ".into()), Some(PathBuf::new()));
        assert_eq!(inputs.audit_url(), None);
        assert_eq!(inputs.publish_dir(), None);
    }

    #[test]
    fn test_url_is_trimmed() {
        let inputs = AuditInputs::url(" https://example.com/ ");
        assert_eq!(inputs.audit_url(), Some("https://example.com/"));
        assert_eq!(inputs.publish_dir(), None);
    }

    #[test]
    fn test_both_inputs_kept() {
        let inputs = AuditInputs::new(Some("https://example.com".into()), Some("dist".into()));
        assert_eq!(inputs.audit_url(), Some("https://example.com"));
        assert_eq!(inputs.publish_dir(), Some(Path::new("dist")));
    }
}
