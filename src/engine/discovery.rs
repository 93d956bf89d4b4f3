//! Discovery of browser engine revisions that are already installed.
//!
//! Installs follow the Puppeteer download layout: one folder per revision,
//! named `<platform>-<revision>`, holding the unpacked browser archive.
//! Nothing is downloaded here.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// A resolved, launchable browser engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineHandle {
    revision: String,
    executable_path: PathBuf,
}

impl EngineHandle {
    pub fn new(revision: impl Into<String>, executable_path: impl Into<PathBuf>) -> Self {
        Self {
            revision: revision.into(),
            executable_path: executable_path.into(),
        }
    }

    pub fn revision(&self) -> &str {
        &self.revision
    }

    pub fn executable_path(&self) -> &Path {
        &self.executable_path
    }
}

/// Where a revision lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionInfo {
    pub revision: String,
    pub folder_path: PathBuf,
    pub executable_path: PathBuf,
    /// Whether the executable actually exists.
    pub local: bool,
}

/// Lists locally installed revisions and maps them to executables.
pub trait EngineDiscovery: Send + Sync {
    fn local_revisions(&self) -> Result<Vec<String>>;

    fn revision_info(&self, revision: &str) -> RevisionInfo;
}

/// Pick the first installed revision, in the order discovery reports them.
pub fn resolve_engine(discovery: &dyn EngineDiscovery) -> Result<EngineHandle> {
    let revisions = discovery.local_revisions()?;
    let Some(revision) = revisions.first() else {
        return Err(Error::EngineNotFound);
    };

    let info = discovery.revision_info(revision);
    if !info.local {
        log::warn!(
            "Executable for revision {} not found at {:?}",
            info.revision,
            info.executable_path
        );
    }

    log::info!(
        "Using browser revision {} from {:?}",
        info.revision,
        info.executable_path
    );
    Ok(EngineHandle::new(info.revision, info.executable_path))
}

/// Host platform as named in download folder prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Mac,
    MacArm,
    Win32,
    Win64,
}

impl Platform {
    pub fn current() -> Self {
        match (std::env::consts::OS, std::env::consts::ARCH) {
            ("macos", "aarch64") => Platform::MacArm,
            ("macos", _) => Platform::Mac,
            ("windows", "x86") => Platform::Win32,
            ("windows", _) => Platform::Win64,
            _ => Platform::Linux,
        }
    }

    pub fn folder_prefix(self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Mac => "mac",
            Platform::MacArm => "mac_arm",
            Platform::Win32 => "win32",
            Platform::Win64 => "win64",
        }
    }

    /// Executable locations inside a revision folder, older archive layouts first.
    fn executable_candidates(self) -> &'static [&'static str] {
        match self {
            Platform::Linux => &["chrome-linux/chrome", "chrome-linux64/chrome"],
            Platform::Mac => &[
                "chrome-mac/Chromium.app/Contents/MacOS/Chromium",
                "chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing",
            ],
            Platform::MacArm => &[
                "chrome-mac/Chromium.app/Contents/MacOS/Chromium",
                "chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing",
            ],
            Platform::Win32 => &["chrome-win/chrome.exe", "chrome-win32/chrome.exe"],
            Platform::Win64 => &["chrome-win/chrome.exe", "chrome-win64/chrome.exe"],
        }
    }
}

/// Reads browser installs from a Puppeteer downloads directory.
#[derive(Debug, Clone)]
pub struct BrowserFetcher {
    downloads_dir: PathBuf,
    platform: Platform,
}

impl BrowserFetcher {
    /// Use the default Puppeteer cache under the home directory.
    pub fn new() -> Self {
        let downloads_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".cache")
            .join("puppeteer")
            .join("chrome");
        Self::with_dir(downloads_dir)
    }

    pub fn with_dir(downloads_dir: impl Into<PathBuf>) -> Self {
        Self {
            downloads_dir: downloads_dir.into(),
            platform: Platform::current(),
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn downloads_dir(&self) -> &Path {
        &self.downloads_dir
    }

    fn folder_name(&self, revision: &str) -> String {
        format!("{}-{}", self.platform.folder_prefix(), revision)
    }
}

impl Default for BrowserFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineDiscovery for BrowserFetcher {
    fn local_revisions(&self) -> Result<Vec<String>> {
        if !self.downloads_dir.is_dir() {
            log::debug!("No browser downloads at {:?}", self.downloads_dir);
            return Ok(Vec::new());
        }

        let mut folders = Vec::new();
        for entry in std::fs::read_dir(&self.downloads_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            match name.split_once('-') {
                Some((prefix, revision))
                    if prefix == self.platform.folder_prefix() && !revision.is_empty() =>
                {
                    folders.push(name.clone());
                }
                _ => log::debug!("Ignoring {:?} in browser downloads", name),
            }
        }

        folders.sort();
        let prefix_len = self.platform.folder_prefix().len() + 1;
        Ok(folders
            .into_iter()
            .map(|name| name[prefix_len..].to_string())
            .collect())
    }

    fn revision_info(&self, revision: &str) -> RevisionInfo {
        let folder_path = self.downloads_dir.join(self.folder_name(revision));
        let candidates = self.platform.executable_candidates();

        let found = candidates
            .iter()
            .map(|c| folder_path.join(c))
            .find(|p| p.is_file());

        let (executable_path, local) = match found {
            Some(path) => (path, true),
            None => (folder_path.join(candidates[0]), false),
        };

        RevisionInfo {
            revision: revision.to_string(),
            folder_path,
            executable_path,
            local,
        }
    }
}
