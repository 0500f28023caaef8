//! Java toolchain discovery.
//!
//! Looks for a JDK in, in order:
//! - an explicit home directory
//! - the JAVA_HOME environment variable
//! - the macOS java_home tool
//! - common installation paths and SDKMAN

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("{0} is not a Java installation (no bin/java)")]
    NotAJdk(PathBuf),
    #[error("classpath entry cannot be joined: {0}")]
    InvalidClasspath(String),
}

/// A located Java installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaToolchain {
    home: PathBuf,
    /// Full version string, e.g. `17.0.9` or `1.8.0_392`.
    version: Option<String>,
}

impl JavaToolchain {
    /// Uses `home` as the Java installation, failing if it has no launcher.
    pub fn from_home(home: impl Into<PathBuf>) -> Result<Self, ToolchainError> {
        let home = home.into();
        if !java_executable_in(&home).is_file() {
            return Err(ToolchainError::NotAJdk(home));
        }
        let version = detect_jdk_version(&home);
        Ok(Self { home, version })
    }

    /// Searches the usual places for a Java installation.
    pub fn discover() -> Option<Self> {
        // 1. Check JAVA_HOME
        if let Ok(java_home) = std::env::var("JAVA_HOME") {
            if let Ok(toolchain) = Self::from_home(&java_home) {
                debug!("Using JAVA_HOME toolchain at {}", java_home);
                return Some(toolchain);
            }
        }

        // 2. macOS specific: Use java_home tool
        #[cfg(target_os = "macos")]
        if let Ok(output) = std::process::Command::new("/usr/libexec/java_home").output() {
            if output.status.success() {
                let path_str = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if let Ok(toolchain) = Self::from_home(&path_str) {
                    return Some(toolchain);
                }
            }
        }

        // 3. Search common installation paths
        for root in search_roots() {
            if let Some(toolchain) = Self::scan_root(&root) {
                debug!("Discovered toolchain at {}", toolchain.home.display());
                return Some(toolchain);
            }
        }

        None
    }

    /// Accepts `root` itself as a JDK, or the first JDK directly beneath it.
    fn scan_root(root: &Path) -> Option<Self> {
        if !root.exists() {
            return None;
        }
        if let Ok(toolchain) = Self::from_home(root) {
            return Some(toolchain);
        }

        let mut candidates: Vec<PathBuf> = std::fs::read_dir(root)
            .ok()?
            .flatten()
            .map(|entry| {
                let path = entry.path();
                if cfg!(target_os = "macos") && path.join("Contents/Home").exists() {
                    path.join("Contents/Home")
                } else {
                    path
                }
            })
            .collect();
        // Deterministic pick when several JDKs are installed side by side
        candidates.sort();
        candidates
            .into_iter()
            .find_map(|path| Self::from_home(path).ok())
    }

    /// Language level as the manifest reports it: `1.8` for legacy versions,
    /// the feature release (`17`, `21`) otherwise.
    pub fn language_version(&self) -> Option<String> {
        self.version.as_deref().map(language_version)
    }

    pub fn java_executable(&self) -> PathBuf {
        java_executable_in(&self.home)
    }
}

fn java_executable_in(home: &Path) -> PathBuf {
    let bin = home.join("bin");
    if cfg!(windows) {
        bin.join("java.exe")
    } else {
        bin.join("java")
    }
}

fn search_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();

    #[cfg(target_os = "macos")]
    {
        roots.push(PathBuf::from("/Library/Java/JavaVirtualMachines/"));
        roots.push(PathBuf::from("/opt/homebrew/opt/openjdk/"));
        roots.push(PathBuf::from("/usr/local/opt/openjdk/"));
    }
    #[cfg(target_os = "linux")]
    {
        roots.push(PathBuf::from("/usr/lib/jvm/"));
    }
    #[cfg(target_os = "windows")]
    {
        roots.push(PathBuf::from("C:\\Program Files\\Java\\"));
    }

    // SDKMAN
    if let Some(mut sdkman) = dirs::home_dir() {
        sdkman.push(".sdkman/candidates/java/");
        roots.push(sdkman);
    }

    roots
}

/// Reads `JAVA_VERSION` from the JDK `release` file, falling back to a
/// `jdk-<version>` component in the installation path.
pub fn detect_jdk_version(jdk_root: &Path) -> Option<String> {
    let release_file = jdk_root.join("release");
    if let Ok(content) = std::fs::read_to_string(&release_file) {
        for line in content.lines() {
            if let Some(value) = line.strip_prefix("JAVA_VERSION=") {
                return Some(value.trim_matches('"').to_string());
            }
        }
    }

    let path_str = jdk_root.to_string_lossy();
    regex::Regex::new(r"jdk-?(\d+(?:\.\d+)*)")
        .ok()
        .and_then(|re| re.captures(&path_str))
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

fn language_version(full: &str) -> String {
    let mut parts = full.split(['.', '_', '-', '+']);
    match (parts.next(), parts.next()) {
        (Some("1"), Some(minor)) => format!("1.{}", minor),
        (Some(major), _) => major.to_string(),
        _ => full.to_string(),
    }
}
