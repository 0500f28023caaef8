use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How a classpath location contributes to packaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClasspathEntryKind {
    Directory,
    File,
}

/// A classpath location classified against the current filesystem.
///
/// Classification is never cached: call [`ClasspathEntry::classify`] again for
/// every assembly, since classpath contents change between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClasspathEntry {
    pub path: PathBuf,
    pub kind: ClasspathEntryKind,
}

impl ClasspathEntry {
    /// Classifies `path`, returning `None` when it is neither a directory nor a
    /// regular file (missing, dangling symlink, special file).
    pub fn classify(path: &Path) -> Option<Self> {
        let kind = if path.is_dir() {
            ClasspathEntryKind::Directory
        } else if path.is_file() {
            ClasspathEntryKind::File
        } else {
            return None;
        };
        Some(Self {
            path: path.to_path_buf(),
            kind,
        })
    }

    pub fn is_directory(&self) -> bool {
        self.kind == ClasspathEntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == ClasspathEntryKind::File
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_classify_reflects_filesystem() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("lib.jar");
        std::fs::write(&file, b"PK\x03\x04").unwrap();

        let as_dir = ClasspathEntry::classify(dir.path()).unwrap();
        assert!(as_dir.is_directory());

        let as_file = ClasspathEntry::classify(&file).unwrap();
        assert!(as_file.is_file());

        assert!(ClasspathEntry::classify(&dir.path().join("missing.jar")).is_none());
    }

    #[test]
    fn test_classify_is_not_cached() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out");

        std::fs::write(&path, b"x").unwrap();
        assert!(ClasspathEntry::classify(&path).unwrap().is_file());

        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();
        assert!(ClasspathEntry::classify(&path).unwrap().is_directory());
    }
}
