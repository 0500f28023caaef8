use super::ArchiveError;
use super::reader::JarContents;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Receives one entry: archive path (`/`-separated, pre-relocation) and bytes.
pub(crate) type EntrySink<'a> = dyn FnMut(&str, &[u8]) -> Result<(), ArchiveError> + 'a;

/// Anything that contributes entries to an assembled archive.
///
/// Unreadable inputs are skipped with a warning; only sink failures and
/// failures halfway through a nested archive are returned.
pub(crate) trait EntrySource {
    fn location(&self) -> &Path;

    /// Feeds every entry to `sink` in a deterministic order and returns how
    /// many were delivered.
    fn for_each_entry(&self, sink: &mut EntrySink<'_>) -> Result<usize, ArchiveError>;
}

/// A directory tree copied with its relative paths.
pub(crate) struct DirectorySource {
    root: PathBuf,
    /// Files never copied, e.g. the archive being written into this tree.
    excluded: Vec<PathBuf>,
}

impl DirectorySource {
    pub(crate) fn new(root: impl Into<PathBuf>, excluded: Vec<PathBuf>) -> Self {
        Self {
            root: root.into(),
            excluded,
        }
    }
}

impl EntrySource for DirectorySource {
    fn location(&self) -> &Path {
        &self.root
    }

    fn for_each_entry(&self, sink: &mut EntrySink<'_>) -> Result<usize, ArchiveError> {
        let mut delivered = 0;
        for entry in WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable path under {}: {}", self.root.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_file() || self.excluded.iter().any(|p| p == entry.path()) {
                continue;
            }
            let Some(name) = archive_path(&self.root, entry.path()) else {
                continue;
            };
            let bytes = match std::fs::read(entry.path()) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!("Skipping unreadable file {}: {}", entry.path().display(), e);
                    continue;
                }
            };
            sink(&name, &bytes)?;
            delivered += 1;
        }
        Ok(delivered)
    }
}

/// `root`-relative path with `/` separators, `None` for the root itself or
/// non-UTF-8 names.
fn archive_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Option<Vec<&str>> = relative.iter().map(|c| c.to_str()).collect();
    let parts = parts?;
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// A zip file on the classpath whose file entries are expanded in place.
///
/// Entries are taken from the central directory, so a name repeated inside
/// the archive is delivered once per copy.
pub(crate) struct NestedArchiveSource {
    path: PathBuf,
}

impl NestedArchiveSource {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn open(&self) -> Option<JarContents> {
        match JarContents::open(&self.path) {
            Ok(contents) => Some(contents),
            Err(e) => {
                tracing::warn!("Skipping unreadable archive {}: {}", self.path.display(), e);
                None
            }
        }
    }
}

impl EntrySource for NestedArchiveSource {
    fn location(&self) -> &Path {
        &self.path
    }

    fn for_each_entry(&self, sink: &mut EntrySink<'_>) -> Result<usize, ArchiveError> {
        let Some(contents) = self.open() else {
            return Ok(0);
        };

        let mut delivered = 0;
        for entry in contents.entries().iter().filter(|e| !e.is_dir()) {
            let name = entry.name.trim_start_matches('/');
            if name.is_empty() {
                continue;
            }
            let bytes = contents
                .read(entry)
                .map_err(|source| ArchiveError::Nested {
                    path: self.path.clone(),
                    source,
                })?;
            sink(name, &bytes)?;
            delivered += 1;
        }
        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::writer::JarWriter;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn collect(source: &dyn EntrySource) -> Vec<(String, Vec<u8>)> {
        let mut seen = Vec::new();
        source
            .for_each_entry(&mut |name: &str, bytes: &[u8]| {
                seen.push((name.to_string(), bytes.to_vec()));
                Ok(())
            })
            .unwrap();
        seen
    }

    #[test]
    fn test_directory_walk_is_sorted_and_relative() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("com/example")).unwrap();
        std::fs::write(dir.path().join("com/example/B.class"), b"b").unwrap();
        std::fs::write(dir.path().join("com/example/A.class"), b"a").unwrap();
        std::fs::write(dir.path().join("app.properties"), b"p").unwrap();
        std::fs::write(dir.path().join("out.jar"), b"self").unwrap();

        let source = DirectorySource::new(dir.path(), vec![dir.path().join("out.jar")]);
        let names: Vec<_> = collect(&source).into_iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec!["app.properties", "com/example/A.class", "com/example/B.class"]
        );
    }

    #[test]
    fn test_nested_archive_skips_directories() {
        let dir = tempdir().unwrap();
        let jar = dir.path().join("lib.jar");
        {
            let mut zip = zip::ZipWriter::new(File::create(&jar).unwrap());
            let options = zip::write::SimpleFileOptions::default();
            zip.add_directory("com/", options).unwrap();
            zip.start_file("com/Lib.class", options).unwrap();
            zip.write_all(b"lib").unwrap();
            zip.finish().unwrap();
        }

        let seen = collect(&NestedArchiveSource::new(&jar));
        assert_eq!(seen, vec![("com/Lib.class".to_string(), b"lib".to_vec())]);
    }

    #[test]
    fn test_nested_archive_keeps_repeated_names() {
        let dir = tempdir().unwrap();
        let jar = dir.path().join("fat.jar");
        let mut writer = JarWriter::new(File::create(&jar).unwrap());
        writer.add_file("app.properties", b"one").unwrap();
        writer.add_file("app.properties", b"two").unwrap();
        writer.finish().unwrap();

        let seen = collect(&NestedArchiveSource::new(&jar));
        assert_eq!(
            seen,
            vec![
                ("app.properties".to_string(), b"one".to_vec()),
                ("app.properties".to_string(), b"two".to_vec()),
            ]
        );
    }

    #[test]
    fn test_broken_archive_contributes_nothing() {
        let dir = tempdir().unwrap();
        let jar = dir.path().join("broken.jar");
        std::fs::write(&jar, b"PK\x03\x04 truncated").unwrap();
        assert!(collect(&NestedArchiveSource::new(&jar)).is_empty());
    }
}
