//! Merges a main output tree and a classpath into one executable jar.
//!
//! Arrival order is fixed: the main output, then classpath directories in
//! classpath order, then zip files in classpath order, each source fully
//! expanded before the next one starts. Relocation applies to every source.
//! Entries sharing a final path are all written, in that order.

use super::ArchiveError;
use super::manifest::{MANIFEST_PATH, ManifestDefaults, configure_manifest, write_manifest};
use super::relocation::RelocationRules;
use super::sniff::is_zip;
use super::source::{DirectorySource, EntrySource, NestedArchiveSource};
use super::writer::{Compression, JarWriter};
use jarsmith_api::{ClasspathEntry, ManifestAttributes};
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const META_INF_DIR: &str = "META-INF/";

/// Inputs of one assembly.
#[derive(Debug, Clone, Default)]
pub struct ArchiveRequest {
    pub destination: PathBuf,
    /// Compiled classes and resources of the application itself.
    pub main_output: Option<PathBuf>,
    /// Classpath locations, classified when the assembly runs.
    pub classpath: Vec<PathBuf>,
    /// Attributes fixed by the caller; never overwritten by defaults.
    pub manifest_seed: ManifestAttributes,
    pub defaults: ManifestDefaults,
}

/// What one assembly produced.
#[derive(Debug, Clone)]
pub struct AssembledArchive {
    pub path: PathBuf,
    pub manifest: ManifestAttributes,
    /// Entries written, the `META-INF/` directory and manifest included.
    pub entry_count: usize,
    /// Entries whose final path had already been written.
    pub duplicate_count: usize,
    /// Classpath locations that contributed nothing.
    pub skipped: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct ArchiveAssembler {
    relocation: RelocationRules,
    compression: Compression,
}

impl ArchiveAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_relocation(mut self, relocation: RelocationRules) -> Self {
        self.relocation = relocation;
        self
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub fn assemble(&self, request: &ArchiveRequest) -> Result<AssembledArchive, ArchiveError> {
        let destination = request.destination.as_path();
        let manifest = configure_manifest(&request.manifest_seed, &request.defaults);
        let manifest_bytes = write_manifest(&manifest)?;

        let write_err = |source| ArchiveError::Write {
            path: destination.to_path_buf(),
            source,
        };

        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let temp_path = temp_path_for(destination);
        let excluded = vec![destination.to_path_buf(), temp_path.clone()];

        tracing::info!("Assembling {}", destination.display());

        let file = File::create(&temp_path).map_err(write_err)?;
        let mut writer = JarWriter::with_compression(BufWriter::new(file), self.compression);
        let mut seen: HashSet<String> = HashSet::new();
        let mut duplicate_count = 0usize;

        let result = (|| -> Result<Vec<PathBuf>, ArchiveError> {
            writer.add_directory(META_INF_DIR).map_err(write_err)?;
            writer
                .add_file(MANIFEST_PATH, &manifest_bytes)
                .map_err(write_err)?;
            seen.insert(META_INF_DIR.to_string());
            seen.insert(MANIFEST_PATH.to_string());

            let (sources, skipped) = self.collect_sources(request, &excluded);

            for source in &sources {
                let mut sink = |name: &str, bytes: &[u8]| -> Result<(), ArchiveError> {
                    // The archive's own manifest is the one written above
                    if name == MANIFEST_PATH {
                        tracing::trace!("Ignoring manifest of {}", source.location().display());
                        return Ok(());
                    }
                    let final_path = self.relocation.relocate(name);
                    if final_path != name {
                        tracing::trace!("Relocated {} -> {}", name, final_path);
                    }
                    if !seen.insert(final_path.to_string()) {
                        duplicate_count += 1;
                        tracing::debug!(
                            "Duplicate entry {} from {}",
                            final_path,
                            source.location().display()
                        );
                    }
                    writer.add_file(&final_path, bytes).map_err(write_err)
                };
                let delivered = source.for_each_entry(&mut sink)?;
                tracing::debug!(
                    "Copied {} entries from {}",
                    delivered,
                    source.location().display()
                );
            }
            Ok(skipped)
        })();

        let skipped = match result {
            Ok(skipped) => skipped,
            Err(e) => {
                drop(writer);
                let _ = std::fs::remove_file(&temp_path);
                return Err(e);
            }
        };

        let entry_count = writer.entry_count();
        let finished = writer
            .finish()
            .and_then(|out| out.into_inner().map_err(|e| e.into_error()))
            .and_then(|mut file| {
                file.flush()?;
                file.sync_all()
            });
        if let Err(e) = finished {
            let _ = std::fs::remove_file(&temp_path);
            return Err(write_err(e));
        }
        std::fs::rename(&temp_path, destination).map_err(write_err)?;

        tracing::info!(
            "Wrote {} ({} entries, {} duplicates)",
            destination.display(),
            entry_count,
            duplicate_count
        );

        Ok(AssembledArchive {
            path: destination.to_path_buf(),
            manifest,
            entry_count,
            duplicate_count,
            skipped,
        })
    }

    /// Orders every contributing source and reports the classpath locations
    /// that contribute nothing.
    fn collect_sources(
        &self,
        request: &ArchiveRequest,
        excluded: &[PathBuf],
    ) -> (Vec<Box<dyn EntrySource>>, Vec<PathBuf>) {
        let mut sources: Vec<Box<dyn EntrySource>> = Vec::new();
        let mut skipped = Vec::new();

        if let Some(main_output) = &request.main_output {
            if main_output.is_dir() {
                sources.push(Box::new(DirectorySource::new(
                    main_output,
                    excluded.to_vec(),
                )));
            } else {
                tracing::warn!("Main output {} does not exist", main_output.display());
            }
        }

        let mut directories = Vec::new();
        let mut files = Vec::new();
        for path in &request.classpath {
            match ClasspathEntry::classify(path) {
                Some(entry) if entry.is_directory() => directories.push(entry),
                Some(entry) => files.push(entry),
                None => {
                    tracing::warn!("Skipping missing classpath entry {}", path.display());
                    skipped.push(path.clone());
                }
            }
        }

        for entry in directories {
            sources.push(Box::new(DirectorySource::new(
                entry.path,
                excluded.to_vec(),
            )));
        }
        for entry in files {
            if excluded.contains(&entry.path) {
                skipped.push(entry.path);
            } else if is_zip(&entry.path) {
                sources.push(Box::new(NestedArchiveSource::new(entry.path)));
            } else {
                tracing::debug!("Not a zip, skipping {}", entry.path.display());
                skipped.push(entry.path);
            }
        }

        (sources, skipped)
    }
}

fn temp_path_for(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("archive"));
    name.push(".tmp");
    destination.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::reader::JarContents;
    use jarsmith_api::attribute;
    use tempfile::tempdir;

    #[test]
    fn test_archive_starts_with_manifest() {
        let dir = tempdir().unwrap();
        let classes = dir.path().join("classes");
        std::fs::create_dir_all(classes.join("com/x")).unwrap();
        std::fs::write(classes.join("com/x/App.class"), b"app").unwrap();

        let request = ArchiveRequest {
            destination: dir.path().join("libs/app.jar"),
            main_output: Some(classes),
            defaults: ManifestDefaults {
                main_class: Some("com.x.App".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let assembled = ArchiveAssembler::new().assemble(&request).unwrap();
        assert_eq!(assembled.entry_count, 3);
        assert!(!temp_path_for(&request.destination).exists());

        let jar = JarContents::open(&assembled.path).unwrap();
        let names: Vec<_> = jar.names().collect();
        assert_eq!(names, vec!["META-INF/", MANIFEST_PATH, "com/x/App.class"]);
        let manifest = jar.manifest().unwrap().unwrap();
        assert_eq!(manifest.get(attribute::MAIN_CLASS), Some("com.x.App"));
    }

    #[test]
    fn test_main_output_is_relocated_like_any_input() {
        let dir = tempdir().unwrap();
        let classes = dir.path().join("classes");
        std::fs::create_dir_all(classes.join("a/b")).unwrap();
        std::fs::create_dir_all(classes.join("META-INF/services")).unwrap();
        std::fs::write(classes.join("a/b/module-info.class"), b"m").unwrap();
        std::fs::write(classes.join("META-INF/foo.txt"), b"f").unwrap();
        std::fs::write(classes.join("META-INF/services/x.Y"), b"impl").unwrap();

        let request = ArchiveRequest {
            destination: dir.path().join("app.jar"),
            main_output: Some(classes),
            ..Default::default()
        };
        let assembled = ArchiveAssembler::new().assemble(&request).unwrap();
        let jar = JarContents::open(&assembled.path).unwrap();
        let names: Vec<_> = jar.names().collect();
        assert_eq!(
            names,
            vec![
                "META-INF/",
                MANIFEST_PATH,
                "foo.txt",
                "META-INF/services/x.Y",
                "module-info.class",
            ]
        );
    }

    #[test]
    fn test_missing_main_output_is_tolerated() {
        let dir = tempdir().unwrap();
        let lib = dir.path().join("lib");
        std::fs::create_dir_all(&lib).unwrap();
        std::fs::write(lib.join("Lib.class"), b"lib").unwrap();

        let request = ArchiveRequest {
            destination: dir.path().join("app.jar"),
            main_output: Some(dir.path().join("never-compiled")),
            classpath: vec![lib],
            ..Default::default()
        };
        let assembled = ArchiveAssembler::new().assemble(&request).unwrap();
        assert!(assembled.skipped.is_empty());
        let jar = JarContents::open(&assembled.path).unwrap();
        let names: Vec<_> = jar.names().collect();
        assert_eq!(names, vec!["META-INF/", MANIFEST_PATH, "Lib.class"]);
    }

    #[test]
    fn test_missing_classpath_entry_is_skipped() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("gone.jar");

        let request = ArchiveRequest {
            destination: dir.path().join("app.jar"),
            classpath: vec![missing.clone()],
            ..Default::default()
        };
        let assembled = ArchiveAssembler::new().assemble(&request).unwrap();
        assert_eq!(assembled.skipped, vec![missing]);
        assert_eq!(assembled.entry_count, 2);
    }

    #[test]
    fn test_repeated_names_inside_a_nested_jar_survive() {
        let dir = tempdir().unwrap();
        let jar_path = dir.path().join("shaded.jar");
        let mut writer = JarWriter::new(File::create(&jar_path).unwrap());
        writer.add_file("app.properties", b"one").unwrap();
        writer.add_file("app.properties", b"two").unwrap();
        writer.finish().unwrap();

        let request = ArchiveRequest {
            destination: dir.path().join("app.jar"),
            classpath: vec![jar_path],
            ..Default::default()
        };
        let assembled = ArchiveAssembler::new().assemble(&request).unwrap();
        assert!(assembled.skipped.is_empty());
        assert_eq!(assembled.duplicate_count, 1);

        let jar = JarContents::open(&assembled.path).unwrap();
        assert_eq!(
            jar.read_all("app.properties").unwrap(),
            vec![b"one".to_vec(), b"two".to_vec()]
        );
    }

    #[test]
    fn test_destination_inside_classpath_directory_is_not_copied() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("res.txt"), b"r").unwrap();
        std::fs::write(dir.path().join("app.jar"), b"stale").unwrap();

        let request = ArchiveRequest {
            destination: dir.path().join("app.jar"),
            classpath: vec![dir.path().to_path_buf()],
            ..Default::default()
        };
        let assembled = ArchiveAssembler::new().assemble(&request).unwrap();
        let jar = JarContents::open(&assembled.path).unwrap();
        let names: Vec<_> = jar.names().collect();
        assert_eq!(names, vec!["META-INF/", MANIFEST_PATH, "res.txt"]);
    }

    #[test]
    fn test_invalid_seed_fails_before_writing() {
        let dir = tempdir().unwrap();
        let mut seed = ManifestAttributes::new();
        seed.insert("Bad Name", "v");
        let request = ArchiveRequest {
            destination: dir.path().join("app.jar"),
            manifest_seed: seed,
            ..Default::default()
        };
        let err = ArchiveAssembler::new().assemble(&request).unwrap_err();
        assert!(matches!(err, ArchiveError::Manifest(_)));
        assert!(!request.destination.exists());
    }

    #[test]
    fn test_unwritable_destination_reports_path() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file, not a directory").unwrap();

        let request = ArchiveRequest {
            destination: blocker.join("app.jar"),
            ..Default::default()
        };
        match ArchiveAssembler::new().assemble(&request) {
            Err(ArchiveError::Write { path, .. }) => assert_eq!(path, request.destination),
            other => panic!("expected a write error, got {:?}", other),
        }
    }
}
