//! Resolved-dependency ledger.
//!
//! Holds one resolution snapshot per build: identifiers and files are kept in
//! parallel, in resolution order, and are only ever appended. The pair of
//! sequences is also the packaging cache key, see [`ArtifactLedger::fingerprint`].

use jarsmith_api::{ArtifactId, ArtifactRecord};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use xxhash_rust::xxh3::Xxh3;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactLedger {
    artifact_ids: Vec<ArtifactId>,
    artifact_files: Vec<PathBuf>,
}

/// Content identity of a ledger: equal fingerprints mean equal identifier
/// sequences over equal file contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgerFingerprint(pub u64);

impl fmt::Display for LedgerFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl ArtifactLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `artifacts` to both sequences, preserving their order.
    pub fn record(&mut self, artifacts: impl IntoIterator<Item = ArtifactRecord>) {
        for artifact in artifacts {
            self.artifact_ids.push(artifact.id);
            self.artifact_files.push(artifact.file);
        }
    }

    pub fn identifiers(&self) -> &[ArtifactId] {
        &self.artifact_ids
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.artifact_files
    }

    pub fn records(&self) -> impl Iterator<Item = (&ArtifactId, &Path)> {
        self.artifact_ids
            .iter()
            .zip(self.artifact_files.iter().map(PathBuf::as_path))
    }

    pub fn len(&self) -> usize {
        self.artifact_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifact_ids.is_empty()
    }

    /// Hashes every identifier together with the bytes of its file.
    ///
    /// File paths are left out: the same jar resolved into a
    /// different cache location yields the same fingerprint. Directory
    /// artifacts contribute their files in sorted relative-path order.
    pub fn fingerprint(&self) -> io::Result<LedgerFingerprint> {
        let mut hasher = Xxh3::new();
        hasher.update(&(self.len() as u64).to_le_bytes());

        for (id, file) in self.records() {
            hasher.update(id.as_str().as_bytes());
            hasher.update(&[0]);

            if file.is_dir() {
                for entry in WalkDir::new(file).sort_by_file_name() {
                    let entry = entry.map_err(io::Error::from)?;
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    let relative = entry.path().strip_prefix(file).unwrap_or(entry.path());
                    hasher.update(relative.to_string_lossy().as_bytes());
                    hasher.update(&[0]);
                    hash_file(&mut hasher, entry.path())?;
                }
            } else {
                hash_file(&mut hasher, file)?;
            }
            hasher.update(&[0xff]);
        }

        Ok(LedgerFingerprint(hasher.digest()))
    }
}

fn hash_file(hasher: &mut Xxh3, path: &Path) -> io::Result<()> {
    let mut file = File::open(path)?;
    let mut buf = [0u8; 64 * 1024];
    let mut total = 0u64;
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        total += n as u64;
        hasher.update(&buf[..n]);
    }
    // Length suffix keeps adjacent files from sliding into each other
    hasher.update(&total.to_le_bytes());
    Ok(())
}
