//! Executable jar assembly.
//!
//! The assembler merges a main output tree and a classpath (directories and
//! nested jars) into one archive. Supporting pieces:
//! - [`sniff`] classifies classpath files by their zip header
//! - [`relocation`] rewrites entry paths while they are copied
//! - [`manifest`] fills manifest defaults and reads/writes the manifest format
//! - [`writer`] / [`reader`] handle the zip container, duplicate names included

pub mod assembler;
pub mod manifest;
pub mod reader;
pub mod relocation;
pub mod sniff;
mod source;
pub mod writer;

pub use assembler::{ArchiveAssembler, ArchiveRequest, AssembledArchive};
pub use manifest::ManifestDefaults;
pub use reader::{EntryInfo, JarContents};
pub use relocation::{RelocationRule, RelocationRules};
pub use sniff::is_zip;
pub use writer::{Compression, JarWriter};

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to write archive {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to expand nested archive {path}: {source}")]
    Nested {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid manifest: {0}")]
    Manifest(#[from] jarsmith_api::ApiError),
}
