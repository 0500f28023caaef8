//! Ahead-of-time processing.
//!
//! [`AotOrchestrator::run`] starts the external processor and blocks until it
//! exits. Only a successful run yields [`GeneratedOutputs`], and
//! [`wiring`] needs one to extend the build's inputs, so nothing can consume
//! the generated directories before the processor has finished.

pub mod args;
pub mod orchestrator;
pub mod wiring;

pub use args::build_arguments;
pub use orchestrator::{AotOrchestrator, DEFAULT_PROCESSOR_MAIN_CLASS};
pub use wiring::{AotLayout, SourceSetInputs, aot_processing_classpath};

use jarsmith_jvm::ToolchainError;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AotError {
    #[error("failed to prepare output directory {path}: {source}")]
    Prepare {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to start AOT processor {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("AOT processor failed with {}", describe_status(.status))]
    ProcessFailed { status: Option<i32> },
    #[error("AOT processor did not create {0}")]
    MissingOutput(PathBuf),
    #[error(transparent)]
    Toolchain(#[from] ToolchainError),
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Directories populated by a successful AOT run. Read-only from here on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedOutputs {
    sources_dir: PathBuf,
    resources_dir: PathBuf,
    classes_dir: PathBuf,
}

impl GeneratedOutputs {
    pub(crate) fn new(sources_dir: PathBuf, resources_dir: PathBuf, classes_dir: PathBuf) -> Self {
        Self {
            sources_dir,
            resources_dir,
            classes_dir,
        }
    }

    pub fn sources_dir(&self) -> &Path {
        &self.sources_dir
    }

    pub fn resources_dir(&self) -> &Path {
        &self.resources_dir
    }

    pub fn classes_dir(&self) -> &Path {
        &self.classes_dir
    }
}
