//! Runs the packaged application.

use crate::process::{ProcessRunner, SystemProcessRunner};
use jarsmith_jvm::{JavaCommand, ToolchainError};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Limits JIT compilation to C1, trading peak throughput for startup time.
pub const TIERED_STOP_FLAG: &str = "-XX:TieredStopAtLevel=1";

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("application exited with status {status:?}")]
    Exited { status: Option<i32> },
    #[error(transparent)]
    Toolchain(#[from] ToolchainError),
}

/// JVM arguments with the tuning flag appended when `optimized`.
pub fn effective_jvm_args(jvm_args: &[String], optimized: bool) -> Vec<String> {
    let mut args = jvm_args.to_vec();
    if optimized {
        args.push(TIERED_STOP_FLAG.to_string());
    }
    args
}

pub struct RunLauncher<R: ProcessRunner = SystemProcessRunner> {
    runner: R,
    java: PathBuf,
    main_class: String,
    classpath: Vec<PathBuf>,
    args: Vec<String>,
}

impl RunLauncher<SystemProcessRunner> {
    pub fn new(java: impl Into<PathBuf>, main_class: impl Into<String>) -> Self {
        Self::with_runner(java, main_class, SystemProcessRunner)
    }
}

impl<R: ProcessRunner> RunLauncher<R> {
    pub fn with_runner(java: impl Into<PathBuf>, main_class: impl Into<String>, runner: R) -> Self {
        Self {
            runner,
            java: java.into(),
            main_class: main_class.into(),
            classpath: Vec::new(),
            args: Vec::new(),
        }
    }

    pub fn classpath(mut self, classpath: Vec<PathBuf>) -> Self {
        self.classpath = classpath;
        self
    }

    pub fn args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn command(&self, jvm_args: &[String], optimized: bool) -> JavaCommand {
        JavaCommand::new(&self.java, &self.main_class)
            .jvm_args(effective_jvm_args(jvm_args, optimized))
            .classpath(self.classpath.iter().cloned())
            .args(self.args.iter().cloned())
    }

    /// Starts the application and blocks until it exits.
    pub fn launch(&self, jvm_args: &[String], optimized: bool) -> Result<(), LaunchError> {
        let command = self.command(jvm_args, optimized);
        tracing::info!("Launching {} (optimized: {})", self.main_class, optimized);
        tracing::debug!("{} {:?}", self.java.display(), command.command_line()?);

        let exit = self
            .runner
            .run(&command)
            .map_err(|source| LaunchError::Spawn {
                program: self.java.clone(),
                source,
            })?;
        if exit.success() {
            Ok(())
        } else {
            Err(LaunchError::Exited {
                status: exit.code(),
            })
        }
    }
}
