use super::args::build_arguments;
use super::{AotError, GeneratedOutputs};
use crate::process::{ProcessRunner, SystemProcessRunner};
use jarsmith_api::AotInvocation;
use jarsmith_jvm::JavaCommand;
use std::path::{Path, PathBuf};

pub const DEFAULT_PROCESSOR_MAIN_CLASS: &str = "org.noear.solon.aot.SolonAotProcessor";

/// Runs the AOT processor as `java <jvm args> -cp <classpath> <processor> <args>`.
pub struct AotOrchestrator<R: ProcessRunner = SystemProcessRunner> {
    runner: R,
    java: PathBuf,
    processor_main_class: String,
    classpath: Vec<PathBuf>,
    jvm_args: Vec<String>,
}

impl AotOrchestrator<SystemProcessRunner> {
    pub fn new(java: impl Into<PathBuf>) -> Self {
        Self::with_runner(java, SystemProcessRunner)
    }
}

impl<R: ProcessRunner> AotOrchestrator<R> {
    pub fn with_runner(java: impl Into<PathBuf>, runner: R) -> Self {
        Self {
            runner,
            java: java.into(),
            processor_main_class: DEFAULT_PROCESSOR_MAIN_CLASS.to_string(),
            classpath: Vec::new(),
            jvm_args: Vec::new(),
        }
    }

    pub fn processor_main_class(mut self, main_class: impl Into<String>) -> Self {
        self.processor_main_class = main_class.into();
        self
    }

    pub fn classpath(mut self, classpath: Vec<PathBuf>) -> Self {
        self.classpath = classpath;
        self
    }

    pub fn jvm_args(mut self, jvm_args: Vec<String>) -> Self {
        self.jvm_args = jvm_args;
        self
    }

    pub fn command_for(&self, invocation: &AotInvocation) -> JavaCommand {
        JavaCommand::new(&self.java, &self.processor_main_class)
            .jvm_args(self.jvm_args.iter().cloned())
            .classpath(self.classpath.iter().cloned())
            .args(build_arguments(invocation))
    }

    /// Runs the processor to completion.
    ///
    /// Output directories are emptied first. When the processor cannot be
    /// started or exits unsuccessfully they are removed again and no outputs
    /// are returned.
    pub fn run(&self, invocation: &AotInvocation) -> Result<GeneratedOutputs, AotError> {
        let outputs = [
            invocation.sources_output.as_path(),
            invocation.resources_output.as_path(),
            invocation.classes_output.as_path(),
        ];
        let command = self.command_for(invocation);
        let line = command.command_line()?;

        for dir in outputs {
            recreate_dir(dir)?;
        }

        tracing::info!(
            "Running AOT processor {} for {}",
            self.processor_main_class,
            invocation.main_class
        );
        tracing::debug!("{} {:?}", self.java.display(), line);

        let exit = match self.runner.run(&command) {
            Ok(exit) => exit,
            Err(source) => {
                purge(&outputs);
                return Err(AotError::Spawn {
                    program: self.java.clone(),
                    source,
                });
            }
        };
        if !exit.success() {
            purge(&outputs);
            tracing::error!("AOT processor exited with {:?}", exit.code());
            return Err(AotError::ProcessFailed {
                status: exit.code(),
            });
        }

        if let Some(missing) = outputs.iter().find(|dir| !dir.is_dir()) {
            let missing = missing.to_path_buf();
            purge(&outputs);
            return Err(AotError::MissingOutput(missing));
        }

        tracing::info!("AOT processing finished");
        Ok(GeneratedOutputs::new(
            invocation.sources_output.clone(),
            invocation.resources_output.clone(),
            invocation.classes_output.clone(),
        ))
    }
}

fn recreate_dir(dir: &Path) -> Result<(), AotError> {
    let prepare = |source| AotError::Prepare {
        path: dir.to_path_buf(),
        source,
    };
    if dir.exists() {
        std::fs::remove_dir_all(dir).map_err(prepare)?;
    }
    std::fs::create_dir_all(dir).map_err(prepare)
}

// Partial output is never resumed
fn purge(dirs: &[&Path]) {
    for dir in dirs {
        if let Err(e) = std::fs::remove_dir_all(dir) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to remove {}: {}", dir.display(), e);
            }
        }
    }
}
