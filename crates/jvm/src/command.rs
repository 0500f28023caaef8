use crate::toolchain::ToolchainError;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

/// A `java [jvm args] -cp <classpath> <main class> [args]` launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaCommand {
    pub program: PathBuf,
    pub jvm_args: Vec<String>,
    pub classpath: Vec<PathBuf>,
    pub main_class: String,
    pub args: Vec<String>,
}

impl JavaCommand {
    pub fn new(program: impl Into<PathBuf>, main_class: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            jvm_args: Vec::new(),
            classpath: Vec::new(),
            main_class: main_class.into(),
            args: Vec::new(),
        }
    }

    pub fn jvm_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.jvm_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn classpath<I, P>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.classpath.extend(entries.into_iter().map(Into::into));
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Arguments passed to the program, in launch order.
    pub fn command_line(&self) -> Result<Vec<OsString>, ToolchainError> {
        let mut line: Vec<OsString> = self.jvm_args.iter().map(OsString::from).collect();
        if !self.classpath.is_empty() {
            let joined = std::env::join_paths(&self.classpath)
                .map_err(|e| ToolchainError::InvalidClasspath(e.to_string()))?;
            line.push(OsString::from("-cp"));
            line.push(joined);
        }
        line.push(OsString::from(&self.main_class));
        line.extend(self.args.iter().map(OsString::from));
        Ok(line)
    }

    /// A ready-to-spawn process with inherited stdio.
    pub fn to_command(&self) -> Result<Command, ToolchainError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.command_line()?);
        Ok(cmd)
    }
}
