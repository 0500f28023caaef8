//! Blocking execution of Java processes.

use jarsmith_jvm::JavaCommand;
use std::io;

/// How a finished process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    code: Option<i32>,
}

impl ProcessExit {
    pub fn from_code(code: Option<i32>) -> Self {
        Self { code }
    }

    /// Exit code; `None` when the process was killed by a signal.
    pub fn code(&self) -> Option<i32> {
        self.code
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs a command to completion. The caller is suspended until it exits.
pub trait ProcessRunner {
    fn run(&self, command: &JavaCommand) -> io::Result<ProcessExit>;
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &R {
    fn run(&self, command: &JavaCommand) -> io::Result<ProcessExit> {
        (**self).run(command)
    }
}

/// Spawns a real child with inherited stdio.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, command: &JavaCommand) -> io::Result<ProcessExit> {
        let mut child = command
            .to_command()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let status = child.status()?;
        Ok(ProcessExit::from_code(status.code()))
    }
}
