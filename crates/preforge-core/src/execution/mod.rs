pub mod process_utils;
pub mod tokio_process;

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use crate::models::{GuardError, GuardErrorKind, GuardResult};

pub use process_utils::run_and_collect_output;
pub use tokio_process::TokioProcessExecutor;

pub type ProcessWaitFuture = Pin<Box<dyn Future<Output = GuardResult<ProcessOutput>> + Send>>;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    fn validate(&self, tool: &str) -> GuardResult<()> {
        if self.program.as_os_str().is_empty() {
            return Err(invalid_input(tool, "command program path must not be empty"));
        }

        if self
            .args
            .iter()
            .any(|arg| arg.is_empty() || arg.contains('\0'))
        {
            return Err(invalid_input(
                tool,
                "command args must be non-empty and must not contain NUL bytes",
            ));
        }

        Ok(())
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProcessSpawnRequest {
    /// Human-readable tool name used in error messages.
    pub tool: String,
    pub command: CommandSpec,
}

impl ProcessSpawnRequest {
    pub fn new(tool: impl Into<String>, command: CommandSpec) -> Self {
        Self {
            tool: tool.into(),
            command,
        }
    }

    pub fn validate(&self) -> GuardResult<()> {
        self.command.validate(&self.tool)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProcessExitStatus {
    ExitCode(i32),
    Terminated,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProcessOutput {
    pub status: ProcessExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

pub trait RunningProcess: Send {
    /// Resolves once the process has exited and both output pipes are closed.
    fn wait(self: Box<Self>) -> ProcessWaitFuture;
}

pub trait ProcessExecutor: Send + Sync {
    fn spawn(&self, request: ProcessSpawnRequest) -> GuardResult<Box<dyn RunningProcess>>;
}

pub fn spawn_validated(
    executor: &dyn ProcessExecutor,
    request: ProcessSpawnRequest,
) -> GuardResult<Box<dyn RunningProcess>> {
    request.validate()?;
    executor.spawn(request)
}

fn invalid_input(tool: &str, message: &str) -> GuardError {
    GuardError::new(GuardErrorKind::InvalidInput, format!("{tool}: {message}"))
}
