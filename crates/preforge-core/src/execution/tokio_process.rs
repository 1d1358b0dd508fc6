use tokio::io::{AsyncRead, AsyncReadExt};

use crate::execution::{
    ProcessExecutor, ProcessExitStatus, ProcessOutput, ProcessSpawnRequest, ProcessWaitFuture,
    RunningProcess,
};
use crate::models::{GuardError, GuardErrorKind, GuardResult};

pub struct TokioProcessExecutor;

impl ProcessExecutor for TokioProcessExecutor {
    fn spawn(&self, request: ProcessSpawnRequest) -> GuardResult<Box<dyn RunningProcess>> {
        let child = tokio::process::Command::new(&request.command.program)
            .args(&request.command.args)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .spawn()
            .map_err(|error| {
                GuardError::new(
                    GuardErrorKind::ToolchainNotFound,
                    format!(
                        "failed to spawn '{}': {error}",
                        request.command.program.display()
                    ),
                )
            })?;

        tracing::debug!(tool = %request.tool, pid = ?child.id(), "spawned process");

        Ok(Box::new(TokioRunningProcess {
            child,
            tool: request.tool,
        }))
    }
}

struct TokioRunningProcess {
    child: tokio::process::Child,
    tool: String,
}

impl RunningProcess for TokioRunningProcess {
    fn wait(self: Box<Self>) -> ProcessWaitFuture {
        let Self { mut child, tool } = *self;

        Box::pin(async move {
            let stdout = child.stdout.take();
            let stderr = child.stderr.take();

            // Both pipes are drained to EOF alongside the exit wait so a chatty
            // child cannot block on a full pipe buffer.
            let (status, stdout, stderr) =
                tokio::join!(child.wait(), read_all(stdout), read_all(stderr));

            let status = status.map_err(|error| {
                process_failure(&tool, format!("failed to wait for process: {error}"))
            })?;
            let stdout = stdout.map_err(|error| {
                process_failure(&tool, format!("failed to read stdout: {error}"))
            })?;
            let stderr = stderr.map_err(|error| {
                process_failure(&tool, format!("failed to read stderr: {error}"))
            })?;

            let status = match status.code() {
                Some(code) => ProcessExitStatus::ExitCode(code),
                None => ProcessExitStatus::Terminated,
            };

            Ok(ProcessOutput {
                status,
                stdout,
                stderr,
            })
        })
    }
}

async fn read_all<R>(handle: Option<R>) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = Vec::new();
    if let Some(mut handle) = handle {
        handle.read_to_end(&mut buffer).await?;
    }
    Ok(buffer)
}

fn process_failure(tool: &str, message: String) -> GuardError {
    GuardError::new(GuardErrorKind::ProcessFailure, format!("{tool}: {message}"))
}
