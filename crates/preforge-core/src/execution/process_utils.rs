use tokio::runtime::{Handle, RuntimeFlavor};

use crate::execution::{
    ProcessExecutor, ProcessExitStatus, ProcessOutput, ProcessSpawnRequest, spawn_validated,
};
use crate::models::{GuardError, GuardErrorKind, GuardResult};

/// Spawns `request` and blocks on the ambient Tokio runtime until the process
/// exits, returning its stdout as text.
///
/// The calling thread must be inside a multi-thread runtime context without
/// polling a future itself, e.g. a `spawn_blocking` closure or a thread that
/// called `Runtime::enter`. A missing runtime or a current-thread runtime
/// (whose IO driver would never run) is reported as `ProcessFailure`.
/// Calling this from within an async task panics in `Handle::block_on`.
///
/// A non-zero exit is logged, not treated as an error: the caller decides
/// whether the output is usable. Anything the tool wrote to stderr is logged.
pub fn run_and_collect_output(
    executor: &dyn ProcessExecutor,
    request: ProcessSpawnRequest,
) -> GuardResult<String> {
    let tool = request.tool.clone();

    let handle = Handle::try_current().map_err(|error| {
        GuardError::new(
            GuardErrorKind::ProcessFailure,
            format!("{tool}: no Tokio runtime available: {error}"),
        )
    })?;
    if handle.runtime_flavor() == RuntimeFlavor::CurrentThread {
        return Err(GuardError::new(
            GuardErrorKind::ProcessFailure,
            format!("{tool}: blocking process wait needs a multi-thread Tokio runtime"),
        ));
    }

    let process = spawn_validated(executor, request)?;
    let output: ProcessOutput = handle.block_on(process.wait())?;
    let stderr = stderr_text(&output);

    match output.status {
        ProcessExitStatus::ExitCode(0) => {
            if let Some(stderr) = &stderr {
                tracing::debug!(tool = %tool, %stderr, "process wrote to stderr");
            }
        }
        ProcessExitStatus::ExitCode(code) => {
            tracing::warn!(
                tool = %tool,
                code,
                stderr = %stderr.as_deref().unwrap_or_default(),
                "process exited with non-zero status"
            );
        }
        ProcessExitStatus::Terminated => {
            tracing::warn!(tool = %tool, "process was terminated by signal");
        }
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn stderr_text(output: &ProcessOutput) -> Option<String> {
    let text = String::from_utf8_lossy(&output.stderr);
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_owned())
}
