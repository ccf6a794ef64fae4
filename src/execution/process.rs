//! Child process execution with a bounded wait.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use super::result::CommandOutput;
use crate::error::TermhopError;
use crate::Result;

/// Default command execution timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Spawn `command` and capture both streams, waiting for it to exit.
///
/// Stdin is closed and the child is killed if the returned future is
/// dropped, so callers can bound it with their own timeout. Spawn failures
/// surface as [`TermhopError::Transport`] carrying the OS message.
pub async fn run_to_completion(mut command: Command) -> Result<CommandOutput> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let program = command.as_std().get_program().to_string_lossy().into_owned();
    let child = command.spawn().map_err(|e| {
        warn!(%program, error = %e, "failed to spawn process");
        TermhopError::Transport(format!("{program}: {e}"))
    })?;

    let output = CommandOutput::from(child.wait_with_output().await?);
    debug!(%program, exit_code = ?output.exit_code, "process finished");
    Ok(output)
}

/// Like [`run_to_completion`], but wait at most `limit`.
///
/// On expiry the child is killed and [`TermhopError::Timeout`] is returned.
pub async fn run_with_timeout(command: Command, limit: Duration) -> Result<CommandOutput> {
    let program = command.as_std().get_program().to_string_lossy().into_owned();
    match tokio::time::timeout(limit, run_to_completion(command)).await {
        Ok(result) => result,
        Err(_) => {
            warn!(%program, timeout_secs = limit.as_secs(), "process timed out");
            Err(TermhopError::Timeout(limit))
        }
    }
}
