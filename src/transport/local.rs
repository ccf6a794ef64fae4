//! Local process transport.

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{DirectoryStrategy, Transport};
use crate::execution::{run_with_timeout, CommandOutput, CommandRequest, DEFAULT_TIMEOUT};
use crate::Result;

#[cfg(unix)]
const DEFAULT_SHELL: (&str, &str) = ("sh", "-c");
#[cfg(windows)]
const DEFAULT_SHELL: (&str, &str) = ("cmd", "/C");

/// Runs each command line as a child of the host shell.
#[derive(Debug, Clone)]
pub struct LocalTransport {
    shell: String,
    shell_flag: String,
    timeout: Duration,
}

impl LocalTransport {
    /// Create a transport using the platform default shell.
    pub fn new() -> Self {
        Self {
            shell: DEFAULT_SHELL.0.to_string(),
            shell_flag: DEFAULT_SHELL.1.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Use a different shell program (e.g. `bash`). It must accept `-c`.
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self.shell_flag = "-c".to_string();
        self
    }

    /// Timeout used when a request does not carry its own.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for LocalTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for LocalTransport {
    fn name(&self) -> &'static str {
        "local"
    }

    fn strategy(&self) -> DirectoryStrategy {
        DirectoryStrategy::Native
    }

    async fn open(&mut self) -> Result<String> {
        Ok("Connected to local terminal".to_string())
    }

    async fn run(&mut self, request: &CommandRequest) -> Result<CommandOutput> {
        let mut command = Command::new(&self.shell);
        command.arg(&self.shell_flag).arg(&request.command_line);
        if let Some(dir) = &request.working_dir {
            command.current_dir(dir);
        }
        debug!(command = %request.command_line, cwd = ?request.working_dir, "local run");
        run_with_timeout(command, request.timeout_or(self.timeout)).await
    }

    async fn close(&mut self) {}

    fn home_directory(&self) -> Option<String> {
        dirs::home_dir().map(|p| p.to_string_lossy().into_owned())
    }
}
