//! Command requests handed to a transport.

use std::path::PathBuf;
use std::time::Duration;

/// A single command line to run on a transport.
///
/// Transports with native directory support honour `working_dir`; the
/// others receive a command line that already carries its own `cd` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    /// The command line to execute.
    pub command_line: String,
    /// Working directory for the child process (if any).
    pub working_dir: Option<PathBuf>,
    /// Maximum execution time.
    pub timeout: Option<Duration>,
}

impl CommandRequest {
    /// Create a new request for the given command line.
    pub fn new(command_line: impl Into<String>) -> Self {
        Self {
            command_line: command_line.into(),
            working_dir: None,
            timeout: None,
        }
    }

    /// Set the working directory.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Set the working directory if one is known.
    pub fn working_dir_opt(mut self, dir: Option<impl Into<PathBuf>>) -> Self {
        self.working_dir = dir.map(Into::into);
        self
    }

    /// Set the execution timeout.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Timeout to apply, falling back to `default` when unset.
    pub fn timeout_or(&self, default: Duration) -> Duration {
        self.timeout.unwrap_or(default)
    }
}
