//! Execution result types.

use crate::error::TermhopError;

/// Captured output of one transport round-trip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Decoded standard output.
    pub stdout: String,
    /// Decoded standard error.
    pub stderr: String,
    /// Exit code, if the process exited normally.
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    /// Create an output from its two streams.
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code: None,
        }
    }

    /// Set the exit code.
    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }

    /// Whether the process exited with status 0.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Stdout followed by stderr.
    pub fn combined(&self) -> String {
        let mut text = self.stdout.clone();
        text.push_str(&self.stderr);
        text
    }

    /// Stdout if it is non-empty, otherwise stderr.
    pub fn preferred(&self) -> &str {
        if self.stdout.is_empty() {
            &self.stderr
        } else {
            &self.stdout
        }
    }
}

impl From<std::process::Output> for CommandOutput {
    fn from(output: std::process::Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        }
    }
}

/// What a session hands back to its caller for one submitted line.
///
/// Callers render `output` as terminal text regardless of `success`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Whether the line was dispatched (or resolved) without a hard failure.
    pub success: bool,
    /// Text to show the user.
    pub output: String,
}

impl ExecutionResult {
    /// A successful result.
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    /// A failed result.
    pub fn failure(output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
        }
    }
}

impl From<TermhopError> for ExecutionResult {
    fn from(err: TermhopError) -> Self {
        if err.is_soft_cd_failure() {
            Self::ok(err.to_string())
        } else {
            Self::failure(err.to_string())
        }
    }
}

impl From<crate::Result<ExecutionResult>> for ExecutionResult {
    fn from(result: crate::Result<ExecutionResult>) -> Self {
        result.unwrap_or_else(Self::from)
    }
}
