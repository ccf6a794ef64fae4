//! Error types for termhop.

use std::time::Duration;

use thiserror::Error;

/// Main error type for termhop operations.
#[derive(Error, Debug)]
pub enum TermhopError {
    /// Operation attempted while the session is not connected.
    #[error("Not connected")]
    NotConnected,

    /// Connect or exec failed at the transport layer.
    ///
    /// The message is passed through verbatim.
    #[error("{0}")]
    Transport(String),

    /// Command execution exceeded its bound.
    #[error("Command timed out ({} seconds)", .0.as_secs())]
    Timeout(Duration),

    /// `cd` target does not exist.
    #[error("cd: {0}: No such file or directory")]
    DirectoryNotFound(String),

    /// `cd` target exists but cannot be entered.
    #[error("cd: {0}: Permission denied")]
    PermissionDenied(String),

    /// `cd` target is not a directory.
    #[error("cd: {0}: Not a directory")]
    NotADirectory(String),

    /// `cd -` with no previous directory recorded.
    #[error("cd: OLDPWD not set")]
    OldPwdNotSet,

    /// Invalid lifecycle transition attempted.
    #[error("invalid state transition from {from:?} to {to:?}")]
    InvalidStateTransition {
        from: crate::session::SessionState,
        to: crate::session::SessionState,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file could not be encoded or decoded.
    #[error("settings error: {0}")]
    Settings(#[from] serde_json::Error),
}

impl TermhopError {
    /// Whether this error is a soft `cd` failure that is shown inline
    /// rather than reported as a failed command.
    pub fn is_soft_cd_failure(&self) -> bool {
        matches!(
            self,
            Self::DirectoryNotFound(_)
                | Self::PermissionDenied(_)
                | Self::NotADirectory(_)
                | Self::OldPwdNotSet
        )
    }
}

/// Convenience Result type for termhop operations.
pub type Result<T> = std::result::Result<T, TermhopError>;
