//! Transports that actually run command lines.
//!
//! Both transports are stateless from the shell's point of view: every
//! [`Transport::run`] starts a fresh shell that knows nothing about earlier
//! `cd`s. The session layer on top tracks the directory and tells the
//! transport where to run, either through [`CommandRequest::working_dir`]
//! or by prefixing the command line itself, depending on
//! [`Transport::strategy`].

mod local;
#[cfg(test)]
pub(crate) mod mock;
mod ssh;

use async_trait::async_trait;

use crate::execution::{CommandOutput, CommandRequest};
use crate::Result;

pub use local::LocalTransport;
pub use ssh::{SshAuth, SshCredentials, SshTransport, DEFAULT_SSH_PORT};

/// How a transport lets the session pin a command to a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryStrategy {
    /// Directory changes are confirmed by running `cd ... && pwd` on the
    /// transport, and commands are prefixed with `cd <dir> &&`.
    RoundTrip,
    /// The OS resolves directories and the child process is started with
    /// its working directory set.
    Native,
}

/// A way of running text commands and collecting their output.
#[async_trait]
pub trait Transport: Send {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// How directory state is carried for this transport.
    fn strategy(&self) -> DirectoryStrategy;

    /// Establish the underlying connection.
    ///
    /// Returns a human readable status message.
    async fn open(&mut self) -> Result<String>;

    /// Run one command line and capture its output.
    async fn run(&mut self, request: &CommandRequest) -> Result<CommandOutput>;

    /// Release the underlying connection. Must be idempotent.
    async fn close(&mut self);

    /// Home directory used for a bare `cd`, when known without a round-trip.
    fn home_directory(&self) -> Option<String> {
        None
    }
}
