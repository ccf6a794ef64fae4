//! # termhop
//!
//! Directory-tracking command sessions over local and SSH shells.
//!
//! Every command runs in a fresh shell process, so a plain `cd` would be
//! forgotten as soon as it finished. termhop keeps the working directory on
//! the client side instead: it splits each command line on `;` and `&&`,
//! resolves the `cd`s it finds, and pins the rest of the line to the
//! resulting directory.
//!
//! ## Features
//!
//! - **Two transports**: the local shell and the system `ssh` client
//! - **Confirmed directories**: remote `cd`s are checked with `cd && pwd`
//! - **Completions**: `compgen` candidates from the tracked directory
//! - **Async**: built on tokio, with per-command timeouts
//!
//! ## Quick Start
//!
//! ```no_run
//! use termhop::{Session, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> termhop::Result<()> {
//!     termhop::logging::try_init().ok();
//!
//!     let mut session = Session::local(SessionConfig::default());
//!     session.connect().await?;
//!
//!     let result = session.execute_command("cd /tmp").await?;
//!     println!("now in {}", result.output);
//!
//!     let result = session.execute_command("ls -la").await?;
//!     println!("{}", result.output);
//!
//!     session.disconnect().await;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod execution;
pub mod logging;
pub mod output;
pub mod session;
pub mod settings;
pub mod transport;

// Re-export commonly used types
pub use error::{Result, TermhopError};
pub use execution::{CommandOutput, CommandRequest, ExecutionResult};
pub use output::OutputSanitizer;
pub use session::{CommandChain, Session, SessionConfig, SessionContext, SessionState, StateProbe};
pub use settings::{Settings, SettingsStore};
pub use transport::{
    DirectoryStrategy, LocalTransport, SshAuth, SshCredentials, SshTransport, Transport,
};
