//! Command execution primitives shared by the transports.
//!
//! - [`CommandRequest`]: what to run, where, and for how long
//! - [`CommandOutput`]: the raw stdout/stderr of one round-trip
//! - [`ExecutionResult`]: the `(success, output)` pair returned to callers
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use termhop::execution::CommandRequest;
//!
//! let req = CommandRequest::new("ls -la")
//!     .working_dir("/tmp")
//!     .timeout(Duration::from_secs(5));
//! assert_eq!(req.command_line, "ls -la");
//! ```

mod command;
mod process;
mod result;

pub use command::CommandRequest;
pub use process::{run_to_completion, run_with_timeout, DEFAULT_TIMEOUT};
pub use result::{CommandOutput, ExecutionResult};
