//! Sessions and the directory-tracking command dispatcher.
//!
//! A [`Session`] owns a transport and a tracked working directory. Each
//! submitted line goes through the same pipeline:
//!
//! 1. [`CommandChain::parse`] splits it on `;` and `&&`
//! 2. [`DirectoryResolver`] resolves every `cd` in the chain
//! 3. [`compose`] decides what, if anything, is sent to the transport

mod chain;
mod compose;
mod context;
mod resolve;
mod state;
mod terminal;

pub use chain::{is_cd_command, ChainOperator, CommandChain, CommandSegment};
pub use compose::{compose, prefix_directory, Dispatch};
pub use context::{SessionContext, StateProbe};
pub use resolve::{
    join_normalized, normalize_posix, CdTarget, ChainPlan, DirectoryResolver, Resolution,
};
pub use state::SessionState;
pub use terminal::{Session, SessionConfig};
