//! Output processing.
//!
//! Transport output is raw terminal text. Before the core interprets it
//! (directory probes, completion lists) ANSI sequences and carriage returns
//! are removed.
//!
//! # Example
//!
//! ```
//! use termhop::output::OutputSanitizer;
//!
//! let raw = "\x1b[1mWelcome\x1b[0m\n/home/user\n";
//! assert_eq!(OutputSanitizer::last_line(raw).as_deref(), Some("/home/user"));
//! ```

mod sanitizer;

pub use sanitizer::OutputSanitizer;
