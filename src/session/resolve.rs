//! Directory resolution for `cd` segments.
//!
//! Transports do not keep a shell alive between commands, so every `cd`
//! in a chain is resolved here against the tracked directory. Round-trip
//! transports confirm the result by running `cd <old> && cd <target> && pwd`;
//! native transports ask the OS. When a round-trip cannot confirm a
//! directory the result is computed lexically instead and the rest of the
//! chain is left alone.

use std::borrow::Cow;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use tracing::{debug, warn};

use super::chain::{is_cd_command, CommandChain};
use super::context::StateProbe;
use crate::error::TermhopError;
use crate::execution::CommandRequest;
use crate::transport::{DirectoryStrategy, Transport};

/// The operand of a `cd` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CdTarget {
    /// Bare `cd`.
    Home,
    /// `cd -`.
    Previous,
    /// Any other operand, unexpanded.
    Path(String),
}

impl CdTarget {
    /// Extract the target of a `cd` command using shell word splitting.
    ///
    /// Options (`-L`, `-P`) are skipped, `--` ends option parsing and extra
    /// operands are ignored. Returns `None` when the words cannot be split,
    /// e.g. on an unterminated quote.
    pub fn parse(command: &str) -> Option<Self> {
        let words = shlex::split(command)?;
        let mut args = words.iter().skip(1);
        let operand = loop {
            match args.next() {
                None => break None,
                Some(w) if w == "--" => break args.next(),
                Some(w) if w.len() > 1 && w.starts_with('-') => continue,
                Some(w) => break Some(w),
            }
        };

        Some(match operand.map(String::as_str) {
            None => CdTarget::Home,
            Some("-") => CdTarget::Previous,
            Some(path) => CdTarget::Path(path.to_string()),
        })
    }
}

/// Outcome of resolving one `cd`.
#[derive(Debug)]
pub enum Resolution {
    /// Confirmed by the transport or the OS.
    Confirmed(String),
    /// Round-trip failed; lexically computed. Ends the chain loop.
    Fallback(String),
    /// Nothing could be computed. Ends the chain loop.
    Unresolved,
    /// The OS refused the directory. Ends the chain loop.
    Rejected(TermhopError),
}

/// Directory state after running the resolver over a whole chain.
#[derive(Debug, Default)]
pub struct ChainPlan {
    /// Tracked directory after the chain.
    pub directory: Option<String>,
    /// Directory before the last change, for `cd -`.
    pub previous: Option<String>,
    /// Directory the remaining command must run in.
    pub dispatch_directory: Option<String>,
    /// Number of leading segments fully handled by the resolver.
    pub consumed: usize,
    /// Soft error from a refused `cd`.
    pub rejection: Option<TermhopError>,
}

impl ChainPlan {
    fn starting_at(current: Option<&str>, previous: Option<&str>) -> Self {
        Self {
            directory: current.map(str::to_string),
            previous: previous.map(str::to_string),
            dispatch_directory: current.map(str::to_string),
            consumed: 0,
            rejection: None,
        }
    }

    fn enter(&mut self, dir: String) {
        self.previous = self.directory.replace(dir);
    }
}

enum Destination<'a> {
    Home,
    Path(&'a str),
}

/// Resolves `cd` targets against a transport.
pub struct DirectoryResolver<'t> {
    transport: &'t mut dyn Transport,
    timeout: Duration,
}

impl<'t> DirectoryResolver<'t> {
    /// `timeout` bounds each confirmation round-trip.
    pub fn new(transport: &'t mut dyn Transport, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// Resolve every `cd` in `chain`, starting from `current`.
    ///
    /// Non-`cd` commands are skipped. The loop stops at the first `cd` that
    /// is not confirmed. Leading confirmed `cd`s (and the operators after
    /// them) are counted in [`ChainPlan::consumed`].
    pub async fn resolve_chain(
        &mut self,
        chain: &CommandChain<'_>,
        current: Option<&str>,
        previous: Option<&str>,
    ) -> ChainPlan {
        let mut plan = ChainPlan::starting_at(current, previous);
        let mut consuming = true;

        for (index, segment) in chain.segments().iter().enumerate() {
            let Some(text) = segment.command() else {
                if consuming {
                    plan.consumed = index + 1;
                }
                continue;
            };
            if !is_cd_command(text) {
                consuming = false;
                continue;
            }

            let resolution = match CdTarget::parse(text) {
                Some(target) => {
                    self.resolve(plan.directory.as_deref(), plan.previous.as_deref(), &target)
                        .await
                }
                None => Resolution::Unresolved,
            };

            match resolution {
                Resolution::Confirmed(dir) => {
                    plan.enter(dir);
                    if consuming {
                        plan.consumed = index + 1;
                        plan.dispatch_directory = plan.directory.clone();
                    }
                }
                Resolution::Fallback(dir) => {
                    warn!(command = %text, directory = %dir, "cd not confirmed, using lexical path");
                    plan.enter(dir);
                    break;
                }
                Resolution::Unresolved => {
                    debug!(command = %text, "cd target could not be resolved");
                    break;
                }
                Resolution::Rejected(err) => {
                    debug!(command = %text, error = %err, "cd refused");
                    plan.rejection = Some(err);
                    break;
                }
            }
        }

        plan
    }

    /// Resolve a single `cd` target.
    pub async fn resolve(
        &mut self,
        current: Option<&str>,
        previous: Option<&str>,
        target: &CdTarget,
    ) -> Resolution {
        let destination = match target {
            CdTarget::Home => Destination::Home,
            CdTarget::Path(path) => Destination::Path(path),
            CdTarget::Previous => match previous {
                Some(dir) => Destination::Path(dir),
                None => return Resolution::Rejected(TermhopError::OldPwdNotSet),
            },
        };

        match self.transport.strategy() {
            DirectoryStrategy::RoundTrip => self.resolve_round_trip(current, &destination).await,
            DirectoryStrategy::Native => self.resolve_native(current, &destination),
        }
    }

    async fn resolve_round_trip(
        &mut self,
        current: Option<&str>,
        destination: &Destination<'_>,
    ) -> Resolution {
        let Some(probe) = round_trip_command(current, destination) else {
            return Resolution::Unresolved;
        };

        let request = CommandRequest::new(probe).timeout(self.timeout);
        match self.transport.run(&request).await {
            Ok(output) if output.stderr.trim().is_empty() => {
                if let Some(dir) = StateProbe::parse_cwd(&output.stdout) {
                    debug!(directory = %dir, "cd confirmed by transport");
                    return Resolution::Confirmed(dir);
                }
                debug!(stdout = %output.stdout.trim(), "cd probe returned no absolute path");
            }
            Ok(output) => {
                debug!(stderr = %output.stderr.trim(), "cd probe failed");
            }
            Err(e) => {
                warn!(error = %e, "cd probe round-trip failed");
            }
        }

        self.fallback(current, destination)
    }

    fn fallback(&self, current: Option<&str>, destination: &Destination<'_>) -> Resolution {
        let home = self.transport.home_directory();
        let computed = match destination {
            Destination::Home => home,
            Destination::Path(path) => expand_tilde(path, home.as_deref())
                .and_then(|path| join_normalized(current, &path)),
        };
        match computed {
            Some(dir) => Resolution::Fallback(dir),
            None => Resolution::Unresolved,
        }
    }

    fn resolve_native(&self, current: Option<&str>, destination: &Destination<'_>) -> Resolution {
        let home = self.transport.home_directory();
        let raw = match destination {
            Destination::Home => home,
            Destination::Path(path) => expand_tilde(path, home.as_deref()).map(Cow::into_owned),
        };
        let Some(raw) = raw else {
            return Resolution::Unresolved;
        };

        let path = Path::new(&raw);
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            match current.map(PathBuf::from).or_else(|| std::env::current_dir().ok()) {
                Some(base) => base.join(path),
                None => return Resolution::Unresolved,
            }
        };
        let normalized = normalize_native(&joined);
        let display = normalized.to_string_lossy().into_owned();

        match std::fs::metadata(&normalized) {
            Ok(meta) if meta.is_dir() => match check_searchable(&normalized) {
                Ok(()) => Resolution::Confirmed(display),
                Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                    Resolution::Rejected(TermhopError::PermissionDenied(display))
                }
                Err(_) => Resolution::Rejected(TermhopError::DirectoryNotFound(display)),
            },
            Ok(_) => Resolution::Rejected(TermhopError::NotADirectory(display)),
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                Resolution::Rejected(TermhopError::PermissionDenied(display))
            }
            Err(_) => Resolution::Rejected(TermhopError::DirectoryNotFound(display)),
        }
    }
}

/// Whether the current user may enter `dir` (search permission).
#[cfg(unix)]
fn check_searchable(dir: &Path) -> std::io::Result<()> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(dir.as_os_str().as_bytes())
        .map_err(|e| std::io::Error::new(ErrorKind::InvalidInput, e))?;
    // SAFETY: `c_path` is NUL-terminated and outlives the call.
    if unsafe { libc::access(c_path.as_ptr(), libc::X_OK) } == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn check_searchable(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

/// `cd <old> && cd <target> && pwd`, with the first clause omitted when no
/// directory is tracked. `None` if a path cannot be quoted.
fn round_trip_command(current: Option<&str>, destination: &Destination<'_>) -> Option<String> {
    let mut clauses = Vec::with_capacity(3);
    if let Some(dir) = current {
        clauses.push(format!("cd {}", quote(dir)?));
    }
    match destination {
        Destination::Home => clauses.push("cd".to_string()),
        Destination::Path(path) => clauses.push(format!("cd {}", quote_target(path)?)),
    }
    clauses.push(StateProbe::cwd_command().to_string());
    Some(clauses.join(" && "))
}

/// Quote one word for a POSIX shell.
pub(crate) fn quote(word: &str) -> Option<String> {
    shlex::try_quote(word).ok().map(Cow::into_owned)
}

/// Quote a `cd` operand, leaving a leading `~` or `~/` for the shell to expand.
pub(crate) fn quote_target(target: &str) -> Option<String> {
    if target == "~" || target == "~/" {
        return Some(target.to_string());
    }
    match target.strip_prefix("~/") {
        Some(rest) => Some(format!("~/{}", quote(rest)?)),
        None => quote(target),
    }
}

/// Replace a leading `~` with `home`. `None` if needed and `home` is unknown.
pub(crate) fn expand_tilde<'a>(path: &'a str, home: Option<&str>) -> Option<Cow<'a, str>> {
    if path == "~" {
        return home.map(|h| Cow::Owned(h.to_string()));
    }
    match path.strip_prefix("~/") {
        Some(rest) => home.map(|h| Cow::Owned(format!("{}/{rest}", h.trim_end_matches('/')))),
        None => Some(Cow::Borrowed(path)),
    }
}

/// Join `target` onto `base` and normalize as a POSIX path.
///
/// Absolute targets replace `base`. Relative targets need a base.
pub fn join_normalized(base: Option<&str>, target: &str) -> Option<String> {
    if target.starts_with('/') {
        return Some(normalize_posix(target));
    }
    Some(normalize_posix(&format!("{}/{target}", base?)))
}

/// Collapse `.`, `..` and repeated separators of an absolute POSIX path.
pub fn normalize_posix(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            name => parts.push(name),
        }
    }
    format!("/{}", parts.join("/"))
}

fn normalize_native(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(name) => out.push(name),
        }
    }
    out
}
