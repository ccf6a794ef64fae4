//! Turning a resolved chain into the one command actually dispatched.

use tracing::warn;

use super::chain::CommandChain;
use super::resolve::{quote, ChainPlan};
use crate::execution::{CommandRequest, ExecutionResult};
use crate::transport::DirectoryStrategy;

/// What the session should do with a submitted line.
#[derive(Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Nothing to run; report this result directly.
    Done(ExecutionResult),
    /// Run this request once on the transport.
    Run(CommandRequest),
}

/// Decide the dispatched command for `chain` given its resolved `plan`.
///
/// A lone `cd` is never sent to the transport. Otherwise the leading `cd`s
/// the resolver already confirmed are dropped and the rest of the original
/// line is sent verbatim, pinned to the directory those `cd`s reached.
pub fn compose(chain: &CommandChain<'_>, plan: ChainPlan, strategy: DirectoryStrategy) -> Dispatch {
    if chain.is_empty() {
        return Dispatch::Done(ExecutionResult::ok(""));
    }

    if chain.is_single_cd() {
        return Dispatch::Done(match plan.rejection {
            Some(err) => ExecutionResult::from(err),
            None => ExecutionResult::ok(plan.directory.unwrap_or_default()),
        });
    }

    let remainder = chain.remainder_from(plan.consumed);
    if remainder.is_empty() {
        return Dispatch::Done(ExecutionResult::ok(plan.directory.unwrap_or_default()));
    }

    let request = match strategy {
        DirectoryStrategy::RoundTrip => {
            CommandRequest::new(prefix_directory(plan.dispatch_directory.as_deref(), remainder))
        }
        DirectoryStrategy::Native => {
            CommandRequest::new(remainder).working_dir_opt(plan.dispatch_directory)
        }
    };
    Dispatch::Run(request)
}

/// `cd <dir> && <command>`, or `command` alone when no directory is known.
pub fn prefix_directory(dir: Option<&str>, command: &str) -> String {
    match dir.map(|d| (d, quote(d))) {
        Some((_, Some(quoted))) => format!("cd {quoted} && {command}"),
        Some((dir, None)) => {
            warn!(%dir, "directory cannot be quoted, running without it");
            command.to_string()
        }
        None => command.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TermhopError;
    use std::path::PathBuf;

    fn plan(dir: Option<&str>, dispatch: Option<&str>, consumed: usize) -> ChainPlan {
        ChainPlan {
            directory: dir.map(str::to_string),
            previous: None,
            dispatch_directory: dispatch.map(str::to_string),
            consumed,
            rejection: None,
        }
    }

    #[test]
    fn test_single_cd_returns_directory() {
        let chain = CommandChain::parse("cd /tmp");
        let dispatch = compose(&chain, plan(Some("/tmp"), None, 1), DirectoryStrategy::RoundTrip);
        assert_eq!(dispatch, Dispatch::Done(ExecutionResult::ok("/tmp")));
    }

    #[test]
    fn test_single_cd_rejected() {
        let chain = CommandChain::parse("cd missing");
        let mut p = plan(Some("/home/u"), Some("/home/u"), 0);
        p.rejection = Some(TermhopError::DirectoryNotFound("/home/u/missing".into()));

        let dispatch = compose(&chain, p, DirectoryStrategy::Native);
        assert_eq!(
            dispatch,
            Dispatch::Done(ExecutionResult::ok(
                "cd: /home/u/missing: No such file or directory"
            ))
        );
    }

    #[test]
    fn test_remote_prefix_after_consumed_cd() {
        let chain = CommandChain::parse("cd foo && ls");
        let dispatch = compose(
            &chain,
            plan(Some("/home/u/foo"), Some("/home/u/foo"), 2),
            DirectoryStrategy::RoundTrip,
        );
        assert_eq!(
            dispatch,
            Dispatch::Run(CommandRequest::new("cd /home/u/foo && ls"))
        );
    }

    #[test]
    fn test_remote_without_directory() {
        let chain = CommandChain::parse("uname -a");
        let dispatch = compose(&chain, plan(None, None, 0), DirectoryStrategy::RoundTrip);
        assert_eq!(dispatch, Dispatch::Run(CommandRequest::new("uname -a")));
    }

    #[test]
    fn test_unconsumed_line_sent_verbatim() {
        let chain = CommandChain::parse("ls;  cd sub && pwd");
        let dispatch = compose(
            &chain,
            plan(Some("/srv/sub"), Some("/srv"), 0),
            DirectoryStrategy::RoundTrip,
        );
        assert_eq!(
            dispatch,
            Dispatch::Run(CommandRequest::new("cd /srv && ls;  cd sub && pwd"))
        );
    }

    #[test]
    fn test_native_uses_working_dir() {
        let chain = CommandChain::parse("cd foo && ls");
        let dispatch = compose(
            &chain,
            plan(Some("/home/u/foo"), Some("/home/u/foo"), 2),
            DirectoryStrategy::Native,
        );
        match dispatch {
            Dispatch::Run(req) => {
                assert_eq!(req.command_line, "ls");
                assert_eq!(req.working_dir, Some(PathBuf::from("/home/u/foo")));
            }
            other => panic!("unexpected dispatch: {other:?}"),
        }
    }

    #[test]
    fn test_all_cds_consumed() {
        let chain = CommandChain::parse("cd a && cd b");
        let dispatch = compose(
            &chain,
            plan(Some("/x/a/b"), Some("/x/a/b"), 3),
            DirectoryStrategy::RoundTrip,
        );
        assert_eq!(dispatch, Dispatch::Done(ExecutionResult::ok("/x/a/b")));
    }

    #[test]
    fn test_empty_line() {
        let chain = CommandChain::parse("  ");
        let dispatch = compose(&chain, plan(Some("/x"), Some("/x"), 0), DirectoryStrategy::RoundTrip);
        assert_eq!(dispatch, Dispatch::Done(ExecutionResult::ok("")));
    }

    #[test]
    fn test_prefix_quotes_spaces() {
        let cmd = prefix_directory(Some("/home/u/my docs"), "ls");
        let words = shlex::split(&cmd).unwrap();
        assert_eq!(words, vec!["cd", "/home/u/my docs", "&&", "ls"]);
    }
}
