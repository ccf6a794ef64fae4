//! Per-session directory state and probe commands.

use super::resolve::quote;
use crate::output::OutputSanitizer;

/// Runtime state carried between commands of one session.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    /// Best-known working directory; `None` means the transport default.
    tracked_directory: Option<String>,
    /// Directory before the last change, for `cd -`.
    previous_directory: Option<String>,
}

impl SessionContext {
    /// Create a new empty context.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracked_directory(&self) -> Option<&str> {
        self.tracked_directory.as_deref()
    }

    pub fn previous_directory(&self) -> Option<&str> {
        self.previous_directory.as_deref()
    }

    /// Replace both directories after a chain has been resolved.
    pub fn set_directories(&mut self, tracked: Option<String>, previous: Option<String>) {
        self.tracked_directory = tracked;
        self.previous_directory = previous;
    }

    /// Set the tracked directory without touching the previous one.
    pub fn set_tracked_directory(&mut self, dir: Option<String>) {
        self.tracked_directory = dir;
    }

    /// Forget everything; used on disconnect.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Shell snippets used to query a transport's state.
pub struct StateProbe;

impl StateProbe {
    /// Command printing the current working directory.
    pub fn cwd_command() -> &'static str {
        "pwd"
    }

    /// Parse the working directory from probe output.
    ///
    /// The last non-blank line wins, so login banners printed before the
    /// probe output are ignored. Only absolute paths are accepted.
    pub fn parse_cwd(output: &str) -> Option<String> {
        OutputSanitizer::last_line(output).filter(|line| line.starts_with('/'))
    }

    /// Escape text for embedding inside single quotes.
    pub fn escape_single_quotes(text: &str) -> String {
        text.replace('\'', r"'\''")
    }

    /// Bash completion lookup for `partial`, as a `bash -c` invocation.
    pub fn completion_command(partial: &str) -> Option<String> {
        let script = format!(
            "compgen -f -c -- '{}' 2>/dev/null",
            Self::escape_single_quotes(partial)
        );
        Some(format!("bash -c {}", quote(&script)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_new() {
        let ctx = SessionContext::new();
        assert!(ctx.tracked_directory().is_none());
        assert!(ctx.previous_directory().is_none());
    }

    #[test]
    fn test_set_directories() {
        let mut ctx = SessionContext::new();
        ctx.set_directories(Some("/b".into()), Some("/a".into()));
        assert_eq!(ctx.tracked_directory(), Some("/b"));
        assert_eq!(ctx.previous_directory(), Some("/a"));
    }

    #[test]
    fn test_clear() {
        let mut ctx = SessionContext::new();
        ctx.set_directories(Some("/tmp".into()), Some("/".into()));
        ctx.set_tracked_directory(Some("/var".into()));
        assert_eq!(ctx.previous_directory(), Some("/"));

        ctx.clear();
        assert!(ctx.tracked_directory().is_none());
        assert!(ctx.previous_directory().is_none());
    }

    #[test]
    fn test_parse_cwd() {
        assert_eq!(
            StateProbe::parse_cwd("motd line\n/home/user\n"),
            Some("/home/user".to_string())
        );
        assert_eq!(StateProbe::parse_cwd(""), None);
        assert_eq!(StateProbe::parse_cwd("not a path\n"), None);
    }

    #[test]
    fn test_escape_single_quotes() {
        assert_eq!(StateProbe::escape_single_quotes("it's"), r"it'\''s");
        assert_eq!(StateProbe::escape_single_quotes("plain"), "plain");
    }

    #[test]
    fn test_completion_command_round_trips_through_shell_words() {
        let cmd = StateProbe::completion_command("it's").unwrap();
        let words = shlex::split(&cmd).unwrap();
        assert_eq!(words[0], "bash");
        assert_eq!(words[1], "-c");
        assert_eq!(words[2], r"compgen -f -c -- 'it'\''s' 2>/dev/null");
    }

    #[test]
    fn test_completion_command_empty_partial() {
        let cmd = StateProbe::completion_command("").unwrap();
        let words = shlex::split(&cmd).unwrap();
        assert_eq!(words[2], "compgen -f -c -- '' 2>/dev/null");
    }
}
