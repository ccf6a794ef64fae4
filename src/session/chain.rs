//! Splitting a command line into a chain of atomic commands.
//!
//! The splitter is lexical: it knows about `;`, `&&`, quotes and backslash
//! escapes, nothing else. Pipes, `||`, subshells and redirections stay inside
//! the atomic command text untouched.

use std::ops::Range;

/// Operator joining two commands in a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainOperator {
    /// `;`
    Sequential,
    /// `&&`
    Conditional,
}

impl ChainOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainOperator::Sequential => ";",
            ChainOperator::Conditional => "&&",
        }
    }
}

/// One element of a parsed chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandSegment {
    /// An atomic command, trimmed, with its byte span in the source line.
    Command { text: String, span: Range<usize> },
    /// A chain operator.
    Operator(ChainOperator),
}

impl CommandSegment {
    /// The command text, if this is a command segment.
    pub fn command(&self) -> Option<&str> {
        match self {
            CommandSegment::Command { text, .. } => Some(text),
            CommandSegment::Operator(_) => None,
        }
    }

    /// Whether this segment is a `cd` invocation.
    pub fn is_cd(&self) -> bool {
        self.command().is_some_and(is_cd_command)
    }
}

/// Whether an atomic command's first word is `cd`.
pub fn is_cd_command(text: &str) -> bool {
    match text.strip_prefix("cd") {
        Some(rest) => rest.is_empty() || rest.starts_with(char::is_whitespace),
        None => false,
    }
}

/// A parsed command line.
#[derive(Debug, Clone)]
pub struct CommandChain<'a> {
    line: &'a str,
    segments: Vec<CommandSegment>,
}

impl<'a> CommandChain<'a> {
    /// Split `line` on `;` and `&&` outside of quotes.
    ///
    /// Empty commands are dropped, and an operator directly following
    /// another operator is dropped with them, so the result never holds two
    /// adjacent operators.
    pub fn parse(line: &'a str) -> Self {
        let bytes = line.as_bytes();
        let mut segments = Vec::new();
        let mut start = 0;
        let mut i = 0;
        let mut quote: Option<u8> = None;

        while i < bytes.len() {
            let b = bytes[i];
            if let Some(q) = quote {
                if b == b'\\' && q == b'"' {
                    i += 2;
                    continue;
                }
                if b == q {
                    quote = None;
                }
                i += 1;
                continue;
            }

            match b {
                b'\\' => i += 2,
                b'\'' | b'"' => {
                    quote = Some(b);
                    i += 1;
                }
                b';' => {
                    push_command(&mut segments, line, start..i);
                    push_operator(&mut segments, ChainOperator::Sequential);
                    i += 1;
                    start = i;
                }
                b'&' if bytes.get(i + 1) == Some(&b'&') => {
                    push_command(&mut segments, line, start..i);
                    push_operator(&mut segments, ChainOperator::Conditional);
                    i += 2;
                    start = i;
                }
                _ => i += 1,
            }
        }
        push_command(&mut segments, line, start..line.len());

        Self { line, segments }
    }

    /// The original line.
    pub fn line(&self) -> &'a str {
        self.line
    }

    pub fn segments(&self) -> &[CommandSegment] {
        &self.segments
    }

    /// Atomic commands in execution order.
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(CommandSegment::command)
    }

    /// True when the chain has no commands at all.
    pub fn is_empty(&self) -> bool {
        self.commands().next().is_none()
    }

    /// True when the whole chain is exactly one `cd` command.
    pub fn is_single_cd(&self) -> bool {
        matches!(self.segments.as_slice(), [only] if only.is_cd())
    }

    /// True when any command in the chain is a `cd`.
    pub fn has_cd(&self) -> bool {
        self.segments.iter().any(CommandSegment::is_cd)
    }

    /// The original text from segment `index` to the end of the line.
    ///
    /// Operators at the start of the remainder are skipped. Returns an
    /// empty string when no command follows.
    pub fn remainder_from(&self, index: usize) -> &'a str {
        let line = self.line;
        self.segments
            .iter()
            .skip(index)
            .find_map(|seg| match seg {
                CommandSegment::Command { span, .. } => Some(line[span.start..].trim_end()),
                CommandSegment::Operator(_) => None,
            })
            .unwrap_or("")
    }
}

fn push_command(segments: &mut Vec<CommandSegment>, line: &str, range: Range<usize>) {
    let end = range.end.min(line.len());
    let raw = &line[range.start..end];
    let text = raw.trim();
    if text.is_empty() {
        return;
    }
    let lead = raw.len() - raw.trim_start().len();
    let start = range.start + lead;
    segments.push(CommandSegment::Command {
        text: text.to_string(),
        span: start..start + text.len(),
    });
}

fn push_operator(segments: &mut Vec<CommandSegment>, op: ChainOperator) {
    if !matches!(segments.last(), Some(CommandSegment::Operator(_))) {
        segments.push(CommandSegment::Operator(op));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(line: &str) -> Vec<String> {
        CommandChain::parse(line)
            .segments()
            .iter()
            .map(|s| match s {
                CommandSegment::Command { text, .. } => text.clone(),
                CommandSegment::Operator(op) => op.as_str().to_string(),
            })
            .collect()
    }

    #[test]
    fn test_single_command() {
        assert_eq!(shape("ls -la"), vec!["ls -la"]);
    }

    #[test]
    fn test_mixed_operators() {
        assert_eq!(
            shape("cd foo && ls ; pwd"),
            vec!["cd foo", "&&", "ls", ";", "pwd"]
        );
    }

    #[test]
    fn test_whitespace_trimmed() {
        assert_eq!(shape("   cd  a   &&   ls  "), vec!["cd  a", "&&", "ls"]);
    }

    #[test]
    fn test_trailing_operator_keeps_operator() {
        assert_eq!(shape("cd /tmp;"), vec!["cd /tmp", ";"]);
        assert_eq!(shape("make &&"), vec!["make", "&&"]);
    }

    #[test]
    fn test_no_adjacent_operators() {
        assert_eq!(shape("ls ;; pwd"), vec!["ls", ";", "pwd"]);
        assert_eq!(shape("ls && ; pwd"), vec!["ls", "&&", "pwd"]);
    }

    #[test]
    fn test_other_operators_not_split() {
        assert_eq!(shape("a || b"), vec!["a || b"]);
        assert_eq!(shape("a | b"), vec!["a | b"]);
        assert_eq!(shape("sleep 1 & wait"), vec!["sleep 1 & wait"]);
        assert_eq!(shape("make 2>&1 && ls"), vec!["make 2>&1", "&&", "ls"]);
    }

    #[test]
    fn test_quoted_operators_not_split() {
        assert_eq!(shape("echo 'a;b' && ls"), vec!["echo 'a;b'", "&&", "ls"]);
        assert_eq!(shape(r#"echo "x && y""#), vec![r#"echo "x && y""#]);
        assert_eq!(shape(r"echo a\;b"), vec![r"echo a\;b"]);
        assert_eq!(shape(r#"echo "q\"; still""#), vec![r#"echo "q\"; still""#]);
    }

    #[test]
    fn test_unterminated_quote_is_best_effort() {
        assert_eq!(shape("echo 'oops; ls"), vec!["echo 'oops; ls"]);
    }

    #[test]
    fn test_empty_line() {
        let chain = CommandChain::parse("   ");
        assert!(chain.segments().is_empty());
        assert!(chain.is_empty());
    }

    #[test]
    fn test_is_cd_command() {
        assert!(is_cd_command("cd"));
        assert!(is_cd_command("cd /tmp"));
        assert!(is_cd_command("cd\t/tmp"));
        assert!(!is_cd_command("cdrecord -v"));
        assert!(!is_cd_command("echo cd"));
    }

    #[test]
    fn test_single_cd() {
        assert!(CommandChain::parse("cd /tmp").is_single_cd());
        assert!(CommandChain::parse("  cd  ").is_single_cd());
        assert!(!CommandChain::parse("cd /tmp && ls").is_single_cd());
        assert!(!CommandChain::parse("cd /tmp;").is_single_cd());
        assert!(!CommandChain::parse("ls").is_single_cd());
    }

    #[test]
    fn test_has_cd() {
        assert!(CommandChain::parse("ls; cd x").has_cd());
        assert!(!CommandChain::parse("ls; pwd").has_cd());
    }

    #[test]
    fn test_spans_point_into_line() {
        let line = "  cd foo &&  ls -l ";
        let chain = CommandChain::parse(line);
        for seg in chain.segments() {
            if let CommandSegment::Command { text, span } = seg {
                assert_eq!(&line[span.clone()], text);
            }
        }
    }

    #[test]
    fn test_remainder_from() {
        let chain = CommandChain::parse("cd foo && ls -l; cd bar ;pwd ");
        assert_eq!(chain.remainder_from(0), "cd foo && ls -l; cd bar ;pwd");
        assert_eq!(chain.remainder_from(1), "ls -l; cd bar ;pwd");
        assert_eq!(chain.remainder_from(2), "ls -l; cd bar ;pwd");
        assert_eq!(chain.remainder_from(4), "cd bar ;pwd");
        assert_eq!(chain.remainder_from(5), "pwd");
        assert_eq!(chain.remainder_from(42), "");

        let chain = CommandChain::parse("cd a &&");
        assert_eq!(chain.remainder_from(1), "");
    }

    #[test]
    fn test_multibyte_text() {
        assert_eq!(shape("echo héllo; cd ñ"), vec!["echo héllo", ";", "cd ñ"]);
    }
}
