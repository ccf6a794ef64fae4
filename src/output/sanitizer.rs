//! Terminal noise removal for transport output.

use vte::{Params, Parser, Perform};

/// Cleans raw transport output before it is interpreted.
///
/// Directory probes (`pwd`) on remote hosts may be preceded by login
/// banners, coloured MOTD text or title-setting escapes, so anything parsed
/// out of stdout goes through here first.
pub struct OutputSanitizer;

impl OutputSanitizer {
    /// Strip ANSI escape sequences and carriage returns from raw bytes.
    pub fn strip_ansi(input: &[u8]) -> String {
        let mut text = TextCollector::default();
        let mut parser = Parser::new();
        parser.advance(&mut text, input);
        text.finish()
    }

    /// Strip ANSI escape sequences from a string.
    pub fn strip_ansi_str(input: &str) -> String {
        Self::strip_ansi(input.as_bytes())
    }

    /// Last non-blank line of `output`, trimmed, after sanitizing.
    pub fn last_line(output: &str) -> Option<String> {
        Self::strip_ansi_str(output)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .last()
            .map(str::to_string)
    }

    /// Non-blank, trimmed lines of `output` after sanitizing.
    pub fn lines(output: &str) -> Vec<String> {
        Self::strip_ansi_str(output)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Default)]
struct TextCollector {
    bytes: Vec<u8>,
}

impl TextCollector {
    fn finish(self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

impl Perform for TextCollector {
    fn print(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.bytes
            .extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
    }

    fn execute(&mut self, byte: u8) {
        // Keep newline and tab; CR is dropped so CRLF output splits cleanly.
        if matches!(byte, b'\n' | b'\t') {
            self.bytes.push(byte);
        }
    }

    fn hook(&mut self, _params: &Params, _intermediates: &[u8], _ignore: bool, _action: char) {}

    fn put(&mut self, _byte: u8) {}

    fn unhook(&mut self) {}

    fn osc_dispatch(&mut self, _params: &[&[u8]], _bell_terminated: bool) {}

    fn csi_dispatch(
        &mut self,
        _params: &Params,
        _intermediates: &[u8],
        _ignore: bool,
        _action: char,
    ) {
    }

    fn esc_dispatch(&mut self, _intermediates: &[u8], _ignore: bool, _byte: u8) {}
}
