//! Line framing over decoded stream text.

/// Splits incoming text into complete lines.
///
/// Everything after the last `\n` is kept as a residual buffer and
/// prefixed to the next push, so a line split across chunks is only
/// emitted once it is complete.
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: String,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append text and return the lines it completed, without their
    /// terminators (a trailing `\r` is dropped too).
    pub fn push(&mut self, text: &str) -> Vec<String> {
        self.buffer.push_str(text);
        let Some(last_newline) = self.buffer.rfind('\n') else {
            return Vec::new();
        };

        let complete: String = self.buffer.drain(..=last_newline).collect();
        complete
            .split_terminator('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect()
    }

    /// The incomplete tail still waiting for its newline.
    pub fn residual(&self) -> &str {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_lines_are_emitted() {
        let mut framer = LineFramer::new();
        assert_eq!(framer.push("a\nb\n"), vec!["a", "b"]);
        assert_eq!(framer.residual(), "");
    }

    #[test]
    fn partial_line_is_retained() {
        let mut framer = LineFramer::new();
        assert_eq!(framer.push("data: {\"con"), Vec::<String>::new());
        assert_eq!(framer.residual(), "data: {\"con");
        assert_eq!(framer.push("tent\":\"x\"}\nda"), vec!["data: {\"content\":\"x\"}"]);
        assert_eq!(framer.residual(), "da");
    }

    #[test]
    fn blank_lines_are_kept_as_empty_strings() {
        let mut framer = LineFramer::new();
        assert_eq!(framer.push("a\n\nb\n"), vec!["a", "", "b"]);
    }

    #[test]
    fn carriage_returns_are_stripped() {
        let mut framer = LineFramer::new();
        assert_eq!(framer.push("data: [DONE]\r\n"), vec!["data: [DONE]"]);
    }
}
