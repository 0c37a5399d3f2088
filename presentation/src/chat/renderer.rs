//! Terminal renderer for streamed replies.
//!
//! On a terminal the reply is re-rendered as markdown on every update,
//! redrawing over the previous frame. When stdout is not a terminal (or
//! the reply outgrows the screen) new text is appended as it arrives.

use crate::output::{MarkdownRenderer, Palette};
use crate::progress::waiting_spinner;
use colored::Colorize;
use crossterm::{
    cursor::{MoveToColumn, MoveUp},
    queue,
    terminal::{self, Clear, ClearType},
};
use indicatif::ProgressBar;
use medbot_application::{StreamError, StreamRenderer};
use std::io::{self, IsTerminal, Write};
use tracing::debug;
use unicode_width::UnicodeWidthChar;

const FALLBACK_COLUMNS: u16 = 80;
const FALLBACK_ROWS: u16 = 24;

/// How reply text reaches the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Redraw the rendered markdown in place
    Redraw,
    /// Print only the newly arrived text
    Append,
}

impl RenderMode {
    /// `Redraw` when stdout is a terminal.
    pub fn detect() -> Self {
        if io::stdout().is_terminal() {
            RenderMode::Redraw
        } else {
            RenderMode::Append
        }
    }
}

/// [`StreamRenderer`] drawing one reply to a terminal
pub struct TerminalRenderer {
    markdown: MarkdownRenderer,
    palette: Palette,
    mode: RenderMode,
    out: Box<dyn Write + Send>,
    spinner: Option<ProgressBar>,
    /// Rows covered by the last redraw
    drawn_rows: usize,
    /// Length of the reply text the last redraw showed
    drawn_len: usize,
    /// Bytes of reply text already printed in append mode
    printed: usize,
    started: bool,
    /// Columns and rows, when not read from the terminal
    size: Option<(u16, u16)>,
}

impl TerminalRenderer {
    pub fn new(palette: Palette, mode: RenderMode) -> Self {
        Self::with_writer(palette, mode, Box::new(io::stdout()))
    }

    pub fn with_writer(palette: Palette, mode: RenderMode, out: Box<dyn Write + Send>) -> Self {
        Self {
            markdown: MarkdownRenderer::new(palette),
            palette,
            mode,
            out,
            spinner: None,
            drawn_rows: 0,
            drawn_len: 0,
            printed: 0,
            started: false,
            size: None,
        }
    }

    /// Assume a terminal of this size instead of querying it.
    pub fn with_size(mut self, columns: u16, rows: u16) -> Self {
        self.size = Some((columns, rows));
        self
    }

    /// Show a spinner until the first fragment arrives.
    pub fn with_spinner(mut self, message: &str) -> Self {
        self.spinner = Some(waiting_spinner(message));
        self
    }

    fn stop_spinner(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }

    fn draw(&mut self, text: &str) -> io::Result<()> {
        match self.mode {
            RenderMode::Redraw => self.redraw(text),
            RenderMode::Append => self.append(text),
        }
    }

    fn redraw(&mut self, text: &str) -> io::Result<()> {
        let rendered = self.markdown.render(text);
        let (columns, rows) = self
            .size
            .or_else(|| terminal::size().ok())
            .unwrap_or((FALLBACK_COLUMNS, FALLBACK_ROWS));
        let needed = rows_for(&rendered, columns);

        if needed >= usize::from(rows) {
            // Cannot move the cursor above the top of the screen
            debug!(needed, rows, "Reply outgrew the terminal, appending from here");
            self.mode = RenderMode::Append;
            self.printed = self.drawn_len;
            return self.append(text);
        }

        queue!(self.out, MoveToColumn(0))?;
        if self.drawn_rows > 1 {
            let up = u16::try_from(self.drawn_rows - 1).unwrap_or(u16::MAX);
            queue!(self.out, MoveUp(up))?;
        }
        queue!(self.out, Clear(ClearType::FromCursorDown))?;
        write!(self.out, "{rendered}")?;
        self.out.flush()?;

        self.drawn_rows = needed;
        self.drawn_len = text.len();
        Ok(())
    }

    fn append(&mut self, text: &str) -> io::Result<()> {
        if let Some(new) = text.get(self.printed..) {
            write!(self.out, "{new}")?;
            self.out.flush()?;
            self.printed = text.len();
        }
        Ok(())
    }

    fn finish_line(&mut self) {
        if self.started
            && let Err(e) = writeln!(self.out)
        {
            debug!("Terminal write failed: {}", e);
        }
    }
}

impl StreamRenderer for TerminalRenderer {
    fn on_stream_start(&mut self) {
        self.stop_spinner();
        self.started = true;
    }

    fn on_render(&mut self, text: &str) {
        if let Err(e) = self.draw(text) {
            debug!("Terminal write failed: {}", e);
        }
    }

    fn on_finalize(&mut self, text: &str) {
        self.stop_spinner();
        self.started = true;
        self.on_render(text);
        self.finish_line();
    }

    fn on_error(&mut self, error: &StreamError) {
        self.stop_spinner();
        self.finish_line();
        let message = format!("Something went wrong: {error}");
        if let Err(e) = writeln!(self.out, "{}", message.color(self.palette.error)) {
            debug!("Terminal write failed: {}", e);
        }
    }

    fn on_cancel(&mut self) {
        self.stop_spinner();
        let cancelled = if self.started { " [cancelled]" } else { "[cancelled]" };
        if let Err(e) = writeln!(self.out, "{}", cancelled.dimmed()) {
            debug!("Terminal write failed: {}", e);
        }
    }
}

/// Terminal columns `line` takes up, ignoring ANSI escape sequences.
/// Wide glyphs count as two columns.
pub fn visible_width(line: &str) -> usize {
    let mut width = 0;
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            // CSI: ESC [ params final-byte
            if chars.next() == Some('[') {
                for c in chars.by_ref() {
                    if ('@'..='~').contains(&c) {
                        break;
                    }
                }
            }
            continue;
        }
        width += c.width().unwrap_or(0);
    }
    width
}

/// Terminal rows `text` occupies at `columns` wide, counting wraps.
pub fn rows_for(text: &str, columns: u16) -> usize {
    let columns = usize::from(columns.max(1));
    let rows: usize = text
        .split('\n')
        .map(|line| visible_width(line).div_ceil(columns).max(1))
        .sum();
    rows.max(1)
}
