//! Markdown to terminal text.
//!
//! Replies are rendered from scratch on every update, so this only has
//! to be a pure function of the text received so far. Unterminated
//! constructs in a partial reply simply render as whatever the parser
//! makes of them at that point.

use super::palette::Palette;
use colored::{ColoredString, Colorize};
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

const RULE_WIDTH: usize = 40;
const CODE_INDENT: &str = "  ";
const QUOTE_PREFIX: &str = "│ ";

/// Renders markdown with ANSI styling from a [`Palette`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer {
    palette: Palette,
}

impl MarkdownRenderer {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn render(&self, markdown: &str) -> String {
        let mut state = RenderState::new(self.palette);
        let parser = Parser::new_ext(markdown, Options::ENABLE_STRIKETHROUGH);
        for event in parser {
            state.event(event);
        }
        state.finish()
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Style {
    bold: bool,
    italic: bool,
    strike: bool,
}

struct RenderState {
    palette: Palette,
    out: String,
    style: Style,
    heading: Option<HeadingLevel>,
    in_code_block: bool,
    quote_depth: usize,
    /// One entry per open list: the next number for ordered lists.
    lists: Vec<Option<u64>>,
    link: Option<String>,
}

impl RenderState {
    fn new(palette: Palette) -> Self {
        Self {
            palette,
            out: String::new(),
            style: Style::default(),
            heading: None,
            in_code_block: false,
            quote_depth: 0,
            lists: Vec::new(),
            link: None,
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                let styled = code.color(self.palette.code).to_string();
                self.out.push_str(&styled);
            }
            Event::SoftBreak | Event::HardBreak => self.newline(),
            Event::Rule => {
                self.start_block();
                let rule = "─".repeat(RULE_WIDTH).color(self.palette.quote).to_string();
                self.out.push_str(&rule);
                self.out.push('\n');
            }
            Event::TaskListMarker(done) => {
                self.out.push_str(if done { "[x] " } else { "[ ] " });
            }
            Event::Html(html) | Event::InlineHtml(html) => self.out.push_str(&html),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if self.lists.is_empty() {
                    self.start_block();
                }
                self.quote_prefix();
            }
            Tag::Heading { level, .. } => {
                self.start_block();
                self.heading = Some(level);
            }
            Tag::BlockQuote { .. } => {
                self.start_block();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(kind) => {
                self.start_block();
                self.in_code_block = true;
                if let CodeBlockKind::Fenced(lang) = kind
                    && !lang.is_empty()
                {
                    let label = format!("{CODE_INDENT}[{lang}]").dimmed().to_string();
                    self.out.push_str(&label);
                    self.out.push('\n');
                }
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.start_block();
                } else {
                    self.newline_if_needed();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                self.newline_if_needed();
                let depth = self.lists.len().saturating_sub(1);
                self.out.push_str(&"  ".repeat(depth));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                let marker = marker.color(self.palette.accent).to_string();
                self.out.push_str(&marker);
            }
            Tag::Emphasis => self.style.italic = true,
            Tag::Strong => self.style.bold = true,
            Tag::Strikethrough => self.style.strike = true,
            Tag::Link { dest_url, .. } => self.link = Some(dest_url.to_string()),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.out.push('\n'),
            TagEnd::Heading { .. } => {
                self.heading = None;
                self.out.push('\n');
            }
            TagEnd::BlockQuote { .. } => {
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.newline_if_needed();
            }
            TagEnd::List { .. } => {
                self.lists.pop();
            }
            TagEnd::Item => self.newline_if_needed(),
            TagEnd::Emphasis => self.style.italic = false,
            TagEnd::Strong => self.style.bold = false,
            TagEnd::Strikethrough => self.style.strike = false,
            TagEnd::Link => {
                if let Some(url) = self.link.take() {
                    let url = format!(" ({url})").dimmed().to_string();
                    self.out.push_str(&url);
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_code_block {
            for line in text.split_inclusive('\n') {
                let (body, newline) = match line.strip_suffix('\n') {
                    Some(body) => (body, true),
                    None => (line, false),
                };
                if self.at_line_start() {
                    self.out.push_str(CODE_INDENT);
                }
                let styled = body.color(self.palette.code).to_string();
                self.out.push_str(&styled);
                if newline {
                    self.out.push('\n');
                }
            }
            return;
        }

        let styled = self.styled(text).to_string();
        self.out.push_str(&styled);
    }

    fn styled(&self, text: &str) -> ColoredString {
        let mut s = text.normal();
        if self.heading.is_some() {
            s = s.color(self.palette.heading).bold();
            if self.heading == Some(HeadingLevel::H1) {
                s = s.underline();
            }
        } else if self.quote_depth > 0 {
            s = s.color(self.palette.quote).italic();
        } else if self.link.is_some() {
            s = s.color(self.palette.accent).underline();
        }
        if self.style.bold {
            s = s.bold();
        }
        if self.style.italic {
            s = s.italic();
        }
        if self.style.strike {
            s = s.strikethrough();
        }
        s
    }

    fn newline(&mut self) {
        self.out.push('\n');
        self.quote_prefix();
    }

    fn quote_prefix(&mut self) {
        if self.quote_depth > 0 {
            let prefix = QUOTE_PREFIX
                .repeat(self.quote_depth)
                .color(self.palette.quote)
                .to_string();
            self.out.push_str(&prefix);
        }
    }

    fn at_line_start(&self) -> bool {
        self.out.is_empty() || self.out.ends_with('\n')
    }

    fn newline_if_needed(&mut self) {
        if !self.at_line_start() {
            self.out.push('\n');
        }
    }

    /// Separate a new block from the previous one by a blank line.
    fn start_block(&mut self) {
        if self.out.is_empty() || self.out.ends_with("\n\n") {
            return;
        }
        self.newline_if_needed();
        self.out.push('\n');
    }

    fn finish(self) -> String {
        self.out.trim_end_matches('\n').to_string()
    }
}
