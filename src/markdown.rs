//! Markdown to egui text layout
//!
//! Covers what chat replies actually use: paragraphs, headings, strong and
//! emphasised spans, inline and fenced code, bullet and numbered lists and
//! rules. Anything else falls through as its plain text.

use eframe::egui::text::{LayoutJob, TextFormat};
use eframe::egui::{Color32, FontId};
use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};

/// Fonts and colours for one surface (a bubble, a banner, a card).
#[derive(Debug, Clone, PartialEq)]
pub struct MarkdownStyle {
    pub body: FontId,
    pub code: FontId,
    pub text: Color32,
    pub strong: Color32,
    pub code_background: Color32,
}

pub fn layout_job(source: &str, style: &MarkdownStyle) -> LayoutJob {
    let mut renderer = Renderer::new(style);
    for event in Parser::new(source) {
        renderer.event(event);
    }
    renderer.job
}

struct Renderer<'a> {
    style: &'a MarkdownStyle,
    job: LayoutJob,
    strong: usize,
    emphasis: usize,
    heading: Option<HeadingLevel>,
    code_block: bool,
    /// Next number for each open list; `None` for bullets.
    lists: Vec<Option<u64>>,
    /// Set right after a list marker so the item's first paragraph stays on
    /// the marker's line.
    item_open: bool,
    pending_newlines: usize,
}

impl<'a> Renderer<'a> {
    fn new(style: &'a MarkdownStyle) -> Self {
        Self {
            style,
            job: LayoutJob::default(),
            strong: 0,
            emphasis: 0,
            heading: None,
            code_block: false,
            lists: Vec::new(),
            item_open: false,
            pending_newlines: 0,
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                let format = if self.code_block {
                    self.code_format()
                } else {
                    self.text_format()
                };
                self.push(&text, format);
            }
            Event::Code(code) => self.push(&code, self.code_format()),
            Event::Html(html) | Event::InlineHtml(html) => self.push(&html, self.text_format()),
            Event::SoftBreak => self.push(" ", self.text_format()),
            Event::HardBreak => self.push("\n", self.text_format()),
            Event::Rule => {
                self.block_break(2);
                self.push("―――", self.plain_format());
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if !self.item_open {
                    self.block_break(2);
                }
            }
            Tag::Heading { level, .. } => {
                self.block_break(2);
                self.heading = Some(level);
            }
            Tag::CodeBlock(_) => {
                self.block_break(2);
                self.code_block = true;
            }
            Tag::List(start) => {
                self.block_break(if self.lists.is_empty() { 2 } else { 1 });
                self.lists.push(start);
            }
            Tag::Item => {
                self.block_break(1);
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut() {
                    Some(Some(number)) => {
                        let marker = format!("{number}. ");
                        *number += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                let indent = "    ".repeat(depth);
                self.push(&format!("{indent}{marker}"), self.plain_format());
                self.item_open = true;
            }
            Tag::Strong => self.strong += 1,
            Tag::Emphasis => self.emphasis += 1,
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => self.heading = None,
            TagEnd::CodeBlock => {
                self.code_block = false;
                self.trim_trailing_newline();
            }
            TagEnd::List(_) => {
                self.lists.pop();
            }
            TagEnd::Item => self.item_open = false,
            TagEnd::Strong => self.strong = self.strong.saturating_sub(1),
            TagEnd::Emphasis => self.emphasis = self.emphasis.saturating_sub(1),
            _ => {}
        }
    }

    fn block_break(&mut self, newlines: usize) {
        if !self.job.text.is_empty() {
            self.pending_newlines = self.pending_newlines.max(newlines);
        }
    }

    fn push(&mut self, text: &str, format: TextFormat) {
        if text.is_empty() {
            return;
        }
        if self.pending_newlines > 0 {
            let breaks = "\n".repeat(self.pending_newlines);
            self.pending_newlines = 0;
            self.append(&breaks, self.plain_format());
        }
        self.append(text, format);
        self.item_open = false;
    }

    /// Extends the last section when the format matches, so split text
    /// events end up as one run.
    fn append(&mut self, text: &str, format: TextFormat) {
        let start = self.job.text.len();
        if let Some(last) = self.job.sections.last_mut() {
            if last.byte_range.end == start && last.format == format {
                self.job.text.push_str(text);
                last.byte_range.end = self.job.text.len();
                return;
            }
        }
        self.job.append(text, 0.0, format);
    }

    fn trim_trailing_newline(&mut self) {
        if !self.job.text.ends_with('\n') {
            return;
        }
        self.job.text.pop();
        let end = self.job.text.len();
        if let Some(section) = self.job.sections.last_mut() {
            section.byte_range.end = section.byte_range.end.min(end);
            if section.byte_range.is_empty() {
                self.job.sections.pop();
            }
        }
    }

    fn plain_format(&self) -> TextFormat {
        TextFormat {
            font_id: self.style.body.clone(),
            color: self.style.text,
            ..Default::default()
        }
    }

    fn text_format(&self) -> TextFormat {
        let mut format = self.plain_format();
        if let Some(level) = self.heading {
            format.font_id.size *= heading_scale(level);
            format.color = self.style.strong;
        }
        if self.strong > 0 {
            format.color = self.style.strong;
        }
        format.italics = self.emphasis > 0;
        format
    }

    fn code_format(&self) -> TextFormat {
        TextFormat {
            font_id: self.style.code.clone(),
            color: self.style.text,
            background: self.style.code_background,
            ..Default::default()
        }
    }
}

fn heading_scale(level: HeadingLevel) -> f32 {
    match level {
        HeadingLevel::H1 => 1.5,
        HeadingLevel::H2 => 1.3,
        HeadingLevel::H3 => 1.15,
        _ => 1.0,
    }
}
