//! Markdown to Pango markup, for showing summaries in a `gtk4::Label`.

use gtk4::glib;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

const BULLET: &str = "\u{2022}";

/// Render `source` as Pango markup. All text is escaped.
pub fn to_pango(source: &str) -> String {
    if source.trim().is_empty() {
        return String::new();
    }
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);

    let mut renderer = Renderer::default();
    for event in Parser::new_ext(source, options) {
        renderer.event(event);
    }
    renderer.finish()
}

#[derive(Default)]
struct Renderer {
    out: String,
    /// One entry per open list: the next number for ordered lists.
    lists: Vec<Option<u64>>,
    quote_depth: usize,
    /// Set between a block quote opening and its first paragraph.
    quote_opened: bool,
    link_stack: Vec<bool>,
}

impl Renderer {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                self.out.push_str("<tt>");
                self.text(&code);
                self.out.push_str("</tt>");
            }
            Event::SoftBreak => self.out.push(' '),
            Event::HardBreak => self.newline(),
            Event::Rule => {
                self.block_gap();
                self.out.push_str("\u{2500}".repeat(24).as_str());
                self.out.push_str("\n\n");
            }
            Event::TaskListMarker(done) => {
                self.out.push_str(if done { "\u{2611} " } else { "\u{2610} " });
            }
            Event::Html(html) | Event::InlineHtml(html) => self.text(&html),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.block_gap();
                let size = match level {
                    HeadingLevel::H1 => "xx-large",
                    HeadingLevel::H2 => "x-large",
                    HeadingLevel::H3 => "large",
                    _ => "medium",
                };
                self.out
                    .push_str(&format!("<span size=\"{size}\" weight=\"bold\">"));
            }
            Tag::Paragraph => {
                if self.lists.is_empty() {
                    if !std::mem::take(&mut self.quote_opened) {
                        self.block_gap();
                    }
                    self.quote_prefix();
                }
            }
            Tag::BlockQuote { .. } => {
                self.block_gap();
                self.quote_depth += 1;
                self.quote_opened = true;
                self.out.push_str("<i>");
            }
            Tag::CodeBlock(_) => {
                self.block_gap();
                self.out.push_str("<tt>");
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.block_gap();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                if !self.out.is_empty() && !self.out.ends_with('\n') {
                    self.out.push('\n');
                }
                let depth = self.lists.len().saturating_sub(1);
                self.out.push_str(&"    ".repeat(depth));
                match self.lists.last_mut() {
                    Some(Some(n)) => {
                        self.out.push_str(&format!("{n}. "));
                        *n += 1;
                    }
                    _ => {
                        self.out.push_str(BULLET);
                        self.out.push(' ');
                    }
                }
            }
            Tag::Emphasis => self.out.push_str("<i>"),
            Tag::Strong => self.out.push_str("<b>"),
            Tag::Strikethrough => self.out.push_str("<s>"),
            Tag::Link { dest_url, .. } => {
                let safe = is_safe_link(&dest_url);
                if safe {
                    self.out
                        .push_str(&format!("<a href=\"{}\">", glib::markup_escape_text(&dest_url)));
                }
                self.link_stack.push(safe);
            }
            Tag::TableCell => self.out.push_str(" | "),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => self.out.push_str("</span>\n"),
            TagEnd::Paragraph => {
                if self.lists.is_empty() {
                    self.out.push('\n');
                }
            }
            TagEnd::BlockQuote { .. } => {
                self.out.push_str("</i>");
                self.quote_depth = self.quote_depth.saturating_sub(1);
                if !self.out.ends_with('\n') {
                    self.out.push('\n');
                }
            }
            TagEnd::CodeBlock => {
                while self.out.ends_with('\n') {
                    self.out.pop();
                }
                self.out.push_str("</tt>\n");
            }
            TagEnd::List(_) => {
                self.lists.pop();
                if self.lists.is_empty() && !self.out.ends_with('\n') {
                    self.out.push('\n');
                }
            }
            TagEnd::Emphasis => self.out.push_str("</i>"),
            TagEnd::Strong => self.out.push_str("</b>"),
            TagEnd::Strikethrough => self.out.push_str("</s>"),
            TagEnd::Link => {
                if self.link_stack.pop().unwrap_or(false) {
                    self.out.push_str("</a>");
                }
            }
            TagEnd::TableRow | TagEnd::TableHead => self.out.push_str(" |\n"),
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        self.out.push_str(&glib::markup_escape_text(text));
    }

    fn newline(&mut self) {
        self.out.push('\n');
        self.quote_prefix();
    }

    fn quote_prefix(&mut self) {
        if self.quote_depth > 0 {
            self.out.push_str(&"\u{2502} ".repeat(self.quote_depth));
        }
    }

    /// Separate blocks by one blank line.
    fn block_gap(&mut self) {
        if self.out.is_empty() {
            return;
        }
        while !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }

    fn finish(mut self) -> String {
        let trimmed = self.out.trim_end_matches('\n').len();
        self.out.truncate(trimmed);
        self.out
    }
}

fn is_safe_link(url: &str) -> bool {
    let lower = url.trim().to_ascii_lowercase();
    lower.starts_with("https://") || lower.starts_with("http://") || lower.starts_with("mailto:")
}
