//! Rendering of generated markdown for display.
//!
//! Generated lesson plans are markdown. [`render_html`] turns them into an
//! HTML fragment for the web page and [`render_terminal`] into plain text for
//! the CLI. Raw HTML inside the markdown is shown as text, never passed
//! through.

use pulldown_cmark::{html, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options
}

/// Renders markdown to an HTML fragment.
///
/// Headings, lists, emphasis, tables and code blocks become their HTML
/// equivalents. Embedded HTML is escaped. Empty input gives an empty string.
#[must_use]
pub fn render_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, parser_options()).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        other => other,
    });

    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}

/// Schemes a link or image may point at. Anything without a scheme is a
/// relative path or fragment and is kept.
const ALLOWED_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// Blanks link and image destinations with a scheme outside
/// [`ALLOWED_SCHEMES`], such as `javascript:` or `data:`.
fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    // Browsers ignore whitespace and control characters inside the scheme.
    let cleaned: String = url
        .chars()
        .filter(|ch| !ch.is_ascii_whitespace() && !ch.is_control())
        .collect();

    let scheme = cleaned
        .find(|ch| matches!(ch, ':' | '/' | '?' | '#'))
        .filter(|&end| cleaned[end..].starts_with(':'))
        .map(|end| cleaned[..end].to_ascii_lowercase());

    match scheme {
        Some(scheme) if !ALLOWED_SCHEMES.contains(&scheme.as_str()) => CowStr::Borrowed(""),
        _ => url,
    }
}

/// Renders markdown to plain text for a terminal.
///
/// Level one and two headings are underlined, deeper headings keep their
/// `#` prefix. Lists are indented by nesting depth and code blocks by four
/// spaces. Tables are drawn with `|` separators.
#[must_use]
pub fn render_terminal(markdown: &str) -> String {
    let mut writer = TerminalWriter::default();
    for event in Parser::new_ext(markdown, parser_options()) {
        writer.handle(event);
    }
    writer.finish()
}

#[derive(Default)]
struct TerminalWriter {
    output: String,
    line: String,
    /// Next number for each open list; `None` for bullet lists.
    lists: Vec<Option<u64>>,
    in_code_block: bool,
    row: Vec<String>,
}

impl TerminalWriter {
    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                self.line.push('`');
                self.line.push_str(&code);
                self.line.push('`');
            }
            Event::Html(raw) | Event::InlineHtml(raw) => self.text(&raw),
            Event::SoftBreak => self.line.push(' '),
            Event::HardBreak => self.flush_line(),
            Event::Rule => {
                self.flush_line();
                self.output.push_str(&"-".repeat(40));
                self.output.push_str("\n\n");
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { .. } | Tag::Table(_) => self.flush_line(),
            Tag::List(first) => {
                self.flush_line();
                self.lists.push(first);
            }
            Tag::Item => {
                self.flush_line();
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut() {
                    Some(Some(next)) => {
                        let marker = format!("{next}. ");
                        *next += 1;
                        marker
                    }
                    _ => "- ".to_string(),
                };
                self.line = format!("{}{marker}", "  ".repeat(depth));
            }
            Tag::CodeBlock(_) => {
                self.flush_line();
                self.in_code_block = true;
            }
            Tag::TableHead | Tag::TableRow => self.row.clear(),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(level) => {
                let title = std::mem::take(&mut self.line);
                let title = title.trim();
                match level {
                    HeadingLevel::H1 => self.underline(title, '='),
                    HeadingLevel::H2 => self.underline(title, '-'),
                    deeper => {
                        let hashes = "#".repeat(deeper as usize);
                        self.output.push_str(&format!("{hashes} {title}\n\n"));
                    }
                }
            }
            TagEnd::Paragraph => {
                self.flush_line();
                if self.lists.is_empty() {
                    self.output.push('\n');
                }
            }
            TagEnd::Item => self.flush_line(),
            TagEnd::List(_) => {
                self.flush_line();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.output.push('\n');
                }
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.output.push('\n');
            }
            TagEnd::TableCell => {
                let cell = std::mem::take(&mut self.line);
                self.row.push(cell.trim().to_string());
            }
            TagEnd::TableHead => {
                self.write_row();
                let separator = vec!["---"; self.row.len()].join(" | ");
                self.output.push_str(&format!("| {separator} |\n"));
            }
            TagEnd::TableRow => self.write_row(),
            TagEnd::Table => self.output.push('\n'),
            _ => {}
        }
    }

    fn text(&mut self, text: &CowStr<'_>) {
        if self.in_code_block {
            for line in text.lines() {
                self.output.push_str("    ");
                self.output.push_str(line);
                self.output.push('\n');
            }
        } else {
            self.line.push_str(text);
        }
    }

    fn underline(&mut self, title: &str, ch: char) {
        let rule: String = std::iter::repeat(ch).take(title.chars().count()).collect();
        self.output.push_str(&format!("{title}\n{rule}\n\n"));
    }

    fn write_row(&mut self) {
        self.output
            .push_str(&format!("| {} |\n", self.row.join(" | ")));
    }

    /// Moves the pending line to the output. Marker-only lines are dropped.
    fn flush_line(&mut self) {
        let line = std::mem::take(&mut self.line);
        let trimmed = line.trim_end();
        if trimmed.trim_start().is_empty() || trimmed.trim_start() == "-" {
            return;
        }
        self.output.push_str(trimmed);
        self.output.push('\n');
    }

    fn finish(mut self) -> String {
        self.flush_line();
        self.output.trim_end().to_string()
    }
}
