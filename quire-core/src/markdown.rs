use std::collections::HashSet;

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};
use unicode_normalization::UnicodeNormalization;

/// A paragraph holding only this marker is replaced by the table of contents.
pub const TOC_MARKER: &str = "[TOC]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub level: u8,
    pub id: String,
    pub text: String,
}

/// Markdown to HTML converter with heading anchors and `[TOC]` support.
///
/// Anchor ids are deduplicated per document, which makes the converter
/// stateful. [`convert`](Self::convert) resets that state before every
/// document so ids never carry over from one post to the next.
#[derive(Debug, Default)]
pub struct MarkdownRenderer {
    used_ids: HashSet<String>,
    headings: Vec<TocEntry>,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options() -> Options {
        Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_DEFINITION_LIST
    }

    /// Forget every anchor id and heading seen so far.
    pub fn reset(&mut self) {
        self.used_ids.clear();
        self.headings.clear();
    }

    /// Headings of the most recently converted document.
    pub fn headings(&self) -> &[TocEntry] {
        &self.headings
    }

    pub fn convert(&mut self, markdown: &str) -> String {
        self.reset();

        let events: Vec<Event> = Parser::new_ext(markdown, Self::options()).collect();
        let events = self.anchor_headings(events);
        let events = self.insert_toc(events);

        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());
        out
    }

    fn anchor_headings<'a>(&mut self, mut events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        // Explicit ids win over generated ones wherever they appear
        for event in &events {
            if let Event::Start(Tag::Heading { id: Some(id), .. }) = event {
                self.used_ids.insert(id.to_string());
            }
        }

        for i in 0..events.len() {
            let Event::Start(Tag::Heading { level, id, .. }) = &events[i] else {
                continue;
            };

            let level = *level as u8;
            let explicit = id.as_ref().map(|id| id.to_string());
            let text = heading_text(&events[i + 1..]);

            let anchor = match explicit {
                Some(id) => id,
                None => self.unique_id(&slugify(&text)),
            };

            if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
                *id = Some(CowStr::from(anchor.clone()));
            }

            self.headings.push(TocEntry {
                level,
                id: anchor,
                text,
            });
        }

        events
    }

    fn unique_id(&mut self, base: &str) -> String {
        let base = if base.is_empty() { "section" } else { base };

        let mut candidate = base.to_string();
        let mut n = 0;
        while self.used_ids.contains(&candidate) {
            n += 1;
            candidate = format!("{base}_{n}");
        }

        self.used_ids.insert(candidate.clone());
        candidate
    }

    fn insert_toc<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let mut processed = Vec::with_capacity(events.len());
        let mut i = 0;

        while i < events.len() {
            if matches!(events[i], Event::Start(Tag::Paragraph)) {
                if let Some(len) = toc_paragraph_len(&events[i..]) {
                    processed.push(Event::Html(render_toc(&self.headings).into()));
                    i += len;
                    continue;
                }
            }

            processed.push(events[i].clone());
            i += 1;
        }

        processed
    }
}

/// Number of events spanned by a paragraph that contains only the TOC marker.
fn toc_paragraph_len(events: &[Event]) -> Option<usize> {
    let mut text = String::new();

    for (offset, event) in events.iter().enumerate().skip(1) {
        match event {
            Event::Text(t) => text.push_str(t),
            Event::End(TagEnd::Paragraph) => {
                return (text.trim() == TOC_MARKER).then_some(offset + 1);
            }
            _ => return None,
        }
    }

    None
}

fn heading_text(events: &[Event]) -> String {
    let mut text = String::new();

    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }

    text.trim().to_string()
}

fn render_toc(entries: &[TocEntry]) -> String {
    let mut html = String::from("<div class=\"toc\">\n");
    // Heading level of each open <ul>
    let mut open: Vec<u8> = Vec::new();

    for entry in entries {
        match open.last().copied() {
            None => {
                html.push_str("<ul>\n");
                open.push(entry.level);
            }
            Some(top) if entry.level > top => {
                html.push_str("\n<ul>\n");
                open.push(entry.level);
            }
            Some(_) => {
                html.push_str("</li>\n");
                while open.len() > 1
                    && open.last().is_some_and(|&top| entry.level < top)
                    && entry.level <= open[open.len() - 2]
                {
                    open.pop();
                    html.push_str("</ul>\n</li>\n");
                }
                let nested = open.len() > 1;
                if let Some(top) = open.last_mut() {
                    if nested && entry.level < *top {
                        *top = entry.level;
                    }
                }
            }
        }

        html.push_str(&format!(
            "<li><a href=\"#{}\">{}</a>",
            html_escape::encode_quoted_attribute(&entry.id),
            html_escape::encode_text(&entry.text),
        ));
    }

    if !open.is_empty() {
        html.push_str("</li>\n");
        for _ in 1..open.len() {
            html.push_str("</ul>\n</li>\n");
        }
        html.push_str("</ul>\n");
    }

    html.push_str("</div>\n");
    html
}

/// Anchor id for a heading: lowercase ASCII words joined by `-`.
///
/// Accents are decomposed and dropped, any other non-ASCII character and
/// punctuation is removed.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.nfkd().filter(char::is_ascii) {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_ascii_whitespace() || c == '-' {
            pending_dash = true;
        }
    }

    slug
}
