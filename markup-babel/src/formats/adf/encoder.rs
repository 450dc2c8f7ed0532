//! Canonical text → rich document tree
//!
//! A line scanner with lookahead grouping. Each block kind claims a run of lines:
//!
//!     | lines                               | node                                   |
//!     |-------------------------------------|----------------------------------------|
//!     | ```` ```lang ```` … ```` ``` ````   | codeBlock (verbatim, `language` attr)  |
//!     | `#`… + space                        | heading (level clamped to 1..=6)       |
//!     | `---`, `***`, `___` (3 or more)     | rule                                   |
//!     | consecutive `>` lines               | blockquote → one paragraph             |
//!     | consecutive `- ` / `* ` lines       | bulletList → listItem → paragraph      |
//!     | consecutive `1. ` lines             | orderedList → listItem → paragraph     |
//!     | consecutive `|` lines               | table (header row when a separator     |
//!     |                                     | follows the first row)                 |
//!     | anything else                       | paragraph                              |
//!
//! Inline text goes through the canonical span tokenizer; nested spans accumulate marks.

use super::nodes::{Document, Mark, Node};
use crate::common::inline::{tokenize, Fragment, SpanKind, CANONICAL_RULES};
use crate::common::table::{is_pipe_row, is_separator_row, split_row};
use once_cell::sync::Lazy;
use regex::Regex;

static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#+)\s+(.*)$").unwrap());
static RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:-{3,}|_{3,}|\*{3,})$").unwrap());
static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-*]\s+(.*)$").unwrap());
static ORDERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\s+(.*)$").unwrap());

/// Encode canonical text into a rich document. Never fails; empty input yields one empty
/// paragraph.
pub fn encode(markdown: &str) -> Document {
    let lines: Vec<&str> = markdown.lines().collect();
    let mut content = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim();

        if trimmed.is_empty() {
            i += 1;
            continue;
        }

        if let Some(info) = trimmed.strip_prefix("```") {
            let language = info.trim();
            let language = (!language.is_empty()).then(|| language.to_string());
            let mut body = Vec::new();
            i += 1;
            while i < lines.len() && !lines[i].trim_start().starts_with("```") {
                body.push(lines[i]);
                i += 1;
            }
            if i == lines.len() {
                log::debug!("unterminated code fence closed at end of input");
            }
            // Skip the closing fence
            i += 1;
            content.push(Node::code_block(language, &body.join("\n")));
            continue;
        }

        if let Some(caps) = HEADING.captures(trimmed) {
            let level = caps.get(1).map_or(1, |m| m.as_str().len()).min(6) as u8;
            let text = caps.get(2).map_or("", |m| m.as_str().trim());
            content.push(Node::heading(level, inline(text)));
            i += 1;
            continue;
        }

        if RULE.is_match(trimmed) {
            content.push(Node::Rule);
            i += 1;
            continue;
        }

        if trimmed.starts_with('>') {
            let mut parts = Vec::new();
            while i < lines.len() && lines[i].trim().starts_with('>') {
                let quoted = lines[i].trim()[1..].trim();
                if !quoted.is_empty() {
                    parts.push(quoted);
                }
                i += 1;
            }
            content.push(Node::Blockquote {
                content: vec![Node::paragraph(inline(&parts.join(" ")))],
            });
            continue;
        }

        if BULLET.is_match(trimmed) {
            let items = collect_items(&lines, &mut i, &BULLET);
            content.push(Node::BulletList { content: items });
            continue;
        }

        if ORDERED.is_match(trimmed) {
            let items = collect_items(&lines, &mut i, &ORDERED);
            content.push(Node::OrderedList { content: items });
            continue;
        }

        if is_pipe_row(line) {
            let mut rows = Vec::new();
            while i < lines.len() && is_pipe_row(lines[i]) {
                rows.push(lines[i]);
                i += 1;
            }
            content.push(table(&rows));
            continue;
        }

        content.push(Node::paragraph(inline(trimmed)));
        i += 1;
    }

    if content.is_empty() {
        return Document::default();
    }
    Document::new(content)
}

/// Encode optional input; `None` behaves like empty text.
pub fn encode_optional(markdown: Option<&str>) -> Document {
    encode(markdown.unwrap_or_default())
}

fn collect_items(lines: &[&str], i: &mut usize, marker: &Regex) -> Vec<Node> {
    let mut items = Vec::new();
    while *i < lines.len() {
        let Some(caps) = marker.captures(lines[*i].trim()) else {
            break;
        };
        let text = caps.get(1).map_or("", |m| m.as_str().trim());
        let mut paragraph = inline(text);
        if paragraph.is_empty() {
            paragraph.push(Node::text("", Vec::new()));
        }
        items.push(Node::ListItem {
            content: vec![Node::paragraph(paragraph)],
        });
        *i += 1;
    }
    items
}

fn table(rows: &[&str]) -> Node {
    let has_header = rows.len() > 1 && is_separator_row(rows[1]);
    let mut content = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        if has_header && index == 1 {
            continue;
        }
        let header = has_header && index == 0;
        let cells = split_row(row)
            .iter()
            .map(|cell| {
                let paragraph = vec![Node::paragraph(inline(cell))];
                if header {
                    Node::TableHeader { content: paragraph }
                } else {
                    Node::TableCell { content: paragraph }
                }
            })
            .collect();
        content.push(Node::TableRow { content: cells });
    }
    Node::table(content)
}

/// Tokenize a text run into text nodes.
pub fn inline(text: &str) -> Vec<Node> {
    let mut nodes = Vec::new();
    push_inline(text, &[], &mut nodes);
    nodes
}

fn push_inline(text: &str, marks: &[Mark], out: &mut Vec<Node>) {
    for fragment in tokenize(text, CANONICAL_RULES) {
        match fragment {
            Fragment::Text(plain) => out.push(Node::text(plain, marks.to_vec())),
            Fragment::Span(span) => {
                let mark = match span.kind {
                    SpanKind::Bold => Mark::Strong,
                    SpanKind::Italic => Mark::Em,
                    SpanKind::Strike => Mark::Strike,
                    SpanKind::Code => {
                        let mut code_marks = marks.to_vec();
                        code_marks.push(Mark::Code);
                        out.push(Node::text(span.text, code_marks));
                        continue;
                    }
                    SpanKind::Image => {
                        let source = span.target.unwrap_or_default();
                        let label = if span.text.is_empty() { source } else { span.text };
                        let mut link_marks = marks.to_vec();
                        link_marks.push(Mark::link(source));
                        out.push(Node::text(label, link_marks));
                        continue;
                    }
                    SpanKind::Link => Mark::link(span.target.unwrap_or_default()),
                    _ => {
                        out.push(Node::text(span.raw, marks.to_vec()));
                        continue;
                    }
                };
                let mut nested = marks.to_vec();
                nested.push(mark);
                push_inline(span.text, &nested, out);
            }
        }
    }
}
