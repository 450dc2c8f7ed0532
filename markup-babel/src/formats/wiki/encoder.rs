//! Canonical text → wiki markup
//!
//! Three passes:
//!
//!     1. Fenced code blocks are swapped for block tokens. Their fences are translated right away
//!        (```` ```lang ```` → `{code:lang}` with the language run through the alias table) and
//!        their bodies are never touched again.
//!     2. The remaining lines are rewritten block by block (headings, rules, quotes, lists,
//!        tables), with inline spans translated through the canonical tokenizer.
//!     3. Tokens are replaced by the translated code blocks.
//!
//! Lines already written as wiki bullets (`* a`, `** b`, `*** c` at column zero) are kept as
//! bullets of the same depth, never read as bold delimiters.

use super::WikiOptions;
use crate::common::inline::{tokenize, Fragment, SpanKind, CANONICAL_WITH_HTML_RULES};
use crate::common::languages::wiki_language;
use crate::common::protect::{Placement, Protector};
use crate::common::table::{is_pipe_row, is_separator_row, split_row};
use once_cell::sync::Lazy;
use regex::Regex;

static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,6})\s+(.*)$").unwrap());
static RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:-{3,}|_{3,}|\*{3,})$").unwrap());
static WIKI_BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\*+) (.*)$").unwrap());
static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)[-*+]\s+(.*)$").unwrap());
static ORDERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)\d+[.)]\s+(.*)$").unwrap());
static SETEXT_H1: Lazy<Regex> = Lazy::new(|| Regex::new(r"^=+\s*$").unwrap());
static SETEXT_H2: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-{2,}\s*$").unwrap());
static AUTOLINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<((?:https?|ftp)://[^>\s]+|mailto:[^>\s]+)>").unwrap());

/// Translated code block standing behind a token.
struct CodeRegion;

/// Convert canonical text to wiki markup.
pub fn encode(markdown: &str, options: &WikiOptions) -> String {
    if !options.translate || markdown.is_empty() {
        return markdown.to_string();
    }

    let mut guard = Protector::new(markdown);
    let protected = protect_code(markdown, &mut guard);
    let lines: Vec<&str> = protected.lines().collect();
    let converted = convert_lines(&lines, &guard);
    let mut output = guard.restore(&converted, |_, block| Some(block.to_string()));

    if !markdown.ends_with('\n') {
        while output.ends_with('\n') {
            output.pop();
        }
    }
    output
}

fn protect_code(markdown: &str, guard: &mut Protector<CodeRegion>) -> String {
    let lines: Vec<&str> = markdown.lines().collect();
    let mut out = String::with_capacity(markdown.len());
    let mut i = 0;

    while i < lines.len() {
        let Some(info) = lines[i].trim_start().strip_prefix("```") else {
            out.push_str(lines[i]);
            out.push('\n');
            i += 1;
            continue;
        };

        let language = info.trim();
        let opener = match wiki_language(Some(language)) {
            Some(mapped) => format!("{{code:{mapped}}}"),
            None => "{code}".to_string(),
        };
        let mut body = Vec::new();
        i += 1;
        while i < lines.len() && !lines[i].trim_start().starts_with("```") {
            body.push(lines[i]);
            i += 1;
        }
        if i == lines.len() {
            log::debug!("unterminated code fence closed at end of input");
        }
        i += 1;

        let block = if body.is_empty() {
            format!("{opener}\n{{code}}")
        } else {
            format!("{opener}\n{}\n{{code}}", body.join("\n"))
        };
        guard.splice(&mut out, CodeRegion, block, Placement::Block);
    }
    out
}

fn convert_lines(lines: &[&str], guard: &Protector<CodeRegion>) -> String {
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim();

        if guard.is_token_line(line) || trimmed.is_empty() {
            out.push(trimmed.to_string());
            i += 1;
            continue;
        }

        if let Some(next) = lines.get(i + 1) {
            if is_plain_line(trimmed) && !guard.is_token_line(next) {
                if SETEXT_H1.is_match(next.trim()) {
                    out.push(format!("h1. {}", inline(trimmed)));
                    i += 2;
                    continue;
                }
                if SETEXT_H2.is_match(next.trim()) {
                    out.push(format!("h2. {}", inline(trimmed)));
                    i += 2;
                    continue;
                }
            }
        }

        if let Some(caps) = HEADING.captures(trimmed) {
            let level = caps.get(1).map_or(1, |m| m.as_str().len());
            let text = caps.get(2).map_or("", |m| m.as_str().trim());
            out.push(format!("h{level}. {}", inline(text)));
            i += 1;
            continue;
        }

        if RULE.is_match(trimmed) {
            out.push("----".to_string());
            i += 1;
            continue;
        }

        if trimmed.starts_with('>') {
            let mut quoted = Vec::new();
            while i < lines.len() && lines[i].trim().starts_with('>') {
                let text = lines[i].trim()[1..].trim();
                quoted.push(inline(text));
                i += 1;
            }
            if quoted.len() == 1 {
                out.push(format!("bq. {}", quoted[0]));
            } else {
                out.push("{quote}".to_string());
                out.extend(quoted);
                out.push("{quote}".to_string());
            }
            continue;
        }

        if let Some(caps) = WIKI_BULLET.captures(line) {
            let marker = caps.get(1).map_or("*", |m| m.as_str());
            let text = caps.get(2).map_or("", |m| m.as_str());
            out.push(format!("{marker} {}", inline(text.trim())));
            i += 1;
            continue;
        }

        if let Some(caps) = BULLET.captures(line) {
            out.push(list_item('*', &caps));
            i += 1;
            continue;
        }

        if let Some(caps) = ORDERED.captures(line) {
            out.push(list_item('#', &caps));
            i += 1;
            continue;
        }

        if is_pipe_row(line) {
            let start = i;
            while i < lines.len() && is_pipe_row(lines[i]) {
                i += 1;
            }
            out.extend(table(&lines[start..i]));
            continue;
        }

        out.push(inline(line.trim_end()));
        i += 1;
    }

    out.join("\n")
}

fn is_plain_line(trimmed: &str) -> bool {
    !(trimmed.starts_with('#')
        || trimmed.starts_with('>')
        || trimmed.starts_with('|')
        || trimmed.starts_with("```")
        || BULLET.is_match(trimmed)
        || ORDERED.is_match(trimmed)
        || RULE.is_match(trimmed))
}

fn list_item(marker: char, caps: &regex::Captures<'_>) -> String {
    let indent = caps.get(1).map_or(0, |m| indent_width(m.as_str()));
    let text = caps.get(2).map_or("", |m| m.as_str().trim());
    let depth = indent / 2 + 1;
    format!("{} {}", marker.to_string().repeat(depth), inline(text))
}

fn indent_width(prefix: &str) -> usize {
    prefix
        .chars()
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

fn table(rows: &[&str]) -> Vec<String> {
    let mut out = Vec::with_capacity(rows.len());
    let mut index = 0;
    while index < rows.len() {
        let cells: Vec<String> = split_row(rows[index]).iter().map(|c| inline(c)).collect();
        let header = rows.get(index + 1).is_some_and(|next| is_separator_row(next));
        if header {
            out.push(format!("||{}||", cells.join("||")));
            index += 2;
        } else {
            out.push(format!("|{}|", cells.join("|")));
            index += 1;
        }
    }
    out
}

/// Translate inline spans of one line.
pub fn inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for fragment in tokenize(text, CANONICAL_WITH_HTML_RULES) {
        match fragment {
            Fragment::Text(plain) => out.push_str(&AUTOLINK.replace_all(plain, "[$1]")),
            Fragment::Span(span) => match span.kind {
                SpanKind::Bold => wrap(&mut out, "*", &inline(span.text), "*"),
                SpanKind::Italic => wrap(&mut out, "_", &inline(span.text), "_"),
                SpanKind::Strike => wrap(&mut out, "-", &inline(span.text), "-"),
                SpanKind::Citation => wrap(&mut out, "??", &inline(span.text), "??"),
                SpanKind::Inserted => wrap(&mut out, "+", &inline(span.text), "+"),
                SpanKind::Superscript => wrap(&mut out, "^", &inline(span.text), "^"),
                SpanKind::Subscript => wrap(&mut out, "~", &inline(span.text), "~"),
                SpanKind::Code => wrap(&mut out, "{{", span.text, "}}"),
                SpanKind::Link => {
                    let target = span.target.unwrap_or_default();
                    out.push_str(&format!("[{}|{target}]", inline(span.text)));
                }
                SpanKind::Image => {
                    let source = span.target.unwrap_or_default();
                    if span.text.is_empty() {
                        out.push_str(&format!("!{source}!"));
                    } else {
                        out.push_str(&format!("!{source}|alt={}!", span.text));
                    }
                }
                SpanKind::Color => {
                    let color = span.target.unwrap_or_default().trim();
                    out.push_str(&format!("{{color:{color}}}{}{{color}}", inline(span.text)));
                }
                SpanKind::BareLink | SpanKind::Mention => out.push_str(span.raw),
            },
        }
    }
    out
}

fn wrap(out: &mut String, open: &str, body: &str, close: &str) {
    out.push_str(open);
    out.push_str(body);
    out.push_str(close);
}
