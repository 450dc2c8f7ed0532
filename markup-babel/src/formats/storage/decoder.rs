//! Storage markup → canonical text
//!
//! Pipeline: storage string → RcDom → macro rewriting (users, images) → processed HTML, and
//! the same DOM → canonical text.
//!
//! Block handling:
//!
//!     | Storage                                     | Canonical                        |
//!     |---------------------------------------------|----------------------------------|
//!     | `<h1>`..`<h6>`                              | `#`..`######`                    |
//!     | `<p>`                                       | paragraph                        |
//!     | `<ul>` / `<ol>`                             | `- a` / `1. a`, 2 spaces a level |
//!     | `<blockquote>`                              | `> ` lines                       |
//!     | `<pre>`, code and noformat macros           | fenced code                      |
//!     | info, note, tip, warning and panel macros   | quote led by a bold title        |
//!     | `<table>`                                   | pipe table, first row as header  |
//!     | `<hr>`                                      | `---`                            |
//!     | layouts and other macros                    | their body                       |

use super::dom::{
    attr, body, children, find_child, find_descendant, is_element, macro_parameter, parse,
    serialize_children, tag, text_content,
};
use super::macros::{rewrite, StorageContext};
use markup5ever_rcdom::{Handle, NodeData};

/// Decoded storage document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageDocument {
    /// Storage markup with user and image macros rewritten.
    pub html: String,
    /// Canonical text of the document.
    pub markdown: String,
}

const ADMONITIONS: &[&str] = &["info", "note", "tip", "warning", "panel"];

/// Decode storage markup.
pub fn decode(html: &str, context: &StorageContext<'_>) -> StorageDocument {
    if html.trim().is_empty() {
        return StorageDocument::default();
    }

    let dom = parse(html);
    let Some(body) = body(&dom) else {
        return StorageDocument {
            html: html.to_string(),
            markdown: String::new(),
        };
    };

    rewrite(&body, context);
    let processed = serialize_children(&body).unwrap_or_else(|e| {
        log::warn!("keeping original storage markup: {e}");
        html.to_string()
    });

    StorageDocument {
        html: processed,
        markdown: blocks(&body).join("\n\n"),
    }
}

fn is_block(node: &Handle) -> bool {
    match tag(node) {
        Some(
            "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "ul" | "ol" | "blockquote" | "pre"
            | "table" | "hr" | "div" | "section" | "ac:layout" | "ac:layout-section"
            | "ac:layout-cell" | "ac:rich-text-body",
        ) => true,
        Some("ac:structured-macro") => {
            let name = attr(node, "ac:name").unwrap_or_default();
            matches!(name.as_str(), "code" | "noformat")
                || ADMONITIONS.contains(&name.as_str())
                || find_child(node, "ac:rich-text-body").is_some()
        }
        _ => false,
    }
}

/// Canonical blocks of a container's children.
fn blocks(node: &Handle) -> Vec<String> {
    let mut out = Vec::new();
    let mut pending = String::new();
    for child in children(node) {
        if is_block(&child) {
            flush(&mut pending, &mut out);
            out.extend(block(&child));
        } else {
            pending.push_str(&inline(&child));
        }
    }
    flush(&mut pending, &mut out);
    out
}

fn flush(pending: &mut String, out: &mut Vec<String>) {
    let paragraph = tidy(pending);
    if !paragraph.is_empty() {
        out.push(paragraph);
    }
    pending.clear();
}

/// Trim every line of inline output and drop the blank ones at either end.
fn tidy(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim_matches('\n')
        .to_string()
}

fn block(node: &Handle) -> Vec<String> {
    let Some(name) = tag(node) else {
        return Vec::new();
    };
    match name {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = name[1..].parse::<usize>().unwrap_or(1);
            let text = tidy(&inline_children(node)).replace('\n', " ");
            vec![format!("{} {}", "#".repeat(level), text)]
        }
        "p" => {
            let text = tidy(&inline_children(node));
            if text.is_empty() {
                Vec::new()
            } else {
                vec![text]
            }
        }
        "ul" | "ol" => {
            let lines = list(node, 0);
            if lines.is_empty() {
                Vec::new()
            } else {
                vec![lines.join("\n")]
            }
        }
        "blockquote" => {
            let inner = blocks(node).join("\n\n");
            if inner.is_empty() {
                Vec::new()
            } else {
                vec![quote(&inner)]
            }
        }
        "pre" => {
            let language = find_child(node, "code")
                .and_then(|code| attr(&code, "class"))
                .and_then(|class| {
                    class
                        .split_whitespace()
                        .find_map(|c| c.strip_prefix("language-").map(str::to_string))
                });
            vec![fence(language.as_deref(), &text_content(node))]
        }
        "table" => {
            let table = table(node);
            if table.is_empty() {
                Vec::new()
            } else {
                vec![table]
            }
        }
        "hr" => vec!["---".to_string()],
        "ac:structured-macro" => structured_macro(node),
        _ => blocks(node),
    }
}

fn structured_macro(node: &Handle) -> Vec<String> {
    let name = attr(node, "ac:name").unwrap_or_default();

    if name == "code" || name == "noformat" {
        let language = if name == "code" {
            macro_parameter(node, "language").filter(|l| !l.trim().is_empty())
        } else {
            None
        };
        let body = find_child(node, "ac:plain-text-body")
            .map(|b| text_content(&b))
            .unwrap_or_default();
        return vec![fence(language.as_deref(), &body)];
    }

    let content = find_child(node, "ac:rich-text-body")
        .map(|b| blocks(&b).join("\n\n"))
        .unwrap_or_default();

    if ADMONITIONS.contains(&name.as_str()) {
        let title = macro_parameter(node, "title")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .or_else(|| (name != "panel").then(|| capitalize(&name)));
        let text = match title {
            Some(title) if content.is_empty() => format!("**{title}**"),
            Some(title) => format!("**{title}**\n{content}"),
            None => content,
        };
        return if text.is_empty() {
            Vec::new()
        } else {
            vec![quote(&text)]
        };
    }

    if content.is_empty() {
        Vec::new()
    } else {
        vec![content]
    }
}

fn fence(language: Option<&str>, body: &str) -> String {
    let body = body.strip_prefix('\n').unwrap_or(body);
    let body = body.strip_suffix('\n').unwrap_or(body);
    format!("```{}\n{body}\n```", language.unwrap_or_default().trim())
}

fn quote(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                ">".to_string()
            } else {
                format!("> {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn list(node: &Handle, depth: usize) -> Vec<String> {
    let ordered = is_element(node, "ol");
    let indent = "  ".repeat(depth);
    let mut lines = Vec::new();
    let mut number = 0;

    for child in children(node) {
        if is_element(&child, "ul") || is_element(&child, "ol") {
            lines.extend(list(&child, depth + 1));
            continue;
        }
        if !is_element(&child, "li") {
            continue;
        }
        number += 1;
        let mut text = String::new();
        let mut nested = Vec::new();
        for part in children(&child) {
            if is_element(&part, "ul") || is_element(&part, "ol") {
                nested.extend(list(&part, depth + 1));
            } else {
                text.push_str(&inline(&part));
                if is_block(&part) {
                    text.push(' ');
                }
            }
        }
        let text = tidy(&text).replace('\n', " ");
        let marker = if ordered {
            format!("{number}.")
        } else {
            "-".to_string()
        };
        lines.push(format!("{indent}{marker} {text}").trim_end().to_string());
        lines.extend(nested);
    }
    lines
}

fn table(node: &Handle) -> String {
    let mut rows = Vec::new();
    collect_rows(node, &mut rows);

    let mut lines = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        let cells: Vec<String> = children(row)
            .iter()
            .filter(|cell| is_element(cell, "th") || is_element(cell, "td"))
            .map(|cell| {
                tidy(&inline_children(cell))
                    .replace('\n', " ")
                    .replace('|', "\\|")
            })
            .collect();
        if cells.is_empty() {
            continue;
        }
        lines.push(format!("| {} |", cells.join(" | ")));
        if index == 0 {
            lines.push(format!("|{}|", vec!["---"; cells.len()].join("|")));
        }
    }
    lines.join("\n")
}

fn collect_rows(node: &Handle, rows: &mut Vec<Handle>) {
    for child in children(node) {
        if is_element(&child, "tr") {
            rows.push(child);
        } else if !is_element(&child, "table") {
            collect_rows(&child, rows);
        }
    }
}

fn inline_children(node: &Handle) -> String {
    children(node).iter().map(inline).collect()
}

fn inline(node: &Handle) -> String {
    if let NodeData::Text { contents } = &node.data {
        return collapse_whitespace(&contents.borrow());
    }
    let Some(name) = tag(node) else {
        return String::new();
    };
    match name {
        "strong" | "b" => wrap(node, "**"),
        "em" | "i" => wrap(node, "*"),
        "s" | "del" | "strike" => wrap(node, "~~"),
        "code" => format!("`{}`", text_content(node)),
        "br" => "\n".to_string(),
        "a" => {
            let text = tidy(&inline_children(node));
            match attr(node, "href").filter(|h| !h.is_empty()) {
                Some(href) if text.is_empty() => format!("[{href}]({href})"),
                Some(href) => format!("[{text}]({href})"),
                None => text,
            }
        }
        "img" => {
            let src = attr(node, "src").unwrap_or_default();
            let alt = attr(node, "alt").unwrap_or_default();
            format!("![{alt}]({src})")
        }
        "ac:link" => link_body(node),
        "ac:emoticon" => attr(node, "ac:emoji-fallback").unwrap_or_default(),
        "ac:parameter" | "ac:plain-text-body" | "script" | "style" => String::new(),
        "ac:structured-macro" => match find_child(node, "ac:rich-text-body") {
            Some(body) => inline_children(&body),
            None => macro_parameter(node, "title").unwrap_or_default(),
        },
        _ => inline_children(node),
    }
}

/// Wrap inline content in a delimiter, keeping surrounding whitespace outside it.
fn wrap(node: &Handle, marker: &str) -> String {
    let inner = inline_children(node);
    let trimmed = inner.trim();
    if trimmed.is_empty() {
        return inner;
    }
    let leading = &inner[..inner.len() - inner.trim_start().len()];
    let trailing = &inner[inner.trim_end().len()..];
    format!("{leading}{marker}{trimmed}{marker}{trailing}")
}

/// Label of an `ac:link` to a page or attachment.
fn link_body(node: &Handle) -> String {
    let body = find_descendant(node, "ac:plain-text-link-body")
        .or_else(|| find_descendant(node, "ac:link-body"))
        .map(|b| text_content(&b))
        .filter(|t| !t.trim().is_empty());
    if let Some(body) = body {
        return collapse_whitespace(&body);
    }
    find_descendant(node, "ri:page")
        .and_then(|page| attr(&page, "ri:content-title"))
        .or_else(|| {
            find_descendant(node, "ri:attachment").and_then(|a| attr(&a, "ri:filename"))
        })
        .unwrap_or_default()
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() && c != '\u{a0}' {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}
