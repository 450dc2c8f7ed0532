//! Canonical text → storage markup
//!
//! Pipeline: canonical string → Comrak AST → XHTML string. Fenced code becomes a `code` macro
//! whose body sits in CDATA, so it reaches the page verbatim.

use super::dom::{escape_attr, escape_text};
use super::StorageOptions;
use comrak::nodes::{AstNode, ListType, NodeValue};
use comrak::{parse_document, Arena, ComrakOptions};

/// Convert canonical text to storage markup.
pub fn encode(markdown: &str, options: &StorageOptions) -> String {
    let arena = Arena::new();
    let comrak_options = default_comrak_options();
    let root = parse_document(&arena, markdown, &comrak_options);

    let mut writer = Writer {
        out: String::with_capacity(markdown.len() * 2),
        options,
    };
    for child in root.children() {
        writer.block(child);
    }
    writer.out.trim_end().to_string()
}

fn default_comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.superscript = true;
    options
}

struct Writer<'o> {
    out: String,
    options: &'o StorageOptions,
}

impl Writer<'_> {
    fn block<'a>(&mut self, node: &'a AstNode<'a>) {
        let value = node.data.borrow().value.clone();
        match value {
            NodeValue::Heading(heading) => {
                let level = heading.level.clamp(1, 6);
                if self.options.heading_anchors {
                    let id = slug(&plain_text(node));
                    self.out
                        .push_str(&format!("<h{level} id=\"{}\">", escape_attr(&id)));
                } else {
                    self.out.push_str(&format!("<h{level}>"));
                }
                self.inline_children(node);
                self.out.push_str(&format!("</h{level}>\n"));
            }

            NodeValue::Paragraph => {
                if in_tight_item(node) {
                    self.inline_children(node);
                } else {
                    self.out.push_str("<p>");
                    self.inline_children(node);
                    self.out.push_str("</p>\n");
                }
            }

            NodeValue::List(list) => {
                let tag = match list.list_type {
                    ListType::Bullet => "ul",
                    ListType::Ordered => "ol",
                };
                if list.list_type == ListType::Ordered && list.start != 1 {
                    self.out.push_str(&format!("<ol start=\"{}\">\n", list.start));
                } else {
                    self.out.push_str(&format!("<{tag}>\n"));
                }
                for child in node.children() {
                    self.block(child);
                }
                self.out.push_str(&format!("</{tag}>\n"));
            }

            NodeValue::Item(_) | NodeValue::TaskItem(_) => {
                self.out.push_str("<li>");
                for child in node.children() {
                    self.block(child);
                }
                if self.out.ends_with('\n') {
                    self.out.pop();
                }
                self.out.push_str("</li>\n");
            }

            NodeValue::CodeBlock(code_block) => {
                let language = code_block.info.split_whitespace().next().unwrap_or_default();
                self.out.push_str(r#"<ac:structured-macro ac:name="code">"#);
                if !language.is_empty() {
                    self.out.push_str(&format!(
                        r#"<ac:parameter ac:name="language">{}</ac:parameter>"#,
                        escape_text(language)
                    ));
                }
                let body = code_block.literal.strip_suffix('\n').unwrap_or(&code_block.literal);
                self.out.push_str(&format!(
                    "<ac:plain-text-body><![CDATA[{}]]></ac:plain-text-body>",
                    body.replace("]]>", "]]]]><![CDATA[>")
                ));
                self.out.push_str("</ac:structured-macro>\n");
            }

            NodeValue::HtmlBlock(html) => {
                self.out.push_str(html.literal.trim_end());
                self.out.push('\n');
            }

            NodeValue::ThematicBreak => self.out.push_str("<hr />\n"),

            NodeValue::BlockQuote => {
                self.out.push_str("<blockquote>\n");
                for child in node.children() {
                    self.block(child);
                }
                self.out.push_str("</blockquote>\n");
            }

            NodeValue::Table(_) => {
                self.out.push_str("<table>\n<tbody>\n");
                for child in node.children() {
                    self.block(child);
                }
                self.out.push_str("</tbody>\n</table>\n");
            }

            NodeValue::TableRow(header) => {
                let cell = if header { "th" } else { "td" };
                self.out.push_str("<tr>");
                for child in node.children() {
                    self.out.push_str(&format!("<{cell}>"));
                    self.inline_children(child);
                    self.out.push_str(&format!("</{cell}>"));
                }
                self.out.push_str("</tr>\n");
            }

            _ => {
                // Inline content at block level, or a block type storage has no form for
                for child in node.children() {
                    self.block(child);
                }
            }
        }
    }

    fn inline_children<'a>(&mut self, node: &'a AstNode<'a>) {
        for child in node.children() {
            self.inline(child);
        }
    }

    fn inline<'a>(&mut self, node: &'a AstNode<'a>) {
        let value = node.data.borrow().value.clone();
        match value {
            NodeValue::Text(text) => self.out.push_str(&escape_text(&text)),
            NodeValue::SoftBreak => self.out.push('\n'),
            NodeValue::LineBreak => self.out.push_str("<br />"),
            NodeValue::Code(code) => {
                self.out
                    .push_str(&format!("<code>{}</code>", escape_text(&code.literal)));
            }
            NodeValue::HtmlInline(html) => self.out.push_str(&html),
            NodeValue::Strong => self.wrap(node, "strong"),
            NodeValue::Emph => self.wrap(node, "em"),
            NodeValue::Strikethrough => self.wrap(node, "del"),
            NodeValue::Superscript => self.wrap(node, "sup"),
            NodeValue::Link(link) => {
                self.out
                    .push_str(&format!("<a href=\"{}\">", escape_attr(&link.url)));
                self.inline_children(node);
                self.out.push_str("</a>");
            }
            NodeValue::Image(link) => {
                let alt = plain_text(node);
                self.out.push_str(&format!(
                    "<img src=\"{}\" alt=\"{}\" />",
                    escape_attr(&link.url),
                    escape_attr(&alt)
                ));
            }
            _ => self.inline_children(node),
        }
    }

    fn wrap<'a>(&mut self, node: &'a AstNode<'a>, tag: &str) {
        self.out.push_str(&format!("<{tag}>"));
        self.inline_children(node);
        self.out.push_str(&format!("</{tag}>"));
    }
}

/// Paragraphs directly inside items of a tight list render without `<p>`.
fn in_tight_item<'a>(node: &'a AstNode<'a>) -> bool {
    let Some(item) = node.parent() else {
        return false;
    };
    if !matches!(item.data.borrow().value, NodeValue::Item(_) | NodeValue::TaskItem(_)) {
        return false;
    }
    item.parent().is_some_and(|list| {
        matches!(&list.data.borrow().value, NodeValue::List(list) if list.tight)
    })
}

fn plain_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut out = String::new();
    collect_text(node, &mut out);
    out
}

fn collect_text<'a>(node: &'a AstNode<'a>, out: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(text) => out.push_str(text),
        NodeValue::Code(code) => out.push_str(&code.literal),
        NodeValue::SoftBreak | NodeValue::LineBreak => out.push(' '),
        _ => {}
    }
    for child in node.children() {
        collect_text(child, out);
    }
}

/// Heading anchor id: lowercase words joined by `-`.
fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if (c.is_whitespace() || c == '-') && !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}
