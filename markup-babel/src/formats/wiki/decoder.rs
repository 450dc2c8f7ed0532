//! Wiki markup → canonical text
//!
//! Protection comes first. `{code}` and `{noformat}` bodies are swapped for block tokens
//! before anything else looks at the text, so headings, list markers, emphasis, `{quote}`,
//! `{panel}` and `{{...}}` inside code survive verbatim.
//!
//! `{panel}` and `{quote}` regions are then lifted out as a second layer of tokens. Each
//! interior is decoded on its own and re-wrapped: panels become an optional `**Title**` line
//! followed by their content, quotes become `> `-prefixed lines. Whichever opener comes first
//! owns the region, so a quote inside a panel (or a panel inside a quote) is decoded as part of
//! the outer region's interior.
//!
//! Remaining lines go through the line rules (headings, `bq.`, list markers, tables, rules) and
//! the wiki span tokenizer.

use super::WikiOptions;
use crate::common::inline::{tokenize, Fragment, SpanKind, WIKI_RULES};
use crate::common::links::rewrite_smart_link;
use crate::common::protect::{Placement, Protector};
use crate::common::table::parse_wiki_row;
use once_cell::sync::Lazy;
use regex::Regex;

static CODE_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(code|noformat)(?::([^}\n]*))?\}").unwrap());
static REGION_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(panel|quote)(?::([^}\n]*))?\}").unwrap());
static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^h([1-6])\.\s*(.*)$").unwrap());
static BLOCKQUOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^bq\.\s?(.*)$").unwrap());
// Only `*` and `#` runs nest; `-` and `+` mark a single-level bullet
static LIST: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([*#]+|[-+])\s+(.*)$").unwrap());
static RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-{4,}$").unwrap());

/// A verbatim code body.
struct Code {
    language: Option<String>,
}

/// A block region decoded separately from the surrounding text.
enum Region {
    Panel { title: Option<String> },
    Quote,
}

/// Convert wiki markup to canonical text.
pub fn decode(wiki: &str, options: &WikiOptions) -> String {
    if !options.translate || wiki.is_empty() {
        return wiki.to_string();
    }

    let mut code = Protector::new(wiki);
    let protected = protect_code(wiki, &mut code);
    let body = Decoder {
        code: &code,
        base_url: &options.base_url,
    }
    .decode_body(&protected);

    let restored = code.restore(&body, |code, content| {
        let language = code.language.as_deref().unwrap_or_default();
        Some(format!("```{language}\n{content}\n```"))
    });
    restored.trim_end_matches('\n').to_string()
}

/// Position after a block closer at `pos`.
///
/// The token line already ends the line, so the spacing and newline that followed the closer
/// are dropped with it.
fn past_block(text: &str, pos: usize) -> usize {
    let rest = &text[pos..];
    let spacing = rest.len() - rest.trim_start_matches(|c| c == ' ' || c == '\t').len();
    let pos = pos + spacing;
    if text[pos..].starts_with('\n') {
        pos + 1
    } else {
        pos
    }
}

fn protect_code(text: &str, guard: &mut Protector<Code>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    // A kind whose closing tag is missing after one opener is missing after every later one
    let mut exhausted = [false; 2];

    while let Some(caps) = CODE_OPEN.captures_at(text, pos) {
        let (Some(whole), Some(kind)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let slot = usize::from(kind.as_str() == "noformat");
        let closing = format!("{{{}}}", kind.as_str());
        let closed = if exhausted[slot] {
            None
        } else {
            text[whole.end()..].find(&closing)
        };

        let Some(offset) = closed else {
            exhausted[slot] = true;
            log::debug!("unterminated {{{}}} block left as text", kind.as_str());
            out.push_str(&text[pos..whole.end()]);
            pos = whole.end();
            continue;
        };

        let language = if kind.as_str() == "code" {
            caps.get(2).and_then(|params| code_language(params.as_str()))
        } else {
            None
        };
        let inner = &text[whole.end()..whole.end() + offset];
        let inner = inner.strip_prefix('\n').unwrap_or(inner);
        let inner = inner.strip_suffix('\n').unwrap_or(inner);

        out.push_str(&text[pos..whole.start()]);
        guard.splice(&mut out, Code { language }, inner, Placement::Block);
        pos = past_block(text, whole.end() + offset + closing.len());
    }
    out.push_str(&text[pos..]);
    out
}

/// Language of a `{code:...}` block: the first bare parameter or `language=`.
fn code_language(params: &str) -> Option<String> {
    params.split('|').find_map(|param| {
        let param = param.trim();
        match param.split_once('=') {
            Some((key, value)) if key.trim().eq_ignore_ascii_case("language") => {
                Some(value.trim().to_string())
            }
            Some(_) => None,
            None if !param.is_empty() => Some(param.to_string()),
            None => None,
        }
    })
}

fn panel_title(params: &str) -> Option<String> {
    params.split('|').find_map(|param| {
        let (key, value) = param.split_once('=')?;
        (key.trim() == "title" && !value.trim().is_empty()).then(|| value.trim().to_string())
    })
}

struct Decoder<'a> {
    code: &'a Protector<Code>,
    base_url: &'a str,
}

impl Decoder<'_> {
    /// Decode text whose code bodies are already protected.
    fn decode_body(&self, text: &str) -> String {
        let mut regions: Protector<Region> = self.code.layer(text);
        let protected = self.protect_regions(text, &mut regions);
        let lines = self.decode_lines(&protected, &regions);

        regions.restore(&lines, |region, interior| {
            let decoded = self.decode_body(interior.trim_matches('\n'));
            Some(match region {
                Region::Panel { title: Some(title) } => format!("**{title}**\n{decoded}"),
                Region::Panel { title: None } => decoded,
                Region::Quote => decoded
                    .lines()
                    .map(|line| {
                        if line.is_empty() {
                            ">".to_string()
                        } else {
                            format!("> {line}")
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("\n"),
            })
        })
    }

    fn protect_regions(&self, text: &str, guard: &mut Protector<Region>) -> String {
        let mut out = String::with_capacity(text.len());
        let mut pos = 0;
        let mut exhausted = [false; 2];

        while let Some(caps) = REGION_OPEN.captures_at(text, pos) {
            let (Some(whole), Some(kind)) = (caps.get(0), caps.get(1)) else {
                break;
            };
            let slot = usize::from(kind.as_str() == "quote");
            let closing = format!("{{{}}}", kind.as_str());
            let closed = if exhausted[slot] {
                None
            } else {
                text[whole.end()..].find(&closing)
            };

            let Some(offset) = closed else {
                exhausted[slot] = true;
                out.push_str(&text[pos..whole.end()]);
                pos = whole.end();
                continue;
            };

            let region = match kind.as_str() {
                "panel" => Region::Panel {
                    title: caps.get(2).and_then(|params| panel_title(params.as_str())),
                },
                _ => Region::Quote,
            };
            let interior = &text[whole.end()..whole.end() + offset];
            out.push_str(&text[pos..whole.start()]);
            guard.splice(&mut out, region, interior, Placement::Block);
            pos = past_block(text, whole.end() + offset + closing.len());
        }
        out.push_str(&text[pos..]);
        out
    }

    fn decode_lines(&self, text: &str, regions: &Protector<Region>) -> String {
        let mut out: Vec<String> = Vec::new();

        for line in text.lines() {
            if self.code.is_token_line(line) || regions.is_token_line(line) {
                out.push(line.trim().to_string());
                continue;
            }
            let trimmed = line.trim();

            if let Some(caps) = HEADING.captures(trimmed) {
                let level = caps
                    .get(1)
                    .and_then(|m| m.as_str().parse::<usize>().ok())
                    .unwrap_or(1);
                let text = caps.get(2).map_or("", |m| m.as_str());
                out.push(format!("{} {}", "#".repeat(level), self.inline(text.trim())));
                continue;
            }

            if let Some(caps) = BLOCKQUOTE.captures(trimmed) {
                let text = caps.get(1).map_or("", |m| m.as_str());
                out.push(format!("> {}", self.inline(text.trim())));
                continue;
            }

            if RULE.is_match(trimmed) {
                out.push("---".to_string());
                continue;
            }

            if let Some(caps) = LIST.captures(trimmed) {
                let markers = caps.get(1).map_or("", |m| m.as_str());
                let text = caps.get(2).map_or("", |m| m.as_str());
                let indent = "  ".repeat(markers.chars().count().saturating_sub(1));
                let prefix = if markers.ends_with('#') { "1." } else { "-" };
                out.push(format!("{indent}{prefix} {}", self.inline(text.trim())));
                continue;
            }

            if let Some(row) = parse_wiki_row(trimmed) {
                let cells: Vec<String> = row.cells.iter().map(|c| self.inline(c)).collect();
                out.push(format!("|{}|", cells.join("|")));
                if row.header {
                    out.push(format!("|{}|", vec!["---"; cells.len()].join("|")));
                }
                continue;
            }

            out.push(self.inline(line.trim_end()));
        }

        out.join("\n")
    }

    /// Translate the wiki spans of one line.
    fn inline(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for fragment in tokenize(text, WIKI_RULES) {
            let span = match fragment {
                Fragment::Text(plain) => {
                    out.push_str(plain);
                    continue;
                }
                Fragment::Span(span) => span,
            };
            match span.kind {
                SpanKind::Code => out.push_str(&format!("`{}`", span.text)),
                SpanKind::Mention => out.push_str(&format!("User:{}", span.text)),
                SpanKind::Bold => out.push_str(&format!("**{}**", self.inline(span.text))),
                SpanKind::Italic => out.push_str(&format!("*{}*", self.inline(span.text))),
                SpanKind::Strike => out.push_str(&format!("~~{}~~", self.inline(span.text))),
                SpanKind::Citation => {
                    out.push_str(&format!("<cite>{}</cite>", self.inline(span.text)))
                }
                SpanKind::Inserted => out.push_str(&format!("<ins>{}</ins>", self.inline(span.text))),
                SpanKind::Superscript => {
                    out.push_str(&format!("<sup>{}</sup>", self.inline(span.text)))
                }
                SpanKind::Subscript => {
                    out.push_str(&format!("<sub>{}</sub>", self.inline(span.text)))
                }
                SpanKind::Color => {
                    let color = span.target.unwrap_or_default().trim();
                    out.push_str(&format!(
                        r#"<span style="color:{color}">{}</span>"#,
                        self.inline(span.text)
                    ));
                }
                SpanKind::BareLink => {
                    let url = span.target.unwrap_or(span.text);
                    out.push_str(&format!("[{url}]({url})"));
                }
                SpanKind::Link => out.push_str(&self.link(span.text, span.target, span.extra)),
                SpanKind::Image => {
                    let source = span.target.unwrap_or(span.text);
                    let alt = span.extra.and_then(image_alt).unwrap_or_default();
                    out.push_str(&format!("![{alt}]({source})"));
                }
            }
        }
        out
    }

    fn link(&self, text: &str, target: Option<&str>, extra: Option<&str>) -> String {
        let url = target.unwrap_or_default().trim();
        let text = text.trim();
        let (label, url) = if extra.is_some_and(|flag| flag.trim() == "smart-link") {
            rewrite_smart_link(text, url, self.base_url)
        } else {
            (text.to_string(), url.to_string())
        };
        if label.is_empty() {
            format!("[{url}]({url})")
        } else {
            format!("[{}]({url})", self.inline(&label))
        }
    }
}

fn image_alt(params: &str) -> Option<&str> {
    params
        .split([',', '|'])
        .find_map(|param| param.trim().strip_prefix("alt="))
        .map(|alt| alt.trim().trim_matches('"'))
}
