//! Inline span tokenizer
//!
//!     Splits a run of text into alternating plain-text and styled-span fragments. A rule set is
//!     an ordered slice of [`Rule`]s; the tokenizer repeatedly picks the span that starts
//!     earliest, breaking ties by rule order, and resumes scanning after it.
//!
//!     Each rule remembers its next match. A remembered match is reused as long as it starts at or
//!     after the current position, and a remembered miss means the rule cannot match anywhere
//!     later, so every rule searches the remaining text at most a handful of times. All matchers
//!     are either `regex` patterns (linear-time engine) or explicit forward scanners.
//!
//!     Two rule sets live here:
//!
//!         | set                  | spans (precedence order)                                      |
//!         |----------------------|---------------------------------------------------------------|
//!         | [`CANONICAL_RULES`]  | image, link, bold, italic, code, strike                       |
//!         | [`WIKI_RULES`]       | code, mention, link, bare link, image, color, cite, bold,     |
//!         |                      | italic, strike, inserted, superscript, subscript              |
//!
//!     The wiki encoder additionally uses [`CANONICAL_WITH_HTML_RULES`], which appends inline
//!     HTML tags (`<cite>`, `<del>`, colored `<span>`, ...) to the canonical set.

use crate::common::citation;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

/// The kind of a styled span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanKind {
    Image,
    Link,
    /// Wiki-only: `[url]` with no separate label.
    BareLink,
    Bold,
    Italic,
    Code,
    Strike,
    Mention,
    Citation,
    Color,
    Inserted,
    Superscript,
    Subscript,
}

impl SpanKind {
    /// Whether the span text may itself contain further spans.
    pub fn is_nested(self) -> bool {
        !matches!(
            self,
            SpanKind::Code | SpanKind::Mention | SpanKind::BareLink | SpanKind::Image
        )
    }
}

/// A span located by a rule, expressed as byte ranges into the searched text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanMatch {
    pub kind: SpanKind,
    /// The whole span including delimiters.
    pub range: Range<usize>,
    /// The span's displayed text (label, alt text, styled content).
    pub text: Range<usize>,
    /// Link targets, image sources, color names.
    pub target: Option<Range<usize>>,
    /// A trailing qualifier such as the `smart-link` flag or image parameters.
    pub extra: Option<Range<usize>>,
}

impl SpanMatch {
    fn new(kind: SpanKind, range: Range<usize>, text: Range<usize>) -> Self {
        SpanMatch {
            kind,
            range,
            text,
            target: None,
            extra: None,
        }
    }

    fn with_target(mut self, target: Option<Range<usize>>) -> Self {
        self.target = target;
        self
    }

    fn with_extra(mut self, extra: Option<Range<usize>>) -> Self {
        self.extra = extra;
        self
    }
}

/// A matcher returns the first span starting at or after `from`.
pub type Matcher = fn(&str, usize) -> Option<SpanMatch>;

/// One entry of a rule set.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub matcher: Matcher,
}

/// A piece of tokenized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment<'a> {
    Text(&'a str),
    Span(Span<'a>),
}

/// A resolved span borrowing from the tokenized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span<'a> {
    pub kind: SpanKind,
    pub raw: &'a str,
    pub text: &'a str,
    pub target: Option<&'a str>,
    pub extra: Option<&'a str>,
}

/// Tokenize `text` with the given rule set.
pub fn tokenize<'a>(text: &'a str, rules: &[Rule]) -> Vec<Fragment<'a>> {
    let mut fragments = Vec::new();
    // None = not searched yet; Some(None) = no match at or after the last search position
    let mut cache: Vec<Option<Option<SpanMatch>>> = vec![None; rules.len()];
    let mut pos = 0;

    while pos < text.len() {
        let mut best: Option<(usize, SpanMatch)> = None;
        for (index, rule) in rules.iter().enumerate() {
            let stale = match &cache[index] {
                None => true,
                Some(Some(found)) => found.range.start < pos,
                Some(None) => false,
            };
            if stale {
                cache[index] = Some((rule.matcher)(text, pos));
            }
            if let Some(Some(found)) = &cache[index] {
                let better = match &best {
                    None => true,
                    Some((_, current)) => found.range.start < current.range.start,
                };
                if better {
                    best = Some((index, found.clone()));
                }
            }
        }

        let Some((index, found)) = best else {
            break;
        };
        cache[index] = None;

        if found.range.start > pos {
            fragments.push(Fragment::Text(&text[pos..found.range.start]));
        }
        let end = found.range.end;
        fragments.push(Fragment::Span(Span {
            kind: found.kind,
            raw: &text[found.range.clone()],
            text: &text[found.text],
            target: found.target.map(|r| &text[r]),
            extra: found.extra.map(|r| &text[r]),
        }));
        // Empty spans never occur, but guard progress regardless
        pos = end.max(pos + 1);
    }

    if pos < text.len() {
        fragments.push(Fragment::Text(&text[pos..]));
    }
    fragments
}

fn group(caps: &regex::Captures<'_>, index: usize) -> Option<Range<usize>> {
    caps.get(index).map(|m| m.range())
}

fn regex_match(
    re: &Regex,
    text: &str,
    from: usize,
    build: impl Fn(&regex::Captures<'_>) -> Option<SpanMatch>,
) -> Option<SpanMatch> {
    let mut at = from;
    while at <= text.len() {
        let caps = re.captures_at(text, at)?;
        let whole = caps.get(0)?;
        if let Some(found) = build(&caps) {
            return Some(found);
        }
        // Rejected by a post-filter; try again one character later
        at = next_char_boundary(text, whole.start());
    }
    None
}

fn next_char_boundary(text: &str, index: usize) -> usize {
    text[index..]
        .chars()
        .next()
        .map(|c| index + c.len_utf8())
        .unwrap_or(text.len() + 1)
}

// ---------------------------------------------------------------------------
// Delimiter scanner shared by the single-character emphasis rules
// ---------------------------------------------------------------------------

/// Boundary requirements for a single-character delimiter pair such as `*x*` or `_x_`.
#[derive(Clone, Copy)]
struct Delimiter {
    ch: char,
    kind: SpanKind,
    /// Reject an opener preceded by, or a closer followed by, an alphanumeric character.
    word_guard: bool,
    /// Reject an opener not preceded by whitespace (or start), and a closer not followed by
    /// whitespace or punctuation.
    strict: bool,
}

impl Delimiter {
    fn is_opener(&self, prev: Option<char>, next: Option<char>) -> bool {
        let Some(next) = next else {
            return false;
        };
        if next.is_whitespace() || next == self.ch {
            return false;
        }
        match prev {
            Some(p) if p == self.ch => false,
            Some(p) if self.strict => p.is_whitespace() || is_open_punct(p),
            Some(p) if self.word_guard => !p.is_alphanumeric(),
            _ => true,
        }
    }

    fn is_closer(&self, prev: Option<char>, next: Option<char>) -> bool {
        match prev {
            Some(p) if !p.is_whitespace() && p != self.ch => {}
            _ => return false,
        }
        match next {
            Some(n) if n == self.ch => false,
            Some(n) if self.strict || self.word_guard => !n.is_alphanumeric(),
            _ => true,
        }
    }

    /// Find the first balanced pair starting at or after `from`.
    ///
    /// Closer validity does not depend on the opener, so once the first opener on a line finds
    /// no closer, no later opener on that line can either. The scan is a single forward pass
    /// that drops a pending opener at each newline.
    fn scan(&self, text: &str, from: usize) -> Option<SpanMatch> {
        let mut opener: Option<usize> = None;
        let mut prev = text[..from].chars().next_back();
        let mut chars = text[from..].char_indices().peekable();
        while let Some((offset, ch)) = chars.next() {
            let index = from + offset;
            let next = chars.peek().map(|(_, c)| *c);
            if ch == '\n' {
                opener = None;
            } else if ch == self.ch {
                match opener {
                    None => {
                        if self.is_opener(prev, next) {
                            opener = Some(index);
                        }
                    }
                    Some(open) => {
                        if index > open + 1 && self.is_closer(prev, next) {
                            let width = self.ch.len_utf8();
                            return Some(SpanMatch::new(
                                self.kind,
                                open..index + width,
                                open + width..index,
                            ));
                        }
                    }
                }
            }
            prev = Some(ch);
        }
        None
    }
}

fn is_open_punct(c: char) -> bool {
    matches!(c, '(' | '[' | '{' | '"' | '\'')
}

// ---------------------------------------------------------------------------
// Canonical (Markdown-like) rules
// ---------------------------------------------------------------------------

static MD_IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"!\[([^\]\n]*)\]\(([^()\s]*)(?:\s+"[^"\n]*")?\)"#).unwrap());
static MD_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\[([^\]\n]+)\]\(([^()\s]+)(?:\s+"[^"\n]*")?\)"#).unwrap());
static MD_STRONG_EM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*\*([^\s*](?:[^\n]*?[^\s*])?)\*\*\*").unwrap());
static MD_BOLD_STAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*([^\s*](?:[^\n]*?[^\s*])?)\*\*").unwrap());
static MD_BOLD_UNDERSCORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"__([^\s_](?:[^\n]*?[^\s_])?)__").unwrap());
static MD_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`\n]+)`").unwrap());
static MD_STRIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"~~([^~\n]+)~~").unwrap());

fn md_image(text: &str, from: usize) -> Option<SpanMatch> {
    regex_match(&MD_IMAGE, text, from, |caps| {
        Some(
            SpanMatch::new(SpanKind::Image, caps.get(0)?.range(), group(caps, 1)?)
                .with_target(group(caps, 2)),
        )
    })
}

fn md_link(text: &str, from: usize) -> Option<SpanMatch> {
    regex_match(&MD_LINK, text, from, |caps| {
        Some(
            SpanMatch::new(SpanKind::Link, caps.get(0)?.range(), group(caps, 1)?)
                .with_target(group(caps, 2)),
        )
    })
}

fn md_bold(text: &str, from: usize) -> Option<SpanMatch> {
    // `***x***` is bold around `*x*`, which the nested pass then reads as italic
    let strong_em = regex_match(&MD_STRONG_EM, text, from, |caps| {
        let inner = group(caps, 1)?;
        Some(SpanMatch::new(
            SpanKind::Bold,
            caps.get(0)?.range(),
            inner.start - 1..inner.end + 1,
        ))
    });
    let star = regex_match(&MD_BOLD_STAR, text, from, |caps| {
        Some(SpanMatch::new(SpanKind::Bold, caps.get(0)?.range(), group(caps, 1)?))
    });
    let underscore = regex_match(&MD_BOLD_UNDERSCORE, text, from, |caps| {
        let whole = caps.get(0)?;
        let before = text[..whole.start()].chars().next_back();
        let after = text[whole.end()..].chars().next();
        if before.is_some_and(char::is_alphanumeric) || after.is_some_and(char::is_alphanumeric)
        {
            return None;
        }
        Some(SpanMatch::new(SpanKind::Bold, whole.range(), group(caps, 1)?))
    });
    earliest(strong_em, earliest(star, underscore))
}

fn md_italic(text: &str, from: usize) -> Option<SpanMatch> {
    // A star opener must follow whitespace or opening punctuation: `5*3*2`, `src/*.rs`
    let star = Delimiter {
        ch: '*',
        kind: SpanKind::Italic,
        word_guard: true,
        strict: true,
    };
    let underscore = Delimiter {
        ch: '_',
        kind: SpanKind::Italic,
        word_guard: true,
        strict: false,
    };
    earliest(star.scan(text, from), underscore.scan(text, from))
}

fn md_code(text: &str, from: usize) -> Option<SpanMatch> {
    regex_match(&MD_CODE, text, from, |caps| {
        Some(SpanMatch::new(SpanKind::Code, caps.get(0)?.range(), group(caps, 1)?))
    })
}

fn md_strike(text: &str, from: usize) -> Option<SpanMatch> {
    regex_match(&MD_STRIKE, text, from, |caps| {
        Some(SpanMatch::new(SpanKind::Strike, caps.get(0)?.range(), group(caps, 1)?))
    })
}

fn earliest(a: Option<SpanMatch>, b: Option<SpanMatch>) -> Option<SpanMatch> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if b.range.start < a.range.start { b } else { a }),
        (a, b) => a.or(b),
    }
}

/// Canonical text spans in precedence order.
pub static CANONICAL_RULES: &[Rule] = &[
    Rule { name: "image", matcher: md_image },
    Rule { name: "link", matcher: md_link },
    Rule { name: "bold", matcher: md_bold },
    Rule { name: "italic", matcher: md_italic },
    Rule { name: "code", matcher: md_code },
    Rule { name: "strike", matcher: md_strike },
];

// ---------------------------------------------------------------------------
// Inline HTML accepted in canonical text
// ---------------------------------------------------------------------------

const HTML_TAGS: &[(&str, SpanKind)] = &[
    ("cite", SpanKind::Citation),
    ("del", SpanKind::Strike),
    ("s", SpanKind::Strike),
    ("ins", SpanKind::Inserted),
    ("sup", SpanKind::Superscript),
    ("sub", SpanKind::Subscript),
];

static HTML_OPEN_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(cite|del|s|ins|sup|sub)>").unwrap());
static HTML_COLOR_SPAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<span style="color:\s*([^";]+);?">([^<\n]*)</span>"#).unwrap()
});

fn html_tag(text: &str, from: usize) -> Option<SpanMatch> {
    // Tags whose closing form has already been found missing past some opener
    let mut exhausted = [false; HTML_TAGS.len()];
    for caps in HTML_OPEN_TAG.captures_iter(&text[from..]) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let Some(slot) = HTML_TAGS.iter().position(|(tag, _)| *tag == name.as_str()) else {
            continue;
        };
        if exhausted[slot] {
            continue;
        }
        let inner_start = from + whole.end();
        let closing = format!("</{}>", name.as_str());
        match text[inner_start..].find(&closing) {
            Some(offset) => {
                let inner_end = inner_start + offset;
                return Some(SpanMatch::new(
                    HTML_TAGS[slot].1,
                    from + whole.start()..inner_end + closing.len(),
                    inner_start..inner_end,
                ));
            }
            None => exhausted[slot] = true,
        }
    }
    None
}

fn html_color(text: &str, from: usize) -> Option<SpanMatch> {
    regex_match(&HTML_COLOR_SPAN, text, from, |caps| {
        Some(
            SpanMatch::new(SpanKind::Color, caps.get(0)?.range(), group(caps, 2)?)
                .with_target(group(caps, 1)),
        )
    })
}

/// Canonical spans plus the inline HTML tags the wiki dialect has counterparts for.
pub static CANONICAL_WITH_HTML_RULES: &[Rule] = &[
    Rule { name: "image", matcher: md_image },
    Rule { name: "link", matcher: md_link },
    Rule { name: "bold", matcher: md_bold },
    Rule { name: "italic", matcher: md_italic },
    Rule { name: "code", matcher: md_code },
    Rule { name: "strike", matcher: md_strike },
    Rule { name: "html-tag", matcher: html_tag },
    Rule { name: "html-color", matcher: html_color },
];

// ---------------------------------------------------------------------------
// Wiki dialect rules
// ---------------------------------------------------------------------------

static WIKI_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{([^\n]+?)\}\}").unwrap());
static WIKI_MENTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[~(?:accountid:)?([^\]\n]+)\]").unwrap());
static WIKI_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]|\n]*)\|([^\]|\n]+)(?:\|([^\]\n]*))?\]").unwrap());
static WIKI_BARE_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[((?:https?|ftp)://[^\]|\s]+|mailto:[^\]|\s]+)\]").unwrap()
});
static WIKI_IMAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"!((?:https?://)?[^!\s|]+\.[A-Za-z0-9]+|https?://[^!\s|]+)(?:\|([^!\n]*))?!")
        .unwrap()
});
static WIKI_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{color:([^}\n]+)\}([^\n]*?)\{color\}").unwrap());

fn wiki_code(text: &str, from: usize) -> Option<SpanMatch> {
    regex_match(&WIKI_CODE, text, from, |caps| {
        Some(SpanMatch::new(SpanKind::Code, caps.get(0)?.range(), group(caps, 1)?))
    })
}

fn wiki_mention(text: &str, from: usize) -> Option<SpanMatch> {
    regex_match(&WIKI_MENTION, text, from, |caps| {
        Some(SpanMatch::new(SpanKind::Mention, caps.get(0)?.range(), group(caps, 1)?))
    })
}

fn wiki_link(text: &str, from: usize) -> Option<SpanMatch> {
    regex_match(&WIKI_LINK, text, from, |caps| {
        Some(
            SpanMatch::new(SpanKind::Link, caps.get(0)?.range(), group(caps, 1)?)
                .with_target(group(caps, 2))
                .with_extra(group(caps, 3)),
        )
    })
}

fn wiki_bare_link(text: &str, from: usize) -> Option<SpanMatch> {
    regex_match(&WIKI_BARE_LINK, text, from, |caps| {
        let url = group(caps, 1)?;
        Some(
            SpanMatch::new(SpanKind::BareLink, caps.get(0)?.range(), url.clone())
                .with_target(Some(url)),
        )
    })
}

fn wiki_image(text: &str, from: usize) -> Option<SpanMatch> {
    regex_match(&WIKI_IMAGE, text, from, |caps| {
        let source = group(caps, 1)?;
        Some(
            SpanMatch::new(SpanKind::Image, caps.get(0)?.range(), source.clone())
                .with_target(Some(source))
                .with_extra(group(caps, 2)),
        )
    })
}

fn wiki_color(text: &str, from: usize) -> Option<SpanMatch> {
    regex_match(&WIKI_COLOR, text, from, |caps| {
        Some(
            SpanMatch::new(SpanKind::Color, caps.get(0)?.range(), group(caps, 2)?)
                .with_target(group(caps, 1)),
        )
    })
}

fn wiki_citation(text: &str, from: usize) -> Option<SpanMatch> {
    let (range, inner) = citation::find_from(text, from)?;
    Some(SpanMatch::new(SpanKind::Citation, range, inner))
}

fn wiki_bold(text: &str, from: usize) -> Option<SpanMatch> {
    Delimiter {
        ch: '*',
        kind: SpanKind::Bold,
        word_guard: true,
        strict: false,
    }
    .scan(text, from)
}

fn wiki_italic(text: &str, from: usize) -> Option<SpanMatch> {
    Delimiter {
        ch: '_',
        kind: SpanKind::Italic,
        word_guard: true,
        strict: false,
    }
    .scan(text, from)
}

fn wiki_strike(text: &str, from: usize) -> Option<SpanMatch> {
    strict('-', SpanKind::Strike, text, from)
}

fn strict(ch: char, kind: SpanKind, text: &str, from: usize) -> Option<SpanMatch> {
    Delimiter {
        ch,
        kind,
        word_guard: true,
        strict: true,
    }
    .scan(text, from)
}

fn wiki_inserted(text: &str, from: usize) -> Option<SpanMatch> {
    strict('+', SpanKind::Inserted, text, from)
}

fn wiki_superscript(text: &str, from: usize) -> Option<SpanMatch> {
    strict('^', SpanKind::Superscript, text, from)
}

fn wiki_subscript(text: &str, from: usize) -> Option<SpanMatch> {
    strict('~', SpanKind::Subscript, text, from)
}

/// Wiki dialect spans in precedence order.
pub static WIKI_RULES: &[Rule] = &[
    Rule { name: "code", matcher: wiki_code },
    Rule { name: "mention", matcher: wiki_mention },
    Rule { name: "link", matcher: wiki_link },
    Rule { name: "bare-link", matcher: wiki_bare_link },
    Rule { name: "image", matcher: wiki_image },
    Rule { name: "color", matcher: wiki_color },
    Rule { name: "citation", matcher: wiki_citation },
    Rule { name: "bold", matcher: wiki_bold },
    Rule { name: "italic", matcher: wiki_italic },
    Rule { name: "strike", matcher: wiki_strike },
    Rule { name: "inserted", matcher: wiki_inserted },
    Rule { name: "superscript", matcher: wiki_superscript },
    Rule { name: "subscript", matcher: wiki_subscript },
];
