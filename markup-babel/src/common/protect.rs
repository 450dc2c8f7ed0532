//! Protected regions
//!
//!     Some spans must pass through a line-oriented transform untouched: code bodies, panel and
//!     quote interiors that get their own treatment, and so on. A [`Protector`] swaps each such
//!     span for an opaque token, the transform runs over the remaining text, and
//!     [`Protector::restore`] substitutes rendered content back.
//!
//!     Tokens are built from a private-use character that does not occur in the source text, so a
//!     token can never collide with user content. Block tokens always occupy a line of their own,
//!     which lets line transforms skip them with [`Protector::is_token_line`].
//!
//!     Restoration is selective: the render callback returns `None` for regions it does not
//!     handle, leaving their tokens in place. Callers use this to restore layers in the reverse
//!     order they were protected (outer regions first, then the code they contain).

/// How a region sits in the surrounding text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The token replaces the span in-line.
    Inline,
    /// The token is forced onto a line of its own.
    Block,
}

#[derive(Debug, Clone)]
struct Region<K> {
    kind: K,
    content: String,
}

/// Call-scoped map from generated tokens to the content they stand for.
#[derive(Debug, Clone)]
pub struct Protector<K> {
    sentinel: char,
    regions: Vec<Region<K>>,
}

impl<K> Protector<K> {
    /// Create a protector whose tokens cannot occur in `source`.
    pub fn new(source: &str) -> Self {
        let sentinel = ('\u{E000}'..='\u{F8FF}')
            .find(|c| !source.contains(*c))
            .unwrap_or('\u{FFFF}');
        Protector {
            sentinel,
            regions: Vec::new(),
        }
    }

    /// Create a protector for a second layer of regions over `source`.
    ///
    /// Its tokens use a different sentinel from this protector's, so the two layers can be told
    /// apart even when `source` carries no tokens yet.
    pub fn layer<J>(&self, source: &str) -> Protector<J> {
        let sentinel = ('\u{E000}'..='\u{F8FF}')
            .find(|c| *c != self.sentinel && !source.contains(*c))
            .unwrap_or('\u{FFFE}');
        Protector {
            sentinel,
            regions: Vec::new(),
        }
    }

    /// Record a region and return the token standing in for it.
    pub fn protect(&mut self, kind: K, content: impl Into<String>) -> String {
        let index = self.regions.len();
        self.regions.push(Region {
            kind,
            content: content.into(),
        });
        format!("{s}{index}{s}", s = self.sentinel)
    }

    /// Record a region and append its token to `out` with the requested placement.
    pub fn splice(
        &mut self,
        out: &mut String,
        kind: K,
        content: impl Into<String>,
        placement: Placement,
    ) {
        let token = self.protect(kind, content);
        if placement == Placement::Block && !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&token);
        if placement == Placement::Block {
            out.push('\n');
        }
    }

    /// Whether `line` consists of a single token and nothing else.
    pub fn is_token_line(&self, line: &str) -> bool {
        let line = line.trim();
        let Some(inner) = line
            .strip_prefix(self.sentinel)
            .and_then(|rest| rest.strip_suffix(self.sentinel))
        else {
            return false;
        };
        !inner.is_empty() && inner.bytes().all(|b| b.is_ascii_digit())
    }

    /// Number of regions recorded so far.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Replace tokens in `text` with rendered content.
    ///
    /// `render` receives each region's kind and original content; returning `None` keeps that
    /// token in the output so a later layer can restore it.
    pub fn restore<F>(&self, text: &str, mut render: F) -> String
    where
        F: FnMut(&K, &str) -> Option<String>,
    {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(open) = rest.find(self.sentinel) {
            let after_open = &rest[open + self.sentinel.len_utf8()..];
            let digits = after_open
                .bytes()
                .take_while(|b| b.is_ascii_digit())
                .count();
            let closes = after_open[digits..].starts_with(self.sentinel);
            let region = after_open[..digits]
                .parse::<usize>()
                .ok()
                .filter(|_| closes)
                .and_then(|index| self.regions.get(index));

            let token_len = self.sentinel.len_utf8() * 2 + digits;
            match region.and_then(|r| render(&r.kind, &r.content)) {
                Some(rendered) => {
                    out.push_str(&rest[..open]);
                    out.push_str(&rendered);
                    rest = &rest[open + token_len..];
                }
                None if region.is_some() => {
                    out.push_str(&rest[..open + token_len]);
                    rest = &rest[open + token_len..];
                }
                None => {
                    let skip = open + self.sentinel.len_utf8();
                    out.push_str(&rest[..skip]);
                    rest = &rest[skip..];
                }
            }
        }
        out.push_str(rest);
        out
    }
}
