//! Wiki markup format (self-hosted tracker)
//!
//!     Canonical ↔ wiki mapping:
//!
//!         | Canonical               | Wiki                         |
//!         |-------------------------|------------------------------|
//!         | `# Title` / setext      | `h1. Title`                  |
//!         | `**bold**`              | `*bold*`                     |
//!         | `*italic*` / `_italic_` | `_italic_`                   |
//!         | `` `code` ``            | `{{code}}`                   |
//!         | `~~strike~~`            | `-strike-`                   |
//!         | `[text](url)`           | `[text|url]`                 |
//!         | `![alt](src)`           | `!src|alt=alt!`              |
//!         | fenced code             | `{code:lang}...{code}`       |
//!         | `> quote`               | `bq. quote` / `{quote}`      |
//!         | `- a` / `1. a`          | `* a` / `# a`                |
//!         | pipe table              | `||h||h||` / `|c|c|`         |
//!         | `---`                   | `----`                       |
//!         | `<cite>`, `<ins>`, ...  | `??x??`, `+x+`, `^x^`, `~x~` |
//!
//!     Decoding additionally understands `{noformat}`, `{panel}`, `{color}`, account mentions
//!     (`[~accountid:ID]` → `User:ID`) and smart links, whose labels are rebuilt from the URL when
//!     it points back at the configured site.
//!
//!     Code bodies are never transformed in either direction.

pub mod decoder;
pub mod encoder;

pub use decoder::decode;
pub use encoder::encode;

use crate::error::FormatError;
use crate::format::{parse_flag, reject_unknown, Format};
use std::collections::HashMap;

/// Settings shared by the wiki encoder and decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiOptions {
    /// When false, both directions return their input unchanged.
    pub translate: bool,
    /// Site the smart links are resolved against. Empty means every link is same-site.
    pub base_url: String,
}

impl Default for WikiOptions {
    fn default() -> Self {
        WikiOptions {
            translate: true,
            base_url: String::new(),
        }
    }
}

/// Format implementation for wiki markup.
#[derive(Debug, Default, Clone)]
pub struct WikiFormat {
    pub options: WikiOptions,
}

impl WikiFormat {
    pub fn new(options: WikiOptions) -> Self {
        WikiFormat { options }
    }

    fn options_with(&self, overrides: &HashMap<String, String>) -> Result<WikiOptions, FormatError> {
        reject_unknown(self.name(), overrides, &["translate", "base_url"])?;
        let mut options = self.options.clone();
        if let Some(translate) = parse_flag(overrides, "translate")? {
            options.translate = translate;
        }
        if let Some(base_url) = overrides.get("base_url") {
            options.base_url = base_url.clone();
        }
        Ok(options)
    }
}

impl Format for WikiFormat {
    fn name(&self) -> &str {
        "wiki"
    }

    fn description(&self) -> &str {
        "Wiki markup used by the self-hosted tracker"
    }

    fn supports_encoding(&self) -> bool {
        true
    }

    fn supports_decoding(&self) -> bool {
        true
    }

    fn encode(&self, source: &str) -> Result<String, FormatError> {
        Ok(encode(source, &self.options))
    }

    fn decode(&self, source: &str) -> Result<String, FormatError> {
        Ok(decode(source, &self.options))
    }

    fn encode_with_options(
        &self,
        source: &str,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        Ok(encode(source, &self.options_with(options)?))
    }
}
