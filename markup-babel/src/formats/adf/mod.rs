//! Rich document tree format (cloud tracker)
//!
//!     Encoding turns canonical text into a `{version: 1, type: "doc", content: [...]}` tree;
//!     decoding extracts plain text from any tree, typed or not.
//!
//!     Canonical → tree mapping:
//!
//!         | Canonical             | Tree                                   |
//!         |-----------------------|----------------------------------------|
//!         | `# Title`             | heading {level}                        |
//!         | paragraph line        | paragraph                              |
//!         | `- item` / `1. item`  | bulletList / orderedList → listItem    |
//!         | `> quote`             | blockquote → paragraph                 |
//!         | fenced code           | codeBlock {language?}                  |
//!         | `---`                 | rule                                   |
//!         | pipe table            | table → tableRow → tableHeader/Cell    |
//!         | `**x**`, `*x*`        | text + strong / em marks               |
//!         | `` `x` ``, `~~x~~`    | text + code / strike marks             |
//!         | `[t](u)`, `![a](u)`   | text + link mark                       |
//!
//!     The extractor is total: it accepts `null`, strings, arrays and nodes of unknown type, and
//!     returns `None` where there is nothing to show.

pub mod encoder;
pub mod extract;
pub mod nodes;

pub use encoder::{encode, encode_optional};
pub use extract::extract_text;
pub use nodes::{Document, Mark, Node, NodeType};

use crate::error::FormatError;
use crate::format::Format;

/// Format implementation for rich document trees.
///
/// `encode` returns the tree serialised as JSON; `decode` parses JSON and extracts plain text.
#[derive(Debug, Default, Clone, Copy)]
pub struct AdfFormat;

impl Format for AdfFormat {
    fn name(&self) -> &str {
        "adf"
    }

    fn description(&self) -> &str {
        "Rich document JSON tree used by the cloud tracker"
    }

    fn supports_encoding(&self) -> bool {
        true
    }

    fn supports_decoding(&self) -> bool {
        true
    }

    fn encode(&self, source: &str) -> Result<String, FormatError> {
        Ok(serde_json::to_string(&encode(source))?)
    }

    fn decode(&self, source: &str) -> Result<String, FormatError> {
        let value: serde_json::Value = serde_json::from_str(source)?;
        Ok(extract_text(&value).unwrap_or_default())
    }
}

impl Document {
    /// Plain text of the whole document.
    pub fn plain_text(&self) -> Option<String> {
        extract_text(&self.to_value())
    }
}

impl Node {
    /// Plain text of this node and its children.
    pub fn plain_text(&self) -> Option<String> {
        serde_json::to_value(self)
            .ok()
            .and_then(|value| extract_text(&value))
    }
}
