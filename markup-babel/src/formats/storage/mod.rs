//! XHTML storage format (wiki product)
//!
//!     Encoding renders canonical text as storage XHTML. Decoding parses storage markup into a
//!     DOM, rewrites user and image macros, and returns both the processed markup and its
//!     canonical text as a [`StorageDocument`].
//!
//!     Decoding needs page context that plain text can't carry (site root, page id, attachment
//!     list, a way to resolve users). [`StorageContext`] bundles it; the [`Format`] impl decodes
//!     with only the configured base URL.

pub mod decoder;
pub mod dom;
pub mod encoder;
pub mod macros;

pub use decoder::StorageDocument;
pub use macros::{Attachment, LookupFn, StorageContext, UserLookup, UserRef};

use crate::error::FormatError;
use crate::format::{parse_flag, reject_unknown, Format};
use std::collections::HashMap;

/// Storage encoder settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageOptions {
    /// Give headings slug `id`s. Off by default: the wiki builds its own anchors.
    pub heading_anchors: bool,
}

/// Format implementation for storage markup.
#[derive(Debug, Clone, Default)]
pub struct StorageFormat {
    pub options: StorageOptions,
    /// Site root used when decoding through the [`Format`] interface.
    pub base_url: String,
}

impl StorageFormat {
    pub fn new(options: StorageOptions, base_url: impl Into<String>) -> Self {
        StorageFormat {
            options,
            base_url: base_url.into(),
        }
    }

    /// Convert canonical text to storage markup.
    pub fn encode_with(markdown: &str, options: &StorageOptions) -> String {
        encoder::encode(markdown, options)
    }

    /// Decode storage markup with page context.
    pub fn decode_with(html: &str, context: &StorageContext<'_>) -> StorageDocument {
        decoder::decode(html, context)
    }
}

impl Format for StorageFormat {
    fn name(&self) -> &str {
        "storage"
    }

    fn description(&self) -> &str {
        "XHTML storage format used by the wiki product"
    }

    fn supports_encoding(&self) -> bool {
        true
    }

    fn supports_decoding(&self) -> bool {
        true
    }

    fn encode(&self, source: &str) -> Result<String, FormatError> {
        Ok(Self::encode_with(source, &self.options))
    }

    fn decode(&self, source: &str) -> Result<String, FormatError> {
        let context = StorageContext::new(self.base_url.clone());
        Ok(Self::decode_with(source, &context).markdown)
    }

    fn encode_with_options(
        &self,
        source: &str,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        reject_unknown(self.name(), options, &["heading_anchors"])?;
        let mut settings = self.options.clone();
        if let Some(anchors) = parse_flag(options, "heading_anchors")? {
            settings.heading_anchors = anchors;
        }
        Ok(Self::encode_with(source, &settings))
    }
}
