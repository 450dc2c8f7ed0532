//! Markup conversion between canonical text and tracker/wiki backends
//!
//!     Canonical text is the Markdown-like form callers read and write. Each backend speaks its
//!     own dialect, and this crate converts both ways:
//!
//!         - adf: rich document JSON tree (cloud tracker). Encoder plus plain-text extractor.
//!         - wiki: wiki markup (self-hosted tracker). Encoder and decoder.
//!         - storage: XHTML storage format (wiki product). Encoder and decoder, with user and
//!           image macro rewriting.
//!
//!     Every conversion is total: malformed or unexpected input degrades to literal text or a
//!     visible marker, never a panic. Results only appear at the registry and trait layer.
//!
//!     This is a pure lib: no I/O, no network, no environment reads. Callers fetch and send
//!     content; settings come in through the option structs (see the markup-config crate for
//!     loading them from files).
//!
//! Architecture
//!
//!     .
//!     ├── error.rs                # FormatError
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry and product variant selection
//!     ├── common                  # Shared machinery
//!     │   ├── inline.rs           # Span tokenizer and rule tables for both dialects
//!     │   ├── citation.rs         # Linear `??cite??` scanner
//!     │   ├── protect.rs          # Protect/restore of verbatim regions
//!     │   ├── languages.rs        # Code language aliases
//!     │   ├── links.rs            # Smart links and attachment URLs
//!     │   └── table.rs            # Pipe-table rows
//!     └── formats
//!         ├── adf                 # nodes.rs, encoder.rs, extract.rs
//!         ├── wiki                # encoder.rs, decoder.rs
//!         └── storage             # encoder.rs, decoder.rs, macros.rs, dom.rs
//!
//! Testing
//!
//!     tests
//!     └── <format>
//!         └── <testname>.rs
//!
//!     Note that rust does not by default discover tests in subdirectories, so these are
//!     included from tests/lib.rs.
//!
//! Library Choices
//!
//!     Canonical text going to storage is parsed with comrak; storage markup is parsed with
//!     html5ever into an RcDom. The line-oriented dialects (wiki, the tree encoder) are small
//!     enough that a shared span tokenizer over the regex crate does the job.
//!
pub mod common;
pub mod error;
pub mod format;
pub mod formats;
pub mod registry;

pub use error::FormatError;
pub use format::Format;
pub use formats::{AdfFormat, StorageFormat, StorageOptions, WikiFormat, WikiOptions};
pub use formats::storage::{
    Attachment, LookupFn, StorageContext, StorageDocument, UserLookup, UserRef,
};
pub use registry::{FormatRegistry, ProductVariant};

/// Canonical text → rich document tree.
pub fn markdown_to_adf(markdown: &str) -> formats::adf::Document {
    formats::adf::encode(markdown)
}

/// Plain text of a rich document tree given as JSON.
pub fn adf_to_text(value: &serde_json::Value) -> Option<String> {
    formats::adf::extract_text(value)
}

/// Canonical text → wiki markup.
pub fn markdown_to_wiki(markdown: &str, options: &WikiOptions) -> String {
    formats::wiki::encode(markdown, options)
}

/// Wiki markup → canonical text.
pub fn wiki_to_markdown(wiki: &str, options: &WikiOptions) -> String {
    formats::wiki::decode(wiki, options)
}

/// Canonical text → storage markup.
pub fn markdown_to_storage(markdown: &str, options: &StorageOptions) -> String {
    StorageFormat::encode_with(markdown, options)
}

/// Storage markup → processed markup and canonical text.
pub fn storage_to_markdown(html: &str, context: &StorageContext<'_>) -> StorageDocument {
    StorageFormat::decode_with(html, context)
}
