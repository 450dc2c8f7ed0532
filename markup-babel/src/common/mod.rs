//! Conversion machinery shared by several formats
//!
//!     The formats in this crate are hand-written scanners rather than full grammars, so the
//!     pieces they have in common live here and are tested in isolation:
//!
//!     - [`inline`]: leftmost-first span tokenizer and the canonical/wiki rule sets
//!     - [`citation`]: bounded `??text??` scanner
//!     - [`protect`]: placeholder-based protection of code and block regions
//!     - [`languages`]: code-fence language aliasing for the wiki dialect
//!     - [`table`]: pipe-table row parsing
//!     - [`links`]: smart-link rewriting and attachment URLs

pub mod citation;
pub mod inline;
pub mod languages;
pub mod links;
pub mod protect;
pub mod table;
