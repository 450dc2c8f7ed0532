//! Error types for format operations

use thiserror::Error;

/// Errors surfaced by the [`Format`](crate::format::Format) and
/// [`FormatRegistry`](crate::registry::FormatRegistry) layer.
///
/// The converters themselves are total; these only appear when a caller asks
/// for a format that does not exist, a direction it does not implement, or
/// hands the tree decoder something that is not JSON.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    #[error("Format '{0}' not found")]
    FormatNotFound(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Operation not supported: {0}")]
    NotSupported(String),
}

impl From<serde_json::Error> for FormatError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            FormatError::ParseError(err.to_string())
        } else {
            FormatError::SerializationError(err.to_string())
        }
    }
}
