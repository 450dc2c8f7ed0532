//! Format trait definition
//!
//! Every backend representation implements [`Format`]. Encoding turns canonical text into the
//! backend form; decoding turns the backend form back into canonical (or plain) text. Formats
//! may support one direction or both.

use crate::error::FormatError;
use std::collections::HashMap;

/// A backend markup representation.
///
/// # Examples
///
/// ```ignore
/// struct Shout;
///
/// impl Format for Shout {
///     fn name(&self) -> &str {
///         "shout"
///     }
///
///     fn supports_encoding(&self) -> bool {
///         true
///     }
///
///     fn encode(&self, source: &str) -> Result<String, FormatError> {
///         Ok(source.to_uppercase())
///     }
/// }
/// ```
pub trait Format: Send + Sync {
    /// Registry key (e.g. "adf", "wiki", "storage")
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// Whether canonical text can be encoded into this format
    fn supports_encoding(&self) -> bool {
        false
    }

    /// Whether this format can be decoded back into canonical text
    fn supports_decoding(&self) -> bool {
        false
    }

    /// Encode canonical text into this format.
    fn encode(&self, _source: &str) -> Result<String, FormatError> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' does not support encoding",
            self.name()
        )))
    }

    /// Decode this format into canonical text.
    fn decode(&self, _source: &str) -> Result<String, FormatError> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' does not support decoding",
            self.name()
        )))
    }

    /// Encode with string-keyed options.
    ///
    /// The default accepts no options; formats with knobs override this and parse the keys
    /// they understand.
    fn encode_with_options(
        &self,
        source: &str,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        if options.is_empty() {
            self.encode(source)
        } else {
            Err(FormatError::NotSupported(format!(
                "Format '{}' does not support extra parameters",
                self.name()
            )))
        }
    }
}

/// Parse a boolean option value, accepting the usual spellings.
pub(crate) fn parse_flag(
    options: &HashMap<String, String>,
    key: &str,
) -> Result<Option<bool>, FormatError> {
    let Some(value) = options.get(key) else {
        return Ok(None);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(Some(true)),
        "false" | "0" | "no" | "off" => Ok(Some(false)),
        other => Err(FormatError::SerializationError(format!(
            "Invalid value '{other}' for option '{key}'"
        ))),
    }
}

/// Reject option keys a format does not understand.
pub(crate) fn reject_unknown(
    format: &str,
    options: &HashMap<String, String>,
    known: &[&str],
) -> Result<(), FormatError> {
    match options.keys().find(|key| !known.contains(&key.as_str())) {
        Some(key) => Err(FormatError::NotSupported(format!(
            "Format '{format}' does not support option '{key}'"
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EncodeOnly;

    impl Format for EncodeOnly {
        fn name(&self) -> &str {
            "encode-only"
        }
        fn supports_encoding(&self) -> bool {
            true
        }
        fn encode(&self, source: &str) -> Result<String, FormatError> {
            Ok(source.to_uppercase())
        }
    }

    #[test]
    fn test_default_decode_is_not_supported() {
        let err = EncodeOnly.decode("x").unwrap_err();
        assert!(matches!(err, FormatError::NotSupported(_)));
    }

    #[test]
    fn test_default_options_delegate_when_empty() {
        assert_eq!(
            EncodeOnly.encode_with_options("a", &HashMap::new()).unwrap(),
            "A"
        );
        let mut options = HashMap::new();
        options.insert("k".to_string(), "v".to_string());
        assert!(EncodeOnly.encode_with_options("a", &options).is_err());
    }

    #[test]
    fn test_parse_flag() {
        let mut options = HashMap::new();
        assert_eq!(parse_flag(&options, "x"), Ok(None));
        options.insert("x".to_string(), "Yes".to_string());
        assert_eq!(parse_flag(&options, "x"), Ok(Some(true)));
        options.insert("x".to_string(), "maybe".to_string());
        assert!(parse_flag(&options, "x").is_err());
    }
}
