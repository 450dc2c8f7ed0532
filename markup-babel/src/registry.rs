//! Format registry for format discovery and selection
//!
//! Formats are registered under their name. Callers that only know which product variant they
//! talk to go through [`FormatRegistry::for_variant`].

use crate::error::FormatError;
use crate::format::Format;
use std::collections::HashMap;
use strum::{Display, EnumString};

/// Backend product variants and the markup each one speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ProductVariant {
    /// Cloud-hosted tracker: rich document JSON trees.
    Cloud,
    /// Self-hosted tracker: wiki markup.
    #[strum(to_string = "server", serialize = "datacenter")]
    Server,
    /// Wiki product: XHTML storage format.
    Wiki,
}

impl ProductVariant {
    /// Name of the format this variant expects.
    pub fn format_name(self) -> &'static str {
        match self {
            ProductVariant::Cloud => "adf",
            ProductVariant::Server => "wiki",
            ProductVariant::Wiki => "storage",
        }
    }
}

/// Registry of markup formats
///
/// # Examples
///
/// ```ignore
/// let registry = FormatRegistry::default();
/// let wiki = registry.encode("**bold**", "wiki")?;
/// let tree = registry.for_variant(ProductVariant::Cloud)?.encode("# Title")?;
/// ```
pub struct FormatRegistry {
    formats: HashMap<String, Box<dyn Format>>,
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        FormatRegistry {
            formats: HashMap::new(),
        }
    }

    /// Register a format, replacing any format with the same name.
    pub fn register<F: Format + 'static>(&mut self, format: F) {
        self.formats
            .insert(format.name().to_string(), Box::new(format));
    }

    pub fn get(&self, name: &str) -> Result<&dyn Format, FormatError> {
        self.formats
            .get(name)
            .map(|f| f.as_ref())
            .ok_or_else(|| FormatError::FormatNotFound(name.to_string()))
    }

    pub fn has(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// All registered format names, sorted.
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formats.keys().cloned().collect();
        names.sort();
        names
    }

    /// The format a product variant expects.
    pub fn for_variant(&self, variant: ProductVariant) -> Result<&dyn Format, FormatError> {
        self.get(variant.format_name())
    }

    /// Encode canonical text with the named format.
    pub fn encode(&self, source: &str, format: &str) -> Result<String, FormatError> {
        self.encode_with_options(source, format, &HashMap::new())
    }

    /// Encode canonical text with the named format and options.
    pub fn encode_with_options(
        &self,
        source: &str,
        format: &str,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        let fmt = self.get(format)?;
        if !fmt.supports_encoding() {
            return Err(FormatError::NotSupported(format!(
                "Format '{format}' does not support encoding"
            )));
        }
        fmt.encode_with_options(source, options)
    }

    /// Decode the named format back into canonical text.
    pub fn decode(&self, source: &str, format: &str) -> Result<String, FormatError> {
        let fmt = self.get(format)?;
        if !fmt.supports_decoding() {
            return Err(FormatError::NotSupported(format!(
                "Format '{format}' does not support decoding"
            )));
        }
        fmt.decode(source)
    }

    /// Create a registry with the built-in formats
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(crate::formats::adf::AdfFormat);
        registry.register(crate::formats::wiki::WikiFormat::default());
        registry.register(crate::formats::storage::StorageFormat::default());
        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
