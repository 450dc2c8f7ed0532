//! Code-fence language aliasing
//!
//! The wiki dialect only highlights a fixed set of languages. Fence languages from canonical
//! text are lowercased and either passed through (when supported), mapped to the closest
//! supported language, or dropped so the block renders as a plain `{code}`.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Languages the wiki dialect highlights natively.
static SUPPORTED: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "actionscript", "ada", "applescript", "bash", "c", "c#", "c++", "cpp", "css", "erlang",
        "go", "groovy", "haskell", "html", "java", "javascript", "js", "json", "lua", "none",
        "nyan", "objc", "perl", "php", "python", "r", "rainbow", "ruby", "scala", "sh", "sql",
        "swift", "visualbasic", "xml", "yaml",
    ]
    .into_iter()
    .collect()
});

/// Unsupported languages with a close-enough supported relative.
static ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("dockerfile", "bash"),
        ("docker", "bash"),
        ("makefile", "bash"),
        ("make", "bash"),
        ("shell", "bash"),
        ("zsh", "bash"),
        ("console", "bash"),
        ("typescript", "javascript"),
        ("ts", "javascript"),
        ("tsx", "javascript"),
        ("jsx", "javascript"),
        ("kotlin", "java"),
        ("kt", "java"),
        ("csharp", "c#"),
        ("cs", "c#"),
        ("py", "python"),
        ("rb", "ruby"),
        ("yml", "yaml"),
        ("objective-c", "objc"),
        ("vb", "visualbasic"),
    ]
    .into_iter()
    .collect()
});

/// Map a fence language onto the wiki dialect's highlighting set.
///
/// Returns `None` for empty or unmappable languages.
pub fn wiki_language(language: Option<&str>) -> Option<&'static str> {
    let language = language?.trim().to_lowercase();
    if language.is_empty() {
        return None;
    }
    if let Some(supported) = SUPPORTED.get(language.as_str()).copied() {
        return Some(supported);
    }
    ALIASES.get(language.as_str()).copied()
}
