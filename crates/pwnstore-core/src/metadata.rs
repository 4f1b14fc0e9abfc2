//! Plugin Metadata Extractor
//!
//! Pulls the declared `__version__`, `__author__` and `__description__`
//! constants out of raw plugin source text. Every field falls back to its
//! default on its own; extraction never fails.

use once_cell::sync::Lazy;
use regex::Regex;

pub const DEFAULT_VERSION: &str = "0.0.1";
pub const DEFAULT_AUTHOR: &str = "Unknown";
pub const DEFAULT_DESCRIPTION: &str = "No description provided.";

static VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"__version__\s*=\s*["'](.+?)["']"#).unwrap());

static AUTHOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"__author__\s*=\s*["'](.+?)["']"#).unwrap());

// group 1: single quoted literal, group 2: parenthesized fragments
static DESCRIPTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"__description__\s*=\s*(?:['"]([^'"]+)['"]|\(([^)]+)\))"#).unwrap()
});

static QUOTES_AND_BREAKS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"['"\n\r]"#).unwrap());

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Declared metadata of one plugin source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginMetadata {
    pub version: String,
    pub author: String,
    pub description: String,
}

impl Default for PluginMetadata {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            author: DEFAULT_AUTHOR.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
        }
    }
}

impl PluginMetadata {
    /// True when the author declared a version or a description.
    ///
    /// Files without either are not treated as publishable plugins.
    pub fn is_declared(&self) -> bool {
        self.version != DEFAULT_VERSION || self.description != DEFAULT_DESCRIPTION
    }
}

/// Extract all three fields
pub fn extract(source: &str) -> PluginMetadata {
    PluginMetadata {
        version: extract_version(source).unwrap_or_else(|| DEFAULT_VERSION.to_string()),
        author: extract_author(source).unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
        description: extract_description(source)
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
    }
}

/// Declared `__version__`, if any
pub fn extract_version(source: &str) -> Option<String> {
    VERSION_RE
        .captures(source)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Declared `__author__`, if any
pub fn extract_author(source: &str) -> Option<String> {
    AUTHOR_RE
        .captures(source)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Declared `__description__`, if any
pub fn extract_description(source: &str) -> Option<String> {
    let caps = DESCRIPTION_RE.captures(source)?;

    if let Some(single) = caps.get(1) {
        return Some(single.as_str().to_string());
    }

    let grouped = caps.get(2)?.as_str();
    let stripped = QUOTES_AND_BREAKS_RE.replace_all(grouped, "");
    let collapsed = WHITESPACE_RE.replace_all(&stripped, " ");
    Some(collapsed.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_nothing_declared() {
        let meta = extract("import os\n\nclass Foo:\n    pass\n");
        assert_eq!(meta.version, "0.0.1");
        assert_eq!(meta.author, "Unknown");
        assert_eq!(meta.description, "No description provided.");
        assert!(!meta.is_declared());
    }

    #[test]
    fn test_single_line_fields() {
        let source = r#"
__author__ = 'evilsocket'
__version__ = "1.2.3"
__description__ = 'Shows the weather on screen.'
"#;
        let meta = extract(source);
        assert_eq!(meta.version, "1.2.3");
        assert_eq!(meta.author, "evilsocket");
        assert_eq!(meta.description, "Shows the weather on screen.");
        assert!(meta.is_declared());
    }

    #[test]
    fn test_fields_are_independent() {
        let meta = extract("__author__ = 'someone'\n");
        assert_eq!(meta.author, "someone");
        assert_eq!(meta.version, DEFAULT_VERSION);
        assert_eq!(meta.description, DEFAULT_DESCRIPTION);
    }

    #[test]
    fn test_grouped_description_is_joined_and_collapsed() {
        let source = "__description__ = (\n    \"Uploads handshakes \"\n    'to   a remote'\n    \" server.\"\n)\n";
        let meta = extract(source);
        assert_eq!(meta.description, "Uploads handshakes to a remote server.");
    }

    #[test]
    fn test_version_must_be_single_line() {
        // The opening quote has no closing quote on the same line
        let meta = extract("__version__ = '1.0\n'\n");
        assert_eq!(meta.version, DEFAULT_VERSION);
    }

    #[test]
    fn test_version_only_is_declared() {
        let meta = extract("__version__ = '2.0.0'\n");
        assert!(meta.is_declared());
    }
}
