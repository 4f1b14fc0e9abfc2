//! # Category Module
//!
//! Assigns one category label to a plugin for registry browsing.
//!
//! Each keyword of each category is checked against three signals:
//!
//! - **name**: substring of the lower-cased plugin name, 10 points
//! - **description**: whole word in the lower-cased description, 3 points
//! - **source**: substring of the first 2000 characters of the source, 1 point
//!
//! After the keyword pass `ui.set` in the source adds 5 to Display and
//! `gpio` adds 2 to Hardware. The strictly highest score wins and ties keep
//! the category listed first in [`CATEGORY_KEYWORDS`].
//!
//! When nothing scores the result is [`Category::System`]. [`Category::General`]
//! exists only so registries produced by the older single-signal scan still
//! deserialize; this classifier never produces it.
//!
//! ```rust
//! use pwnstore_core::category::{classify, Category};
//!
//! assert_eq!(classify("gps_tracker", "", ""), Category::Gps);
//! assert_eq!(classify("zzz", "", ""), Category::System);
//! ```

mod builtin;
mod classifier;

// Re-exports
pub use builtin::{Category, CategoryKeywords, CATEGORY_KEYWORDS};
pub use classifier::{
    classify, CategoryClassifier, DESCRIPTION_WEIGHT, FALLBACK_CATEGORY, NAME_WEIGHT,
    SOURCE_SCAN_CHARS, SOURCE_WEIGHT,
};
