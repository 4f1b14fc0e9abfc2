//! Registry type definitions
//!
//! Records as published in the registry JSON array.

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::metadata::{DEFAULT_AUTHOR, DEFAULT_DESCRIPTION, DEFAULT_VERSION};

/// Where a plugin's payload lives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginType {
    /// The download URL is the plugin file itself
    #[default]
    Single,
    /// The download URL is a zip archive; the plugin is one entry inside it
    #[serde(rename = "zip")]
    Archive,
}

impl std::fmt::Display for OriginType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::Archive => write!(f, "zip"),
        }
    }
}

/// Plugin entry in plugins.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginRecord {
    /// Plugin name (source filename without extension)
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default = "default_author")]
    pub author: String,
    pub category: Category,
    #[serde(default)]
    pub origin_type: OriginType,
    pub download_url: String,
    /// Entry path inside the archive (zip origin only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_inside_zip: Option<String>,
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

fn default_description() -> String {
    DEFAULT_DESCRIPTION.to_string()
}

fn default_author() -> String {
    DEFAULT_AUTHOR.to_string()
}

impl PluginRecord {
    pub fn is_archive(&self) -> bool {
        self.origin_type == OriginType::Archive
    }

    /// Check if this record matches a search query (already lower-cased)
    pub fn matches_query(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(query)
            || self.description.to_lowercase().contains(query)
            || self.category.as_str().to_lowercase().contains(query)
            || self.author.to_lowercase().contains(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_record() {
        let json = r#"{
            "name": "weather",
            "version": "1.0.0",
            "description": "Shows the weather",
            "author": "someone",
            "category": "Display",
            "origin_type": "single",
            "download_url": "https://example.com/weather.py",
            "path_inside_zip": null
        }"#;

        let record: PluginRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.name, "weather");
        assert_eq!(record.origin_type, OriginType::Single);
        assert!(record.path_inside_zip.is_none());
        assert!(!record.is_archive());
    }

    #[test]
    fn test_parse_zip_record() {
        let json = r#"{
            "name": "gps_more",
            "version": "2.1",
            "description": "More GPS",
            "author": "someone",
            "category": "GPS",
            "origin_type": "zip",
            "download_url": "https://example.com/repo.zip",
            "path_inside_zip": "repo-main/gps_more.py"
        }"#;

        let record: PluginRecord = serde_json::from_str(json).unwrap();
        assert!(record.is_archive());
        assert_eq!(record.category, Category::Gps);
        assert_eq!(
            record.path_inside_zip.as_deref(),
            Some("repo-main/gps_more.py")
        );
    }

    #[test]
    fn test_single_record_omits_zip_path() {
        let record = PluginRecord {
            name: "weather".to_string(),
            version: "1.0".to_string(),
            description: "d".to_string(),
            author: "a".to_string(),
            category: Category::System,
            origin_type: OriginType::Single,
            download_url: "https://example.com/weather.py".to_string(),
            path_inside_zip: None,
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"origin_type\":\"single\""));
        assert!(!json.contains("path_inside_zip"));
    }

    #[test]
    fn test_matches_query() {
        let record: PluginRecord = serde_json::from_str(
            r#"{"name": "discord", "description": "Posts to a channel", "author": "Jane",
                "category": "Social", "download_url": "https://example.com/discord.py"}"#,
        )
        .unwrap();

        assert!(record.matches_query("disc"));
        assert!(record.matches_query("channel"));
        assert!(record.matches_query("social"));
        assert!(record.matches_query("jane"));
        assert!(!record.matches_query("gps"));
    }
}
