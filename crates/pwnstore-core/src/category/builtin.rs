//! Builtin Category Definitions
//!
//! The fixed category set and the keyword vocabulary used to score plugins.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category label attached to every registry record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "GPS")]
    Gps,
    Social,
    Display,
    Attack,
    Hardware,
    System,
    /// Only produced by registries built with the older single-signal scan.
    /// The weighted classifier never returns it.
    General,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gps => "GPS",
            Self::Social => "Social",
            Self::Display => "Display",
            Self::Attack => "Attack",
            Self::Hardware => "Hardware",
            Self::System => "System",
            Self::General => "General",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword vocabulary of one category
#[derive(Debug, Clone)]
pub struct CategoryKeywords {
    pub category: Category,
    pub keywords: &'static [&'static str],
}

/// Scoring table. Order matters: on an exact score tie the earlier entry wins.
pub const CATEGORY_KEYWORDS: &[CategoryKeywords] = &[
    CategoryKeywords {
        category: Category::Gps,
        keywords: &[
            "gps",
            "gpsd",
            "nmea",
            "geo",
            "geofence",
            "location",
            "coordinates",
            "latitude",
            "longitude",
            "map",
        ],
    },
    CategoryKeywords {
        category: Category::Social,
        keywords: &[
            "discord", "telegram", "twitter", "mastodon", "webhook", "slack", "pushover",
            "ntfy", "bot", "chat", "social",
        ],
    },
    CategoryKeywords {
        category: Category::Display,
        keywords: &[
            "display", "screen", "canvas", "font", "faces", "render", "layout", "view", "oled",
        ],
    },
    CategoryKeywords {
        category: Category::Attack,
        keywords: &[
            "handshake",
            "deauth",
            "assoc",
            "crack",
            "brute",
            "pmkid",
            "pcap",
            "wardriving",
            "eapol",
            "pwn",
            "attack",
        ],
    },
    CategoryKeywords {
        category: Category::Hardware,
        keywords: &[
            "gpio",
            "i2c",
            "spi",
            "papirus",
            "waveshare",
            "inky",
            "bluetooth",
            "pisugar",
            "ups",
            "batt",
            "button",
            "led",
        ],
    },
    CategoryKeywords {
        category: Category::System,
        keywords: &[
            "backup",
            "log",
            "ssh",
            "clean",
            "sys",
            "cpu_load",
            "mem_usage",
            "temperature",
            "shutdown",
            "reboot",
            "internet",
            "hotspot",
            "wlan0",
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_covers_every_scored_category_once() {
        let cats: Vec<Category> = CATEGORY_KEYWORDS.iter().map(|c| c.category).collect();
        assert_eq!(
            cats,
            vec![
                Category::Gps,
                Category::Social,
                Category::Display,
                Category::Attack,
                Category::Hardware,
                Category::System,
            ]
        );
    }

    #[test]
    fn test_keywords_are_lowercase() {
        for entry in CATEGORY_KEYWORDS {
            for kw in entry.keywords {
                assert_eq!(*kw, kw.to_lowercase());
            }
        }
    }

    #[test]
    fn test_category_serde_labels() {
        assert_eq!(serde_json::to_string(&Category::Gps).unwrap(), "\"GPS\"");
        let cat: Category = serde_json::from_str("\"General\"").unwrap();
        assert_eq!(cat, Category::General);
    }
}
