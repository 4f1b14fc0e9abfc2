//! Category Classifier
//!
//! Weighted keyword scoring over a plugin's name, description and source.

use once_cell::sync::Lazy;
use regex::Regex;

use super::builtin::{Category, CATEGORY_KEYWORDS};

/// Points for a keyword found inside the plugin name
pub const NAME_WEIGHT: u32 = 10;
/// Points for a keyword found as a whole word in the description
pub const DESCRIPTION_WEIGHT: u32 = 3;
/// Points for a keyword found in the head of the source
pub const SOURCE_WEIGHT: u32 = 1;
/// Only this many leading characters of the source are keyword-scanned
pub const SOURCE_SCAN_CHARS: usize = 2000;

const UI_SET_BONUS: u32 = 5;
const GPIO_BONUS: u32 = 2;

/// Returned when nothing scored.
pub const FALLBACK_CATEGORY: Category = Category::System;

static BUILTIN: Lazy<CategoryClassifier> = Lazy::new(CategoryClassifier::builtin);

/// Classify with the builtin keyword table
pub fn classify(name: &str, description: &str, source: &str) -> Category {
    BUILTIN.classify(name, description, source)
}

struct CompiledKeyword {
    keyword: &'static str,
    word: Regex,
}

struct CompiledCategory {
    category: Category,
    keywords: Vec<CompiledKeyword>,
}

/// Keyword scoring classifier
pub struct CategoryClassifier {
    categories: Vec<CompiledCategory>,
}

impl CategoryClassifier {
    /// Build from the builtin keyword table
    pub fn builtin() -> Self {
        let categories = CATEGORY_KEYWORDS
            .iter()
            .map(|entry| CompiledCategory {
                category: entry.category,
                keywords: entry
                    .keywords
                    .iter()
                    .filter_map(|&kw| {
                        Regex::new(&format!(r"\b{}\b", regex::escape(kw)))
                            .ok()
                            .map(|word| CompiledKeyword { keyword: kw, word })
                    })
                    .collect(),
            })
            .collect();

        Self { categories }
    }

    /// Per-category scores in table order
    pub fn scores(&self, name: &str, description: &str, source: &str) -> Vec<(Category, u32)> {
        let name = name.to_lowercase();
        let description = description.to_lowercase();
        let source = source.to_lowercase();
        let head: String = source.chars().take(SOURCE_SCAN_CHARS).collect();

        let mut scores: Vec<(Category, u32)> = self
            .categories
            .iter()
            .map(|cat| {
                let score = cat
                    .keywords
                    .iter()
                    .map(|kw| {
                        let mut points = 0;
                        if name.contains(kw.keyword) {
                            points += NAME_WEIGHT;
                        }
                        if kw.word.is_match(&description) {
                            points += DESCRIPTION_WEIGHT;
                        }
                        if head.contains(kw.keyword) {
                            points += SOURCE_WEIGHT;
                        }
                        points
                    })
                    .sum::<u32>();
                (cat.category, score)
            })
            .collect();

        if source.contains("ui.set") {
            add_bonus(&mut scores, Category::Display, UI_SET_BONUS);
        }
        if source.contains("gpio") {
            add_bonus(&mut scores, Category::Hardware, GPIO_BONUS);
        }

        scores
    }

    /// Highest strictly-greater score wins; ties keep the earlier category.
    pub fn classify(&self, name: &str, description: &str, source: &str) -> Category {
        let mut best: Option<(Category, u32)> = None;

        for (category, score) in self.scores(name, description, source) {
            if score == 0 {
                continue;
            }
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((category, score)),
            }
        }

        best.map(|(category, _)| category)
            .unwrap_or(FALLBACK_CATEGORY)
    }
}

impl Default for CategoryClassifier {
    fn default() -> Self {
        Self::builtin()
    }
}

fn add_bonus(scores: &mut [(Category, u32)], category: Category, points: u32) {
    if let Some(entry) = scores.iter_mut().find(|(c, _)| *c == category) {
        entry.1 += points;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score_of(scores: &[(Category, u32)], category: Category) -> u32 {
        scores
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, s)| *s)
            .unwrap_or_default()
    }

    #[test]
    fn test_name_match_dominates() {
        assert_eq!(classify("gps_tracker", "", ""), Category::Gps);
    }

    #[test]
    fn test_zero_score_falls_back_to_system() {
        assert_eq!(classify("zzz", "", ""), Category::System);
        assert_eq!(classify("qwerty", "does things", "x = 1"), Category::System);
    }

    #[test]
    fn test_general_is_never_returned() {
        for name in ["zzz", "discord", "gps", "oled", "deauth", "gpio", "backup"] {
            assert_ne!(classify(name, "", ""), Category::General);
        }
    }

    #[test]
    fn test_deterministic() {
        let a = classify("telegram", "Sends messages", "import requests\nui.set('x', 1)");
        let b = classify("telegram", "Sends messages", "import requests\nui.set('x', 1)");
        assert_eq!(a, b);
        assert_eq!(a, Category::Social);
    }

    #[test]
    fn test_description_requires_whole_word() {
        let classifier = CategoryClassifier::builtin();

        let whole = classifier.scores("zzz", "a discord notifier", "");
        assert_eq!(score_of(&whole, Category::Social), DESCRIPTION_WEIGHT);

        let partial = classifier.scores("zzz", "discordant notes", "");
        assert_eq!(score_of(&partial, Category::Social), 0);
    }

    #[test]
    fn test_source_scan_is_limited_to_head() {
        let classifier = CategoryClassifier::builtin();
        let padding = "x".repeat(SOURCE_SCAN_CHARS);

        let late = format!("{}\nimport telegram\n", padding);
        assert_eq!(score_of(&classifier.scores("zzz", "", &late), Category::Social), 0);

        let early = format!("import telegram\n{}", padding);
        assert_eq!(
            score_of(&classifier.scores("zzz", "", &early), Category::Social),
            SOURCE_WEIGHT
        );
    }

    #[test]
    fn test_bonus_rules_scan_whole_source() {
        let classifier = CategoryClassifier::builtin();
        let padding = "x".repeat(SOURCE_SCAN_CHARS);
        let source = format!("{}\nui.set('face', '(o_o)')\nGPIO.setup(4)\n", padding);

        let scores = classifier.scores("zzz", "", &source);
        assert_eq!(score_of(&scores, Category::Display), UI_SET_BONUS);
        assert_eq!(score_of(&scores, Category::Hardware), GPIO_BONUS);
        assert_eq!(classifier.classify("zzz", "", &source), Category::Display);
    }

    #[test]
    fn test_tie_goes_to_earlier_category() {
        // "telegram" (Social) and "oled" (Display) each earn one name match
        assert_eq!(classify("telegram_oled", "", ""), Category::Social);
        assert_eq!(classify("oled_telegram", "", ""), Category::Social);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify("Discord_Notify", "", ""), Category::Social);
    }
}
