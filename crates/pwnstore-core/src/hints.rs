//! Config Hints
//!
//! Finds the option keys an installed plugin reads from its own
//! `self.options`, so the user can be told what to add to config.toml.
//! Advisory only.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

/// Option names the host manages itself
pub const RESERVED_OPTIONS: &[&str] = &["enabled"];

// `(?:^|[^\w.])` keeps `response.self.options[...]`-like chains and
// `myself.options[...]` from matching
static SUBSCRIPT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:^|[^\w.])self\.options\[\s*['"]([^'"]+)['"]\s*\]"#).unwrap()
});

static GET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:^|[^\w.])self\.options\.get\(\s*['"]([^'"]+)['"]"#).unwrap()
});

/// Option keys referenced by `source`, sorted and deduplicated
pub fn scan_option_keys(source: &str) -> Vec<String> {
    let mut keys = BTreeSet::new();

    for re in [&*SUBSCRIPT_RE, &*GET_RE] {
        for caps in re.captures_iter(source) {
            if let Some(key) = caps.get(1) {
                let key = key.as_str();
                if !RESERVED_OPTIONS.contains(&key) {
                    keys.insert(key.to_string());
                }
            }
        }
    }

    keys.into_iter().collect()
}

/// Suggested config lines for the keys of `plugin_name`
pub fn suggested_lines(plugin_name: &str, keys: &[String]) -> Vec<String> {
    keys.iter()
        .map(|k| format!("main.plugins.{}.{} = \"...\"", plugin_name, k))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_subscript_and_get() {
        let source = r#"
class Weather(plugins.Plugin):
    def on_loaded(self):
        key = self.options['api_key']
        city = self.options["city"]
        units = self.options.get('units', 'metric')
        again = self.options['api_key']
"#;
        assert_eq!(scan_option_keys(source), vec!["api_key", "city", "units"]);
    }

    #[test]
    fn test_ignores_other_receivers() {
        let source = r#"
r = requests.get(url)
x = response.options['timeout']
y = api.options["token"]
z = myself.options['nope']
"#;
        assert!(scan_option_keys(source).is_empty());
    }

    #[test]
    fn test_reserved_names_skipped() {
        let source = "if self.options['enabled']:\n    self.options['interval']\n";
        assert_eq!(scan_option_keys(source), vec!["interval"]);
    }

    #[test]
    fn test_suggested_lines() {
        let lines = suggested_lines("weather", &["api_key".to_string()]);
        assert_eq!(lines, vec!["main.plugins.weather.api_key = \"...\""]);
    }
}
