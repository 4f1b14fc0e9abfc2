//! Host Config Patcher
//!
//! Line-oriented edits of the pwnagotchi `config.toml`. The file is never
//! parsed as a whole; only lines whose key matches exactly are touched, so
//! comments, ordering and unrelated formatting survive.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{PwnStoreError, Result};

/// `main.plugins.<name>.enabled`
pub fn enabled_key(plugin_name: &str) -> String {
    format!("main.plugins.{}.enabled", plugin_name)
}

/// Split a `key = value` line into trimmed key and value
fn split_assignment(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    Some((key.trim(), value.trim()))
}

fn line_has_key(line: &str, key: &str) -> bool {
    matches!(split_assignment(line), Some((k, _)) if k == key)
}

/// Set a plugin's enabled flag.
///
/// Existing lines for the key are rewritten in place. A missing key is
/// appended only when enabling; disabling an unknown plugin returns the
/// text unchanged. A commented-out entry is not uncommented: it stays as
/// is and the live line is appended after it.
pub fn set_enabled(text: &str, plugin_name: &str, enabled: bool) -> String {
    let key = enabled_key(plugin_name);
    let replacement = format!("{} = {}", key, enabled);

    let mut out = String::with_capacity(text.len() + replacement.len() + 1);
    let mut found = false;

    for line in text.split_inclusive('\n') {
        let (body, ending) = split_line_ending(line);
        if line_has_key(body, &key) {
            found = true;
            out.push_str(&replacement);
            out.push_str(ending);
        } else {
            out.push_str(line);
        }
    }

    if !found && enabled {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&replacement);
        out.push('\n');
    }

    out
}

fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

/// Current enabled flag, `None` when there is no line or the value is not a boolean
pub fn is_enabled(text: &str, plugin_name: &str) -> Option<bool> {
    let key = enabled_key(plugin_name);
    text.lines()
        .filter_map(split_assignment)
        .filter(|(k, _)| *k == key)
        .filter_map(|(_, v)| match v {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        })
        .last()
}

/// Quoted string value of `key`, if present and non-empty
pub fn get_string(text: &str, key: &str) -> Option<String> {
    text.lines()
        .filter_map(split_assignment)
        .find(|(k, _)| *k == key)
        .map(|(_, v)| unquote(v).trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Text between the first pair of matching quotes; unquoted values end at `#`
fn unquote(value: &str) -> &str {
    let mut chars = value.chars();
    match chars.next() {
        Some(quote @ ('"' | '\'')) => {
            let rest = chars.as_str();
            rest.find(quote).map(|end| &rest[..end]).unwrap_or(rest)
        }
        _ => value.split('#').next().unwrap_or(value),
    }
}

/// Apply [`set_enabled`] to a file on disk
pub fn apply_enabled(path: &Path, plugin_name: &str, enabled: bool) -> Result<()> {
    let text = fs::read_to_string(path).map_err(|source| PwnStoreError::ConfigPatchFailure {
        path: path.to_path_buf(),
        source,
    })?;

    let patched = set_enabled(&text, plugin_name, enabled);
    if patched == text {
        return Ok(());
    }

    fs::write(path, patched).map_err(|source| PwnStoreError::ConfigPatchFailure {
        path: path.to_path_buf(),
        source,
    })?;

    info!(
        "{} {} in {}",
        if enabled { "enabled" } else { "disabled" },
        plugin_name,
        path.display()
    );
    Ok(())
}
