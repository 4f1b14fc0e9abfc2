//! Registry Builder
//!
//! Turns a list of source URLs (single plugin files or zip archives of
//! plugin repositories) into the published plugins.json.

use std::io::Cursor;
use std::path::Path;

use tracing::{debug, warn};

use crate::archive;
use crate::category;
use crate::error::Result;
use crate::metadata;
use crate::registry::client::RegistryClient;
use crate::registry::transport::Transport;
use crate::registry::types::{OriginType, PluginRecord};

/// Build a record from one plugin source file.
///
/// Returns `None` when the file declares neither a version nor a
/// description.
pub fn parse_plugin_source(
    code: &str,
    filename: &str,
    download_url: &str,
    path_inside_zip: Option<&str>,
) -> Option<PluginRecord> {
    let meta = metadata::extract(code);
    if !meta.is_declared() {
        return None;
    }

    let name = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| filename.to_string());

    let category = category::classify(&name, &meta.description, code);

    Some(PluginRecord {
        name,
        version: meta.version,
        description: meta.description,
        author: meta.author,
        category,
        origin_type: if path_inside_zip.is_some() {
            OriginType::Archive
        } else {
            OriginType::Single
        },
        download_url: download_url.to_string(),
        path_inside_zip: path_inside_zip.map(str::to_string),
    })
}

/// Source URLs from a sources list: one per line, `#` comments and blanks skipped
pub fn parse_sources(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Registry Builder - downloads sources and classifies every plugin found
pub struct RegistryBuilder<'a, T> {
    client: &'a RegistryClient<T>,
    extension: String,
}

impl<'a, T: Transport> RegistryBuilder<'a, T> {
    pub fn new(client: &'a RegistryClient<T>, extension: &str) -> Self {
        Self {
            client,
            extension: extension.to_string(),
        }
    }

    /// Build records for every source. A failing source is skipped.
    pub fn build(&self, sources: &[String]) -> Vec<PluginRecord> {
        let mut records = Vec::new();

        for url in sources {
            let result = if url.ends_with(".zip") {
                self.process_archive(url)
            } else {
                self.process_single(url)
            };

            match result {
                Ok(mut found) => records.append(&mut found),
                Err(e) => warn!("skipping {}: {}", url, e),
            }
        }

        records
    }

    fn process_single(&self, url: &str) -> Result<Vec<PluginRecord>> {
        let bytes = self.client.download(url)?;
        let code = String::from_utf8_lossy(&bytes);
        let filename = url.rsplit('/').next().unwrap_or(url);

        Ok(parse_plugin_source(&code, filename, url, None)
            .map(|record| {
                debug!("{} -> {}", record.name, record.category);
                vec![record]
            })
            .unwrap_or_default())
    }

    fn process_archive(&self, url: &str) -> Result<Vec<PluginRecord>> {
        let bytes = self.client.download(url)?;
        let entries = archive::plugin_entries(Cursor::new(&bytes), &self.extension)?;

        let mut records = Vec::new();
        for entry in entries {
            let mut buf = Vec::new();
            if let Err(e) = archive::extract(Cursor::new(&bytes), &entry, &mut buf) {
                warn!("skipping {} in {}: {}", entry, url, e);
                continue;
            }

            let code = String::from_utf8_lossy(&buf);
            let filename = entry.rsplit('/').next().unwrap_or(&entry);
            if let Some(record) = parse_plugin_source(&code, filename, url, Some(entry.as_str())) {
                debug!("{} -> {}", record.name, record.category);
                records.push(record);
            }
        }

        Ok(records)
    }
}

/// Pretty JSON in the published registry format
pub fn to_registry_json(records: &[PluginRecord]) -> String {
    // PluginRecord has only string and enum fields, serialization cannot fail
    serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string())
}
