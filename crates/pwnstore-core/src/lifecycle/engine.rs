//! Lifecycle Engine
//!
//! High-level API for installing and managing plugins

use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::archive;
use crate::config::{validate_plugin_name, StoreConfig};
use crate::config_patch;
use crate::error::{PwnStoreError, Result};
use crate::hints;
use crate::lifecycle::{
    InstallReport, LocalPlugin, UninstallReport, UpgradeCandidate, UpgradeOutcome, UpgradeResult,
};
use crate::metadata;
use crate::registry::{resolve_source, PluginRecord, RegistryClient, Transport};

/// Lifecycle Engine - reconciles the plugin directory with the registry
pub struct LifecycleEngine<T> {
    config: StoreConfig,
    client: RegistryClient<T>,
    /// Registry location that beats the host config override
    registry_url: Option<String>,
}

impl<T: Transport> LifecycleEngine<T> {
    pub fn new(config: StoreConfig, transport: T) -> Self {
        let client = RegistryClient::new(transport, &config);
        Self {
            config,
            client,
            registry_url: None,
        }
    }

    /// Always fetch the registry from `url`
    pub fn with_registry_url(mut self, url: impl Into<String>) -> Self {
        self.registry_url = Some(url.into());
        self
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn client(&self) -> &RegistryClient<T> {
        &self.client
    }

    // ========== Registry ==========

    /// Registry location for the next fetch
    pub fn registry_source(&self) -> String {
        resolve_source(&self.config, self.registry_url.as_deref())
    }

    pub fn fetch_registry(&self) -> Result<Vec<PluginRecord>> {
        self.client.fetch(&self.registry_source())
    }

    /// Look up one record by exact name
    pub fn find(&self, name: &str) -> Result<PluginRecord> {
        find_record(self.fetch_registry()?, name)
    }

    // ========== Local State ==========

    /// Names of installed plugins, sorted
    pub fn installed(&self) -> Result<Vec<String>> {
        let dir = &self.config.plugin_dir;
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let ext_matches = path
                .extension()
                .map(|e| e == self.config.plugin_extension.as_str())
                .unwrap_or(false);
            if !ext_matches {
                continue;
            }
            if let Some(stem) = path.file_stem() {
                names.push(stem.to_string_lossy().to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    pub fn is_installed(&self, name: &str) -> bool {
        self.config.plugin_path(name).is_file()
    }

    /// Local version and enabled flag of an installed plugin
    pub fn local_status(&self, name: &str) -> Result<Option<LocalPlugin>> {
        let path = self.config.plugin_path(name);
        if !path.is_file() {
            return Ok(None);
        }

        let host_text = fs::read_to_string(&self.config.host_config).unwrap_or_default();
        Ok(Some(LocalPlugin {
            name: name.to_string(),
            version: read_local_version(&path)?,
            enabled: config_patch::is_enabled(&host_text, name),
            path,
        }))
    }

    /// Every installed plugin, including ones absent from the registry
    pub fn list_local(&self) -> Result<Vec<LocalPlugin>> {
        let mut plugins = Vec::new();
        for name in self.installed()? {
            if let Some(plugin) = self.local_status(&name)? {
                plugins.push(plugin);
            }
        }
        Ok(plugins)
    }

    // ========== Install / Uninstall ==========

    /// Install a plugin from the registry
    pub fn install(&self, name: &str) -> Result<InstallReport> {
        let record = self.find(name)?;
        self.install_record(&record)
    }

    /// Download, write and enable one record.
    ///
    /// The host config is only touched after the file is fully written.
    pub fn install_record(&self, record: &PluginRecord) -> Result<InstallReport> {
        validate_plugin_name(&record.name)?;
        let payload = self.resolve_payload(record)?;

        let path = self.config.plugin_path(&record.name);
        fs::create_dir_all(&self.config.plugin_dir).map_err(|source| {
            PwnStoreError::WriteFailure {
                path: self.config.plugin_dir.clone(),
                source,
            }
        })?;
        fs::write(&path, &payload).map_err(|source| PwnStoreError::WriteFailure {
            path: path.clone(),
            source,
        })?;
        info!("installed {} to {}", record.name, path.display());

        let config_error =
            config_patch::apply_enabled(&self.config.host_config, &record.name, true).err();
        if let Some(e) = &config_error {
            warn!("{}", e);
        }

        let option_hints = hints::scan_option_keys(&String::from_utf8_lossy(&payload));

        Ok(InstallReport {
            name: record.name.clone(),
            path,
            bytes_written: payload.len() as u64,
            config_error,
            option_hints,
        })
    }

    /// Plugin bytes for a record: the file itself or one archive entry
    fn resolve_payload(&self, record: &PluginRecord) -> Result<Vec<u8>> {
        if !record.is_archive() {
            return self.client.download(&record.download_url);
        }

        let entry = record
            .path_inside_zip
            .as_deref()
            .ok_or_else(|| PwnStoreError::MalformedRegistry {
                message: format!("{} has origin zip but no path_inside_zip", record.name),
            })?;
        archive::validate_entry_path(entry)?;

        let bytes = self.client.download(&record.download_url)?;
        let mut payload = Vec::new();
        archive::extract(Cursor::new(bytes), entry, &mut payload)?;
        debug!("extracted {} ({} bytes)", entry, payload.len());
        Ok(payload)
    }

    /// Remove a plugin file and disable it in the host config
    pub fn uninstall(&self, name: &str) -> Result<UninstallReport> {
        validate_plugin_name(name)?;
        let path = self.config.plugin_path(name);
        if !path.is_file() {
            return Err(PwnStoreError::NotInstalled {
                name: name.to_string(),
            });
        }

        fs::remove_file(&path).map_err(|source| PwnStoreError::WriteFailure {
            path: path.clone(),
            source,
        })?;
        info!("removed {}", path.display());

        let config_error = config_patch::apply_enabled(&self.config.host_config, name, false).err();
        if let Some(e) = &config_error {
            warn!("{}", e);
        }

        Ok(UninstallReport {
            name: name.to_string(),
            path,
            config_error,
        })
    }

    // ========== Upgrade ==========

    /// Installed plugins whose registry version string differs.
    ///
    /// Comparison is plain string inequality. Plugins missing from the
    /// registry are skipped.
    pub fn check_upgrades(&self, only: Option<&str>) -> Result<Vec<UpgradeCandidate>> {
        let names = match only {
            Some(name) => {
                validate_plugin_name(name)?;
                if !self.is_installed(name) {
                    return Err(PwnStoreError::NotInstalled {
                        name: name.to_string(),
                    });
                }
                vec![name.to_string()]
            }
            None => self.installed()?,
        };

        let registry: HashMap<String, PluginRecord> = self
            .fetch_registry()?
            .into_iter()
            .map(|r| (r.name.clone(), r))
            .collect();

        let mut candidates = Vec::new();
        for name in names {
            let Some(record) = registry.get(&name) else {
                debug!("{} is not in the registry, skipping", name);
                continue;
            };

            let local_version = read_local_version(&self.config.plugin_path(&name))?;
            if local_version != record.version {
                candidates.push(UpgradeCandidate {
                    name,
                    local_version,
                    remote_version: record.version.clone(),
                    record: record.clone(),
                });
            }
        }

        Ok(candidates)
    }

    /// Reinstall every candidate; one failure does not stop the rest
    pub fn apply_upgrades(&self, candidates: &[UpgradeCandidate]) -> Vec<UpgradeResult> {
        candidates
            .iter()
            .map(|c| {
                let result = self.install_record(&c.record);
                if let Err(e) = &result {
                    warn!("upgrade of {} failed: {}", c.name, e);
                }
                UpgradeResult {
                    name: c.name.clone(),
                    result,
                }
            })
            .collect()
    }

    /// Check, confirm, apply. `confirm` sees the whole batch; returning
    /// false cancels all of it before anything is written.
    pub fn upgrade<F>(&self, only: Option<&str>, confirm: F) -> Result<UpgradeOutcome>
    where
        F: FnOnce(&[UpgradeCandidate]) -> bool,
    {
        let candidates = self.check_upgrades(only)?;
        if candidates.is_empty() {
            return Ok(UpgradeOutcome::UpToDate);
        }

        if !confirm(&candidates) {
            return Ok(UpgradeOutcome::Declined { candidates });
        }

        Ok(UpgradeOutcome::Applied {
            results: self.apply_upgrades(&candidates),
        })
    }
}

/// Exact-name lookup
pub fn find_record(records: Vec<PluginRecord>, name: &str) -> Result<PluginRecord> {
    records
        .into_iter()
        .find(|r| r.name == name)
        .ok_or_else(|| PwnStoreError::NotFound {
            name: name.to_string(),
        })
}

fn read_local_version(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    Ok(metadata::extract_version(&String::from_utf8_lossy(&bytes))
        .unwrap_or_else(|| metadata::DEFAULT_VERSION.to_string()))
}
