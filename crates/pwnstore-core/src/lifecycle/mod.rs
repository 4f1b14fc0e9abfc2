//! Plugin Lifecycle
//!
//! Install, uninstall and upgrade against the plugin directory. The
//! directory listing is the installed set; there is no separate manifest.

mod engine;

pub use engine::{find_record, LifecycleEngine};

use std::path::PathBuf;

use crate::error::{PwnStoreError, Result};
use crate::registry::PluginRecord;

/// A plugin file found in the plugin directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalPlugin {
    pub name: String,
    pub path: PathBuf,
    /// Declared `__version__`, or the default when undeclared
    pub version: String,
    /// Flag from the host config, `None` when it has no line for the plugin
    pub enabled: Option<bool>,
}

/// Outcome of a successful install
#[derive(Debug)]
pub struct InstallReport {
    pub name: String,
    pub path: PathBuf,
    pub bytes_written: u64,
    /// Set when the file was written but enabling it in the host config failed
    pub config_error: Option<PwnStoreError>,
    /// Option keys the plugin reads from `self.options`
    pub option_hints: Vec<String>,
}

/// Outcome of a successful uninstall
#[derive(Debug)]
pub struct UninstallReport {
    pub name: String,
    pub path: PathBuf,
    /// Set when the file was removed but disabling it in the host config failed
    pub config_error: Option<PwnStoreError>,
}

/// An installed plugin whose registry version differs from the local one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeCandidate {
    pub name: String,
    pub local_version: String,
    pub remote_version: String,
    pub record: PluginRecord,
}

/// Result of one item of an upgrade batch
#[derive(Debug)]
pub struct UpgradeResult {
    pub name: String,
    pub result: Result<InstallReport>,
}

#[derive(Debug)]
pub enum UpgradeOutcome {
    /// Nothing to upgrade
    UpToDate,
    /// Confirmation declined; nothing was written
    Declined { candidates: Vec<UpgradeCandidate> },
    /// Every candidate was attempted
    Applied { results: Vec<UpgradeResult> },
}

impl UpgradeOutcome {
    /// Number of batch items that failed
    pub fn failures(&self) -> usize {
        match self {
            Self::Applied { results } => results.iter().filter(|r| r.result.is_err()).count(),
            _ => 0,
        }
    }
}
