//! pwnstore core library
//!
//! Plugin store for Pwnagotchi devices: classifies plugins for the registry
//! and installs, removes and upgrades them on the device.
//!
//! - `metadata`: declared `__version__` / `__author__` / `__description__`
//! - `category`: weighted keyword classifier
//! - `registry`: registry records, fetch, and the registry builder
//! - `archive`: single-entry zip extraction with path validation
//! - `config_patch`: enabled-flag edits of the host config.toml
//! - `hints`: option keys a plugin expects in config.toml
//! - `lifecycle`: install / uninstall / upgrade

pub mod archive;
pub mod category;
pub mod config;
pub mod config_patch;
pub mod error;
pub mod hints;
pub mod lifecycle;
pub mod metadata;
pub mod registry;

pub use category::{classify, Category, CategoryClassifier};
pub use config::{resolve_base_dir, StoreConfig};
pub use error::{PwnStoreError, Result};
pub use lifecycle::{
    InstallReport, LifecycleEngine, LocalPlugin, UninstallReport, UpgradeCandidate,
    UpgradeOutcome, UpgradeResult,
};
pub use metadata::PluginMetadata;
pub use registry::{
    HttpTransport, OriginType, PluginRecord, RegistryBuilder, RegistryClient, Transport,
    TransportError,
};
