use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PwnStoreError, Result};

const CONFIG_FILE: &str = "config.toml";

pub const DEFAULT_REGISTRY_URL: &str =
    "https://raw.githubusercontent.com/wpa2/pwnagotchi-store/main/plugins.json";
pub const DEFAULT_PLUGIN_DIR: &str = "/usr/local/share/pwnagotchi/custom-plugins";
pub const DEFAULT_HOST_CONFIG: &str = "/etc/pwnagotchi/config.toml";

/// Key in the host configuration text that repoints the registry.
pub const REGISTRY_OVERRIDE_KEY: &str = "main.pwnstore.registry_url";

/// Default config template with rich comments
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# pwnstore configuration file
# Location: ~/.pwnstore/config.toml

# Directory holding one file per installed plugin
plugin_dir = "/usr/local/share/pwnagotchi/custom-plugins"

# Pwnagotchi configuration file where plugins are enabled/disabled
host_config = "/etc/pwnagotchi/config.toml"

# Registry used when the host config has no main.pwnstore.registry_url line
registry_url = "https://raw.githubusercontent.com/wpa2/pwnagotchi-store/main/plugins.json"

# Timeouts in seconds
registry_timeout_secs = 15
download_timeout_secs = 30

# Extension given to installed plugin files
plugin_extension = "py"
"#;

/// Tool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_plugin_dir")]
    pub plugin_dir: PathBuf,

    #[serde(default = "default_host_config")]
    pub host_config: PathBuf,

    #[serde(default = "default_registry_url")]
    pub registry_url: String,

    #[serde(default = "default_registry_timeout")]
    pub registry_timeout_secs: u64,

    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,

    #[serde(default = "default_extension")]
    pub plugin_extension: String,
}

fn default_plugin_dir() -> PathBuf {
    PathBuf::from(DEFAULT_PLUGIN_DIR)
}

fn default_host_config() -> PathBuf {
    PathBuf::from(DEFAULT_HOST_CONFIG)
}

fn default_registry_url() -> String {
    DEFAULT_REGISTRY_URL.to_string()
}

fn default_registry_timeout() -> u64 {
    15
}

fn default_download_timeout() -> u64 {
    30
}

fn default_extension() -> String {
    "py".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            plugin_dir: default_plugin_dir(),
            host_config: default_host_config(),
            registry_url: default_registry_url(),
            registry_timeout_secs: default_registry_timeout(),
            download_timeout_secs: default_download_timeout(),
            plugin_extension: default_extension(),
        }
    }
}

impl StoreConfig {
    /// Load config from base directory
    pub fn load(base_dir: &Path) -> Result<Self> {
        let path = base_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: StoreConfig =
            toml::from_str(&content).map_err(|e| PwnStoreError::ConfigParse {
                path: path.clone(),
                message: e.to_string(),
            })?;

        Ok(config)
    }

    /// Get config file path
    pub fn path(base_dir: &Path) -> PathBuf {
        base_dir.join(CONFIG_FILE)
    }

    /// Initialize config with default template (rich comments)
    pub fn init(base_dir: &Path) -> Result<PathBuf> {
        let path = base_dir.join(CONFIG_FILE);
        fs::create_dir_all(base_dir)?;

        if !path.exists() {
            fs::write(&path, DEFAULT_CONFIG_TEMPLATE)?;
        }

        Ok(path)
    }

    pub fn registry_timeout(&self) -> Duration {
        Duration::from_secs(self.registry_timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    /// Path an installed plugin named `name` lives at
    pub fn plugin_path(&self, name: &str) -> PathBuf {
        self.plugin_dir
            .join(format!("{}.{}", name, self.plugin_extension))
    }

    /// List all config keys with their current values
    pub fn list(&self) -> Vec<(String, String)> {
        vec![
            (
                "plugin_dir".to_string(),
                self.plugin_dir.display().to_string(),
            ),
            (
                "host_config".to_string(),
                self.host_config.display().to_string(),
            ),
            ("registry_url".to_string(), self.registry_url.clone()),
            (
                "registry_timeout_secs".to_string(),
                self.registry_timeout_secs.to_string(),
            ),
            (
                "download_timeout_secs".to_string(),
                self.download_timeout_secs.to_string(),
            ),
            (
                "plugin_extension".to_string(),
                self.plugin_extension.clone(),
            ),
        ]
    }
}

/// Resolve the tool's base directory: explicit flag > PWNSTORE_BASE > ~/.pwnstore
pub fn resolve_base_dir(cli_base: Option<PathBuf>) -> PathBuf {
    if let Some(base) = cli_base {
        return base;
    }

    if let Ok(base) = std::env::var("PWNSTORE_BASE") {
        return PathBuf::from(base);
    }

    dirs::home_dir()
        .map(|h| h.join(".pwnstore"))
        .unwrap_or_else(|| PathBuf::from(".pwnstore"))
}

/// A plugin name must map to a single file directly inside the plugin
/// directory and to a single `main.plugins.<name>` config key.
pub fn validate_plugin_name(name: &str) -> Result<()> {
    let invalid = || PwnStoreError::InvalidPluginName {
        name: name.to_string(),
    };

    if name.is_empty() || name.starts_with('.') || name.contains("..") {
        return Err(invalid());
    }

    for c in name.chars() {
        if c == '/' || c == '\\' || c == '=' || c.is_control() {
            return Err(invalid());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = StoreConfig::load(temp.path()).unwrap();
        assert_eq!(config.registry_timeout_secs, 15);
        assert_eq!(config.download_timeout_secs, 30);
        assert_eq!(config.plugin_dir, PathBuf::from(DEFAULT_PLUGIN_DIR));
    }

    #[test]
    fn test_init_template_parses_to_defaults() {
        let temp = TempDir::new().unwrap();
        let path = StoreConfig::init(temp.path()).unwrap();
        assert!(path.exists());

        let config = StoreConfig::load(temp.path()).unwrap();
        assert_eq!(config.registry_url, DEFAULT_REGISTRY_URL);
        assert_eq!(config.plugin_extension, "py");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE),
            "plugin_dir = \"/tmp/plugins\"\n",
        )
        .unwrap();

        let config = StoreConfig::load(temp.path()).unwrap();
        assert_eq!(config.plugin_dir, PathBuf::from("/tmp/plugins"));
        assert_eq!(config.host_config, PathBuf::from(DEFAULT_HOST_CONFIG));
    }

    #[test]
    fn test_malformed_file_is_config_parse_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "plugin_dir = [").unwrap();

        let err = StoreConfig::load(temp.path()).unwrap_err();
        assert!(matches!(err, PwnStoreError::ConfigParse { .. }));
    }

    #[test]
    fn test_plugin_path() {
        let config = StoreConfig {
            plugin_dir: PathBuf::from("/plugins"),
            ..StoreConfig::default()
        };
        assert_eq!(
            config.plugin_path("weather"),
            PathBuf::from("/plugins/weather.py")
        );
    }

    #[test]
    fn test_validate_plugin_name() {
        for name in ["weather", "gps_more", "Discord-Notify", "v2.plugin"] {
            assert!(validate_plugin_name(name).is_ok(), "{}", name);
        }
        for name in [
            "",
            "../escaped",
            "..",
            "sub/dir",
            "sub\\dir",
            ".hidden",
            "a=b",
            "bad\nname",
        ] {
            assert!(
                matches!(
                    validate_plugin_name(name),
                    Err(PwnStoreError::InvalidPluginName { .. })
                ),
                "{:?}",
                name
            );
        }
    }
}
