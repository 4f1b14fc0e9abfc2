//! Registry Client
//!
//! Fetches plugins.json and payload bytes through a [`Transport`].

use std::fs;
use std::path::Path;
use std::time::Duration;

use tracing::debug;

use crate::config::{StoreConfig, REGISTRY_OVERRIDE_KEY};
use crate::config_patch;
use crate::error::{PwnStoreError, Result};
use crate::registry::transport::{Transport, TransportError};
use crate::registry::types::PluginRecord;

/// Registry Client - reads the remote plugin list
pub struct RegistryClient<T> {
    transport: T,
    registry_timeout: Duration,
    download_timeout: Duration,
}

impl<T: Transport> RegistryClient<T> {
    pub fn new(transport: T, config: &StoreConfig) -> Self {
        Self {
            transport,
            registry_timeout: config.registry_timeout(),
            download_timeout: config.download_timeout(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch and parse the registry at `source`. No partial results.
    pub fn fetch(&self, source: &str) -> Result<Vec<PluginRecord>> {
        debug!("fetching registry from {}", source);

        let bytes = self
            .transport
            .get(source, self.registry_timeout)
            .map_err(|e| registry_error(source, self.registry_timeout, e))?;

        let records = parse_registry(&bytes)?;
        debug!("registry has {} plugins", records.len());
        Ok(records)
    }

    /// Download a plugin file or archive
    pub fn download(&self, url: &str) -> Result<Vec<u8>> {
        debug!("downloading {}", url);

        self.transport
            .get(url, self.download_timeout)
            .map_err(|e| download_error(url, self.download_timeout, e))
    }
}

/// Parse a registry body
pub fn parse_registry(bytes: &[u8]) -> Result<Vec<PluginRecord>> {
    serde_json::from_slice(bytes).map_err(|e| PwnStoreError::MalformedRegistry {
        message: e.to_string(),
    })
}

/// Registry location for this fetch.
///
/// An explicit location wins, then the operator override line in the host
/// config (read fresh every call), then the configured default.
pub fn resolve_source(config: &StoreConfig, explicit: Option<&str>) -> String {
    if let Some(url) = explicit {
        return url.to_string();
    }

    if let Some(url) = read_override(&config.host_config) {
        debug!("registry override from {}", config.host_config.display());
        return url;
    }

    config.registry_url.clone()
}

fn read_override(host_config: &Path) -> Option<String> {
    let text = fs::read_to_string(host_config).ok()?;
    config_patch::get_string(&text, REGISTRY_OVERRIDE_KEY)
}

fn registry_error(url: &str, timeout: Duration, error: TransportError) -> PwnStoreError {
    match error {
        TransportError::Unreachable(message) => PwnStoreError::RegistryUnreachable {
            url: url.to_string(),
            message,
        },
        TransportError::Status(status) => PwnStoreError::RegistryUnavailable {
            url: url.to_string(),
            status,
        },
        TransportError::Timeout => PwnStoreError::Timeout {
            url: url.to_string(),
            seconds: timeout.as_secs(),
        },
        TransportError::Body(message) => PwnStoreError::MalformedRegistry { message },
    }
}

fn download_error(url: &str, timeout: Duration, error: TransportError) -> PwnStoreError {
    match error {
        TransportError::Timeout => PwnStoreError::Timeout {
            url: url.to_string(),
            seconds: timeout.as_secs(),
        },
        other => PwnStoreError::Download {
            url: url.to_string(),
            message: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::transport::mock::MockTransport;
    use tempfile::TempDir;

    const URL: &str = "https://registry.test/plugins.json";

    fn client(transport: MockTransport) -> RegistryClient<MockTransport> {
        RegistryClient::new(transport, &StoreConfig::default())
    }

    #[test]
    fn test_fetch_parses_records() {
        let body = r#"[{"name": "weather", "version": "1.0", "description": "d",
                        "author": "a", "category": "Display", "origin_type": "single",
                        "download_url": "https://registry.test/weather.py"}]"#;
        let client = client(MockTransport::new().with(URL, body));

        let records = client.fetch(URL).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "weather");
    }

    #[test]
    fn test_fetch_uses_registry_timeout() {
        let client = client(MockTransport::new().with(URL, "[]"));
        client.fetch(URL).unwrap();
        assert_eq!(
            client.transport().requests(),
            vec![(URL.to_string(), Duration::from_secs(15))]
        );
    }

    #[test]
    fn test_status_error_is_unavailable() {
        let client = client(MockTransport::new().with_error(URL, TransportError::Status(404)));
        let err = client.fetch(URL).unwrap_err();
        assert!(matches!(
            err,
            PwnStoreError::RegistryUnavailable { status: 404, .. }
        ));
    }

    #[test]
    fn test_no_route_is_unreachable() {
        let client = client(MockTransport::new());
        let err = client.fetch(URL).unwrap_err();
        assert!(matches!(err, PwnStoreError::RegistryUnreachable { .. }));
    }

    #[test]
    fn test_malformed_body_is_fatal() {
        let body = r#"[{"name": "ok", "category": "GPS", "download_url": "u"}, {"name": 5}]"#;
        let client = client(MockTransport::new().with(URL, body));
        let err = client.fetch(URL).unwrap_err();
        assert!(matches!(err, PwnStoreError::MalformedRegistry { .. }));
    }

    #[test]
    fn test_download_timeout() {
        let url = "https://registry.test/slow.zip";
        let client = client(MockTransport::new().with_error(url, TransportError::Timeout));
        let err = client.download(url).unwrap_err();
        assert!(matches!(err, PwnStoreError::Timeout { seconds: 30, .. }));
    }

    #[test]
    fn test_resolve_source_precedence() {
        let temp = TempDir::new().unwrap();
        let host_config = temp.path().join("config.toml");
        let config = StoreConfig {
            host_config: host_config.clone(),
            registry_url: "https://default.test/plugins.json".to_string(),
            ..StoreConfig::default()
        };

        // No host config file at all
        assert_eq!(
            resolve_source(&config, None),
            "https://default.test/plugins.json"
        );

        fs::write(
            &host_config,
            "main.name = \"pwn\"\nmain.pwnstore.registry_url = \"http://10.0.0.2/plugins.json\"\n",
        )
        .unwrap();
        assert_eq!(
            resolve_source(&config, None),
            "http://10.0.0.2/plugins.json"
        );

        // Re-read on every call
        fs::write(&host_config, "main.name = \"pwn\"\n").unwrap();
        assert_eq!(
            resolve_source(&config, None),
            "https://default.test/plugins.json"
        );

        assert_eq!(
            resolve_source(&config, Some("file:///tmp/plugins.json")),
            "file:///tmp/plugins.json"
        );
    }
}
