//! Registry Module
//!
//! - `types`: plugins.json record types
//! - `transport`: blocking byte fetch (HTTP or local file)
//! - `client`: registry fetch, payload download, source resolution
//! - `builder`: builds plugins.json from plugin sources

pub mod builder;
pub mod client;
pub mod transport;
pub mod types;

// Re-exports
pub use builder::{parse_plugin_source, parse_sources, to_registry_json, RegistryBuilder};
pub use client::{parse_registry, resolve_source, RegistryClient};
pub use transport::{HttpTransport, Transport, TransportError};
pub use types::{OriginType, PluginRecord};
