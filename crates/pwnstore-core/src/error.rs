use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PwnStoreError {
    #[error(
        "Could not reach the plugin registry at {url}: {message}\n\
         Check that the device has internet access (e.g. `ping 8.8.8.8`), \
         that DNS resolves, and that the registry URL is correct."
    )]
    RegistryUnreachable { url: String, message: String },

    #[error("Could not connect to store (Status: {status}) at {url}")]
    RegistryUnavailable { url: String, status: u16 },

    #[error("Registry is malformed: {message}")]
    MalformedRegistry { message: String },

    #[error("Plugin '{name}' not found in registry")]
    NotFound { name: String },

    #[error("Plugin '{name}' is not installed")]
    NotInstalled { name: String },

    #[error("Unsafe archive entry path: {path}")]
    UnsafePath { path: String },

    #[error("Invalid plugin name: '{name}'")]
    InvalidPluginName { name: String },

    #[error("Failed to write {path}: {source}")]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config update failed for {path}: {source}")]
    ConfigPatchFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Request to {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },

    #[error("Download failed for {url}: {message}")]
    Download { url: String, message: String },

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Failed to parse config file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PwnStoreError>;

impl PwnStoreError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::RegistryUnreachable { .. } | Self::Timeout { .. } => 2,
            Self::RegistryUnavailable { .. } => 3,
            Self::MalformedRegistry { .. } => 4,
            Self::NotFound { .. } => 5,
            Self::NotInstalled { .. } => 6,
            Self::UnsafePath { .. } | Self::InvalidPluginName { .. } => 7,
            Self::WriteFailure { .. } => 8,
            Self::ConfigPatchFailure { .. } => 9,
            _ => 1,
        }
    }
}
