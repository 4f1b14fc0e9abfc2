//! Byte transport
//!
//! Blocking GET with a per-request timeout. Network access goes through
//! [`Transport`] so the registry client and lifecycle engine can run
//! against an in-memory fake.

use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;

/// Why a GET failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// No network path (DNS, refused connection, missing local file)
    Unreachable(String),
    /// Server answered with a non-success status
    Status(u16),
    /// The request did not finish within its timeout
    Timeout,
    /// Connection worked but the body could not be read
    Body(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreachable(msg) => write!(f, "unreachable: {}", msg),
            Self::Status(code) => write!(f, "HTTP status {}", code),
            Self::Timeout => write!(f, "timed out"),
            Self::Body(msg) => write!(f, "failed to read body: {}", msg),
        }
    }
}

pub trait Transport {
    fn get(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, TransportError> {
        (**self).get(url, timeout)
    }
}

/// HTTP(S) via reqwest; `file://` URLs and bare paths are read from disk
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, TransportError> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            let path = url.strip_prefix("file://").unwrap_or(url);
            return read_local(Path::new(path));
        }

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .map_err(classify_reqwest_error)?;

        if !response.status().is_success() {
            return Err(TransportError::Status(response.status().as_u16()));
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::Body(e.to_string())
                }
            })
    }
}

fn classify_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if let Some(status) = e.status() {
        TransportError::Status(status.as_u16())
    } else {
        TransportError::Unreachable(e.to_string())
    }
}

fn read_local(path: &Path) -> Result<Vec<u8>, TransportError> {
    fs::read(path).map_err(|e| TransportError::Unreachable(format!("{}: {}", path.display(), e)))
}
