//! Error kinds surfaced by a vendoring run.

use std::io;
use std::path::PathBuf;

/// Failure of a single module fetch.
///
/// Transport failures and non-200 responses are kept apart so a missing
/// package ("HTTP 404") reads differently from a network outage.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// DNS, connect, TLS or timeout failure reported by curl.
    #[error("GET {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: curl::Error,
    },
    /// Response arrived but its final status was not 200.
    #[error("GET {url} returned HTTP {code}")]
    HttpStatus { url: String, code: u32 },
    /// Response body is not UTF-8 text.
    #[error("GET {url}: response body is not valid UTF-8")]
    Decode {
        url: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

impl FetchError {
    /// URL whose fetch failed.
    pub fn url(&self) -> &str {
        match self {
            FetchError::Transport { url, .. }
            | FetchError::HttpStatus { url, .. }
            | FetchError::Decode { url, .. } => url,
        }
    }

    /// HTTP status code, for status failures only.
    pub fn status(&self) -> Option<u32> {
        match self {
            FetchError::HttpStatus { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Transport { source, .. } if source.is_operation_timedout())
    }
}

/// Top-level error of a vendoring run. Every variant is fatal.
#[derive(Debug, thiserror::Error)]
pub enum VendorError {
    /// Missing or unparseable CLI arguments / config file.
    #[error("config: {0}")]
    Config(String),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// The bundler reported diagnostics (each already logged).
    #[error("build failed with {} error(s)", .diagnostics.len())]
    Bundle { diagnostics: Vec<String> },
    #[error("{action} {}: {source}", .path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("serialize import map: {0}")]
    ImportMap(#[from] serde_json::Error),
}

impl VendorError {
    pub(crate) fn fs(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        VendorError::Filesystem {
            action,
            path: path.into(),
            source,
        }
    }
}
