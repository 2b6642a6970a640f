//! Error types for the wikidump-dl library.

use thiserror::Error;

/// Errors that can occur while fetching, downloading or verifying dumps.
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level HTTP error (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status code.
    #[error("HTTP {status} for {url}")]
    Status {
        /// Requested URL.
        url: String,
        /// Status code returned by the server.
        status: reqwest::StatusCode,
    },

    /// The response body ended before the advertised length.
    #[error("Truncated body for {url}: expected {expected} bytes, received {received}")]
    Truncated {
        /// Requested URL.
        url: String,
        /// Value of the `Content-Length` header.
        expected: u64,
        /// Bytes actually written.
        received: u64,
    },

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Manifest JSON could not be decoded.
    #[error("Manifest JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Manifest is structurally valid JSON but lacks required data.
    #[error("Malformed manifest: {0}")]
    Manifest(String),

    /// Configuration file could not be parsed.
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A worker task panicked or was aborted.
    #[error("Worker failed: {0}")]
    Worker(String),
}

impl Error {
    /// Returns true for failures a worker recovers from by retrying
    /// against another mirror.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Status { .. } | Self::Truncated { .. }
        )
    }
}

/// A specialized `Result` type for wikidump-dl operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_errors_are_transient() {
        let status = Error::Status {
            url: "https://example.org/a".into(),
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
        };
        assert!(status.is_transient());

        let truncated = Error::Truncated {
            url: "https://example.org/a".into(),
            expected: 10,
            received: 4,
        };
        assert!(truncated.is_transient());
    }

    #[test]
    fn local_errors_are_fatal() {
        let io = Error::Io(std::io::Error::new(std::io::ErrorKind::StorageFull, "disk full"));
        assert!(!io.is_transient());
        assert!(!Error::Manifest("no jobs".into()).is_transient());
    }

    #[test]
    fn status_message_names_url() {
        let err = Error::Status {
            url: "https://example.org/a".into(),
            status: reqwest::StatusCode::NOT_FOUND,
        };
        assert_eq!(err.to_string(), "HTTP 404 Not Found for https://example.org/a");
    }
}
