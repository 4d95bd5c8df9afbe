//! Error types for Moonraker API access.

use thiserror::Error;

/// Result type for Moonraker operations.
pub type MoonrakerResult<T> = Result<T, MoonrakerError>;

/// Errors that can occur while talking to Moonraker.
#[derive(Debug, Error)]
pub enum MoonrakerError {
    /// The requested file or endpoint does not exist.
    #[error("Not found: {path}")]
    NotFound {
        /// Requested path.
        path: String,
    },

    /// Moonraker refused the request, or the path escapes its root.
    #[error("Access denied: {path}")]
    AccessDenied {
        /// Requested path.
        path: String,
    },

    /// Moonraker could not be reached (connection refused, timeout, DNS).
    #[error("Moonraker unreachable at {url}")]
    Unreachable {
        /// URL that was requested.
        url: String,
        /// Underlying HTTP error.
        #[source]
        source: reqwest::Error,
    },

    /// Moonraker answered with an unexpected HTTP status.
    #[error("Moonraker returned HTTP {status} for {path}")]
    HttpStatus {
        /// Requested path.
        path: String,
        /// HTTP status code.
        status: u16,
    },

    /// The response body could not be read or decoded.
    #[error("Invalid response from Moonraker: {message}")]
    InvalidResponse {
        /// Description of what's wrong.
        message: String,
    },

    /// The configured base URL cannot carry a request path.
    #[error("Invalid Moonraker URL: {url}")]
    InvalidUrl {
        /// The configured URL.
        url: String,
    },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client")]
    Client {
        /// Underlying HTTP error.
        #[source]
        source: reqwest::Error,
    },
}

impl MoonrakerError {
    /// Creates a not-found error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Creates an access-denied error.
    pub fn access_denied(path: impl Into<String>) -> Self {
        Self::AccessDenied { path: path.into() }
    }

    /// Creates an unexpected-status error.
    pub fn http_status(path: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            path: path.into(),
            status,
        }
    }

    /// Creates an invalid-URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an invalid-response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Returns `true` for [`MoonrakerError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
