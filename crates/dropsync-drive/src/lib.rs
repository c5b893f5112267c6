//! Dropsync Drive - Google Drive API client
//!
//! Provides async client for:
//! - OAuth2 authentication (Authorization Code with PKCE)
//! - Folder lookup and creation via the Drive v3 API
//! - Multipart upload for small files
//! - Resumable upload sessions for large files
//!
//! ## Modules
//!
//! - [`auth`] - OAuth2 PKCE authentication flow components
//! - [`client`] - Google Drive API HTTP client
//! - [`files`] - Folder and upload wire operations
//! - [`store`] - [`IRemoteStore`](dropsync_core::ports::IRemoteStore) adapter

pub mod auth;
pub mod client;
pub mod files;
pub mod store;

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when communicating with the Google Drive API
#[derive(Debug, Error)]
pub enum DriveError {
    /// Authentication credentials are invalid or expired
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Insufficient permissions for the requested operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded; the server may suggest a wait
    #[error("Too many requests, retry after {retry_after:?}")]
    TooManyRequests {
        /// Suggested wait from the Retry-After header, when present
        retry_after: Option<Duration>,
    },

    /// A server-side error occurred (5xx)
    #[error("Server error: {0}")]
    ServerError(String),

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The API response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl DriveError {
    /// Maps an HTTP status and response detail onto the error taxonomy.
    ///
    /// Statuses without a dedicated variant land in [`DriveError::InvalidResponse`]
    /// so the caller still sees the code and body.
    pub fn from_parts(
        status: reqwest::StatusCode,
        retry_after: Option<Duration>,
        detail: String,
    ) -> Self {
        use reqwest::StatusCode;

        match status {
            StatusCode::UNAUTHORIZED => DriveError::Unauthorized(detail),
            StatusCode::FORBIDDEN => DriveError::Forbidden(detail),
            StatusCode::NOT_FOUND => DriveError::NotFound(detail),
            StatusCode::TOO_MANY_REQUESTS => DriveError::TooManyRequests { retry_after },
            s if s.is_server_error() => DriveError::ServerError(format!("{s}: {detail}")),
            s => DriveError::InvalidResponse(format!("unexpected status {s}: {detail}")),
        }
    }
}
