//! Google Drive API client
//!
//! Provides a typed HTTP client for interacting with the Google Drive v3 API.
//! Handles authentication headers and endpoint construction for both the
//! metadata endpoint and the separate upload endpoint.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dropsync_drive::client::DriveClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = DriveClient::new("access-token-here");
//! let about = client.get_about().await?;
//! println!("Signed in as {}", about.email);
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;
use tracing::debug;

/// Base URL for Drive API v3 metadata operations
const API_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// Base URL for Drive API v3 upload operations
const UPLOAD_BASE_URL: &str = "https://www.googleapis.com/upload/drive/v3";

// ============================================================================
// About response types
// ============================================================================

/// Response from the /about endpoint
#[derive(Debug, Deserialize)]
struct AboutResponse {
    /// Signed-in user details
    user: Option<AboutUser>,
}

/// User details in the about response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AboutUser {
    /// User's display name
    display_name: Option<String>,
    /// User's email address
    email_address: Option<String>,
}

/// Signed-in account information
#[derive(Debug, Clone)]
pub struct AboutInfo {
    /// User's email address
    pub email: String,
    /// User's display name
    pub display_name: String,
}

// ============================================================================
// DriveClient
// ============================================================================

/// HTTP client for Google Drive API calls
///
/// Wraps `reqwest::Client` with authentication headers and base URL
/// construction. Drive splits metadata and content endpoints across two
/// hosts, so the client carries both bases.
///
/// The client is immutable after construction and safe to share across
/// concurrent upload tasks.
pub struct DriveClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL for metadata requests
    api_base: String,
    /// Base URL for upload requests
    upload_base: String,
    /// Current OAuth2 access token
    access_token: String,
}

impl DriveClient {
    /// Creates a new DriveClient with the given access token
    ///
    /// # Arguments
    /// * `access_token` - A valid OAuth2 access token for the Drive API
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_base: API_BASE_URL.to_string(),
            upload_base: UPLOAD_BASE_URL.to_string(),
            access_token: access_token.into(),
        }
    }

    /// Creates a new DriveClient with custom base URLs (useful for testing)
    ///
    /// # Arguments
    /// * `access_token` - A valid OAuth2 access token
    /// * `api_base` - Custom base URL for metadata requests
    /// * `upload_base` - Custom base URL for upload requests
    pub fn with_base_urls(
        access_token: impl Into<String>,
        api_base: impl Into<String>,
        upload_base: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into(),
            upload_base: upload_base.into(),
            access_token: access_token.into(),
        }
    }

    /// Returns a reference to the current access token
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Creates an authenticated request builder against the metadata base
    ///
    /// Automatically prepends the base URL and adds the Authorization header.
    ///
    /// # Arguments
    /// * `method` - HTTP method (GET, POST, PUT, DELETE, etc.)
    /// * `path` - API path relative to the base (e.g., "/files" or "/about")
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.api_base, path);
        self.client
            .request(method, &url)
            .bearer_auth(&self.access_token)
    }

    /// Creates an authenticated request builder against the upload base
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `path` - API path relative to the upload base (e.g., "/files")
    pub fn upload_request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.upload_base, path);
        self.client
            .request(method, &url)
            .bearer_auth(&self.access_token)
    }

    /// Retrieves the signed-in user's account information
    ///
    /// Makes `GET /about?fields=user` and maps it to an [`AboutInfo`].
    pub async fn get_about(&self) -> Result<AboutInfo> {
        debug!("Fetching account info from /about");

        let about: AboutResponse = self
            .request(Method::GET, "/about?fields=user")
            .send()
            .await
            .context("Failed to fetch /about")?
            .error_for_status()
            .context("GET /about returned error status")?
            .json()
            .await
            .context("Failed to parse /about response")?;

        let user = about.user.unwrap_or(AboutUser {
            display_name: None,
            email_address: None,
        });

        Ok(AboutInfo {
            email: user
                .email_address
                .unwrap_or_else(|| "unknown@unknown.com".to_string()),
            display_name: user
                .display_name
                .unwrap_or_else(|| "Unknown User".to_string()),
        })
    }

    /// Returns a reference to the underlying HTTP client
    ///
    /// Upload sessions hand back absolute URLs, so chunk requests go through
    /// the raw client rather than the base-relative builders.
    pub(crate) fn http_client(&self) -> &Client {
        &self.client
    }

    /// Returns the base URL for metadata requests
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Returns the base URL for upload requests
    pub fn upload_base(&self) -> &str {
        &self.upload_base
    }
}
