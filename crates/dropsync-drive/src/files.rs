//! Folder and upload operations for the Google Drive v3 API
//!
//! Provides functions for mirroring entries into Drive:
//! - [`list_folders`] - Exact-name folder lookup scoped to one parent
//! - [`create_folder`] - Folder creation via a metadata-only insert
//! - [`upload_multipart`] - Single-request upload for small files
//! - [`create_upload_session`] - Initiates a resumable upload session
//! - [`upload_chunk`] - Uploads a single chunk within a session
//! - [`upload_resumable`] - Full chunked upload orchestration
//!
//! ## Google Drive API References
//!
//! - [Search for files](https://developers.google.com/drive/api/guides/search-files)
//! - [Upload file data](https://developers.google.com/drive/api/guides/manage-uploads)

use anyhow::{Context, Result};
use reqwest::{header, Method, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, info};

use crate::client::DriveClient;
use crate::DriveError;

/// MIME type Drive uses to mark an item as a folder
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Default chunk size for resumable uploads: 8 MiB (8,388,608 bytes)
///
/// Google requires chunk sizes in multiples of 256 KiB.
/// 8 MiB = 8,388,608 = 256 KiB * 32, which satisfies this requirement.
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024 * 1024;

// ============================================================================
// Drive API response types for deserialization
// ============================================================================

/// A file or folder resource returned by the Drive v3 API
///
/// Fields use `Option` because the API only returns what the `fields`
/// selector asks for, and folders have no size at all.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveItem {
    /// Drive item ID
    pub id: String,
    /// Item name (file or folder name)
    pub name: String,
    /// MIME type; folders use `application/vnd.google-apps.folder`
    pub mime_type: Option<String>,
    /// File size in bytes. Drive serializes int64 values as JSON strings.
    pub size: Option<String>,
    /// Creation timestamp in RFC 3339 format
    pub created_time: Option<String>,
}

impl DriveItem {
    /// Returns true if this item is a folder
    pub fn is_folder(&self) -> bool {
        self.mime_type.as_deref() == Some(FOLDER_MIME_TYPE)
    }

    /// Parses the string-typed size field into bytes
    pub fn size_bytes(&self) -> Option<u64> {
        self.size.as_deref().and_then(|s| s.parse().ok())
    }
}

/// Response from the files.list endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    /// One page of matching items
    #[serde(default)]
    files: Vec<DriveItem>,
    /// Token for the next page, absent on the last page
    next_page_token: Option<String>,
}

// ============================================================================
// Query construction helpers
// ============================================================================

/// Escapes a value for embedding in a Drive search query string
///
/// Drive queries wrap values in single quotes; backslashes and single
/// quotes inside the value must be backslash-escaped.
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Builds the search query for an exact-name folder lookup under one parent
///
/// Matches are restricted to untrashed folders whose direct parent is
/// `parent` (or the Drive root when `None`), so equal names elsewhere in
/// the hierarchy never collide.
fn folder_query(name: &str, parent: Option<&str>) -> String {
    let parent_id = parent.unwrap_or("root");
    format!(
        "name = '{}' and mimeType = '{}' and trashed = false and '{}' in parents",
        escape_query_value(name),
        FOLDER_MIME_TYPE,
        escape_query_value(parent_id),
    )
}

/// Builds a multipart/related body carrying metadata and content parts
fn build_multipart_body(
    metadata: &serde_json::Value,
    content_type: &str,
    data: &[u8],
    boundary: &str,
) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + 512);
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata.to_string().as_bytes());
    body.extend_from_slice(format!("\r\n--{boundary}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--").as_bytes());
    body
}

/// Consumes a non-success response into a classified [`DriveError`]
async fn error_for_response(response: Response) -> anyhow::Error {
    let status = response.status();
    let retry_after = response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .map(std::time::Duration::from_secs);
    let detail = response
        .text()
        .await
        .unwrap_or_else(|_| "unable to read error body".to_string());
    anyhow::Error::new(DriveError::from_parts(status, retry_after, detail))
}

// ============================================================================
// list_folders
// ============================================================================

/// Lists folders named exactly `name` under the given parent
///
/// Uses the search API: `GET /files?q=...&orderBy=createdTime`, following
/// pagination until exhausted. Results come back oldest-created first, so
/// a caller that takes the first entry resolves duplicate names
/// deterministically.
///
/// # Arguments
/// * `client` - The authenticated DriveClient
/// * `name` - Exact folder name to match
/// * `parent` - Parent folder ID, or `None` for the Drive root
///
/// # Returns
/// All matching folders, oldest first; empty when none exist
pub async fn list_folders(
    client: &DriveClient,
    name: &str,
    parent: Option<&str>,
) -> Result<Vec<DriveItem>> {
    let query = folder_query(name, parent);
    debug!(query = %query, "Listing folders");

    let mut folders = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let mut request = client.request(Method::GET, "/files").query(&[
            ("q", query.as_str()),
            ("orderBy", "createdTime"),
            ("fields", "nextPageToken,files(id,name,mimeType,createdTime)"),
            ("pageSize", "100"),
        ]);
        if let Some(token) = &page_token {
            request = request.query(&[("pageToken", token.as_str())]);
        }

        let response = request
            .send()
            .await
            .context("Failed to send folder query")?;
        if !response.status().is_success() {
            return Err(error_for_response(response).await);
        }

        let page: FileList = response
            .json()
            .await
            .context("Failed to parse folder query response")?;
        folders.extend(page.files);

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    debug!(name, matches = folders.len(), "Folder query completed");
    Ok(folders)
}

// ============================================================================
// create_folder
// ============================================================================

/// Creates a folder under the given parent
///
/// Uses a metadata-only insert: `POST /files` with the folder MIME type.
/// Drive allows several folders with the same name under one parent, so
/// callers are responsible for lookup-before-create semantics.
///
/// # Arguments
/// * `client` - The authenticated DriveClient
/// * `name` - The folder name
/// * `parent` - Parent folder ID, or `None` for the Drive root
///
/// # Returns
/// The created folder's metadata
pub async fn create_folder(
    client: &DriveClient,
    name: &str,
    parent: Option<&str>,
) -> Result<DriveItem> {
    debug!(name, parent = parent.unwrap_or("root"), "Creating folder");

    let mut metadata = serde_json::json!({
        "name": name,
        "mimeType": FOLDER_MIME_TYPE,
    });
    if let Some(parent_id) = parent {
        metadata["parents"] = serde_json::json!([parent_id]);
    }

    let response = client
        .request(Method::POST, "/files")
        .query(&[("fields", "id,name,mimeType,createdTime")])
        .json(&metadata)
        .send()
        .await
        .context("Failed to send folder create request")?;
    if !response.status().is_success() {
        return Err(error_for_response(response).await);
    }

    let item: DriveItem = response
        .json()
        .await
        .context("Failed to parse folder create response")?;

    debug!("Folder created: id={}, name={}", item.id, item.name);
    Ok(item)
}

// ============================================================================
// upload_multipart
// ============================================================================

/// Uploads a small file in a single multipart request
///
/// Uses the multipart upload API: `POST /upload/files?uploadType=multipart`
/// with a `multipart/related` body carrying the JSON metadata part and the
/// content part.
///
/// # Arguments
/// * `client` - The authenticated DriveClient
/// * `name` - File name to create
/// * `content_type` - MIME type of the payload
/// * `parent` - Parent folder ID
/// * `data` - File contents
///
/// # Returns
/// The created file's metadata
///
/// # Errors
/// Returns an error if the upload request fails or the response cannot be parsed
pub async fn upload_multipart(
    client: &DriveClient,
    name: &str,
    content_type: &str,
    parent: &str,
    data: &[u8],
) -> Result<DriveItem> {
    debug!(
        "Uploading small file ({} bytes): {} -> {}",
        data.len(),
        name,
        parent
    );

    let metadata = serde_json::json!({
        "name": name,
        "parents": [parent],
    });
    let boundary = format!("dropsync_{}", uuid::Uuid::new_v4().simple());
    let body = build_multipart_body(&metadata, content_type, data, &boundary);

    let response = client
        .upload_request(Method::POST, "/files")
        .query(&[("uploadType", "multipart"), ("fields", "id,name,mimeType,size")])
        .header(
            header::CONTENT_TYPE,
            format!("multipart/related; boundary={boundary}"),
        )
        .body(body)
        .send()
        .await
        .context("Failed to send multipart upload request")?;
    if !response.status().is_success() {
        return Err(error_for_response(response).await);
    }

    let item: DriveItem = response
        .json()
        .await
        .context("Failed to parse upload response")?;

    debug!("Small upload completed: id={}, name={}", item.id, item.name);
    Ok(item)
}

// ============================================================================
// create_upload_session
// ============================================================================

/// Initiates a resumable upload session
///
/// Uses the resumable upload API: `POST /upload/files?uploadType=resumable`.
/// The session URI comes back in the `Location` header and stays valid for
/// roughly a week, accepting chunk PUTs until the content is complete.
///
/// # Arguments
/// * `client` - The authenticated DriveClient
/// * `name` - File name to create
/// * `content_type` - MIME type of the eventual payload
/// * `total` - Total payload size in bytes
/// * `parent` - Parent folder ID
///
/// # Returns
/// The session URI to PUT chunks against
///
/// # Errors
/// Returns an error if the session creation request fails
pub async fn create_upload_session(
    client: &DriveClient,
    name: &str,
    content_type: &str,
    total: u64,
    parent: &str,
) -> Result<String> {
    debug!("Creating upload session for: {} ({} bytes)", name, total);

    let metadata = serde_json::json!({
        "name": name,
        "parents": [parent],
    });

    let response = client
        .upload_request(Method::POST, "/files")
        .query(&[("uploadType", "resumable")])
        .header(header::CONTENT_TYPE, "application/json; charset=UTF-8")
        .header("X-Upload-Content-Type", content_type)
        .header("X-Upload-Content-Length", total.to_string())
        .json(&metadata)
        .send()
        .await
        .context("Failed to create upload session")?;
    if !response.status().is_success() {
        return Err(error_for_response(response).await);
    }

    let session_url = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .context("Resumable session response missing Location header")?;

    debug!("Upload session created: {}", session_url);
    Ok(session_url)
}

// ============================================================================
// upload_chunk
// ============================================================================

/// Uploads a single chunk of data to a resumable upload session
///
/// Sends a PUT request to the session URI with a `Content-Range` header
/// specifying the byte range being uploaded.
///
/// # Arguments
/// * `client` - An HTTP client (the raw reqwest client, not the DriveClient,
///   because session URIs are absolute and don't need the base URL)
/// * `session_url` - The session URI from [`create_upload_session`]
/// * `access_token` - Bearer token for authentication
/// * `data` - The chunk bytes to upload
/// * `offset` - Byte offset of this chunk within the total file
/// * `total` - Total file size in bytes
///
/// # Returns
/// - `Some(DriveItem)` with the completed file metadata on the final chunk
/// - `None` for intermediate chunks (HTTP 308 Resume Incomplete)
///
/// # Errors
/// Returns an error if the chunk upload fails
pub async fn upload_chunk(
    client: &reqwest::Client,
    session_url: &str,
    access_token: &str,
    data: &[u8],
    offset: u64,
    total: u64,
) -> Result<Option<DriveItem>> {
    let chunk_len = data.len() as u64;
    let range_end = offset + chunk_len - 1;
    let content_range = format!("bytes {}-{}/{}", offset, range_end, total);

    debug!("Uploading chunk: {} ({} bytes)", content_range, chunk_len);

    let response = client
        .put(session_url)
        .bearer_auth(access_token)
        .header(header::CONTENT_LENGTH, chunk_len.to_string())
        .header(header::CONTENT_RANGE, &content_range)
        .body(data.to_vec())
        .send()
        .await
        .context("Failed to send chunk upload request")?;

    let status = response.status();

    // 308 means Resume Incomplete here; the Range header echoes how much
    // of the content the server has so far.
    if status == StatusCode::PERMANENT_REDIRECT {
        let confirmed = response
            .headers()
            .get(header::RANGE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("none");
        debug!(range = confirmed, "Chunk accepted, session incomplete");
        return Ok(None);
    }

    if status.is_success() {
        let item: DriveItem = response
            .json()
            .await
            .context("Failed to parse final upload response")?;
        debug!("Upload session completed (status {})", status);
        return Ok(Some(item));
    }

    Err(error_for_response(response).await)
}

// ============================================================================
// upload_resumable
// ============================================================================

/// Uploads a large file through a resumable session in fixed-size chunks
///
/// This function orchestrates the entire resumable upload process:
/// 1. Creates an upload session via [`create_upload_session`]
/// 2. Splits the data into `chunk_size` chunks
/// 3. Uploads each chunk via [`upload_chunk`]
/// 4. Reports progress after each chunk via the optional callback
/// 5. Returns the final file metadata
///
/// # Arguments
/// * `client` - The authenticated DriveClient
/// * `name` - File name to create
/// * `content_type` - MIME type of the payload
/// * `parent` - Parent folder ID
/// * `data` - Complete file contents
/// * `chunk_size` - Chunk size in bytes; must be a positive multiple of 256 KiB
/// * `progress` - Optional callback `(bytes_sent, total_bytes)` called after each chunk
///
/// # Returns
/// The created file's metadata
///
/// # Errors
/// Returns an error if session creation, any chunk upload, or response parsing fails
pub async fn upload_resumable(
    client: &DriveClient,
    name: &str,
    content_type: &str,
    parent: &str,
    data: &[u8],
    chunk_size: usize,
    progress: Option<Box<dyn Fn(u64, u64) + Send>>,
) -> Result<DriveItem> {
    anyhow::ensure!(chunk_size > 0, "chunk size must be non-zero");

    let total = data.len() as u64;
    info!(
        "Starting resumable upload: {} ({} bytes, {} chunks)",
        name,
        total,
        (total + chunk_size as u64 - 1) / chunk_size as u64
    );

    // Step 1: Create upload session
    let session_url = create_upload_session(client, name, content_type, total, parent).await?;

    // Step 2: Upload chunks
    let http_client = client.http_client();
    let access_token = client.access_token();
    let mut offset: u64 = 0;
    let mut final_item: Option<DriveItem> = None;

    while offset < total {
        let end = std::cmp::min(offset + chunk_size as u64, total);
        let chunk = &data[offset as usize..end as usize];

        let result = upload_chunk(http_client, &session_url, access_token, chunk, offset, total)
            .await
            .with_context(|| {
                format!(
                    "Failed to upload chunk at offset {}/{} for {}",
                    offset, total, name
                )
            })?;

        offset = end;

        // Report progress
        if let Some(ref cb) = progress {
            cb(offset, total);
        }

        if let Some(item) = result {
            final_item = Some(item);
        }
    }

    // Step 3: The last chunk's 200/201 response carries the file metadata
    let item = final_item.context("Upload session ended without a final file response")?;

    info!(
        "Resumable upload completed: id={}, name={}, size={:?}",
        item.id, item.name, item.size
    );

    Ok(item)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ---- DriveItem deserialization tests ----

    #[test]
    fn test_drive_item_deserialization_file() {
        let json = r#"{
            "id": "1xYzAbCdEfGhIjKlMnOp",
            "name": "document.pdf",
            "mimeType": "application/pdf",
            "size": "1048576",
            "createdTime": "2025-06-15T10:30:00.000Z"
        }"#;

        let item: DriveItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, "1xYzAbCdEfGhIjKlMnOp");
        assert_eq!(item.name, "document.pdf");
        assert_eq!(item.size_bytes(), Some(1048576));
        assert!(!item.is_folder());
    }

    #[test]
    fn test_drive_item_deserialization_folder() {
        let json = r#"{
            "id": "FOLDER123",
            "name": "My Folder",
            "mimeType": "application/vnd.google-apps.folder",
            "createdTime": "2025-06-15T10:30:00.000Z"
        }"#;

        let item: DriveItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.name, "My Folder");
        assert!(item.is_folder());
        assert!(item.size.is_none());
        assert!(item.size_bytes().is_none());
    }

    #[test]
    fn test_drive_item_deserialization_minimal() {
        let json = r#"{
            "id": "ITEM_ID",
            "name": "file.txt"
        }"#;

        let item: DriveItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, "ITEM_ID");
        assert_eq!(item.name, "file.txt");
        assert!(item.mime_type.is_none());
        assert!(item.size.is_none());
        assert!(item.created_time.is_none());
    }

    #[test]
    fn test_drive_item_size_is_a_json_string() {
        // Drive serializes int64 fields as strings; a numeric size must not parse
        let json = r#"{"id": "X", "name": "f", "size": 42}"#;
        assert!(serde_json::from_str::<DriveItem>(json).is_err());
    }

    #[test]
    fn test_file_list_deserialization() {
        let json = r#"{
            "nextPageToken": "token-abc",
            "files": [
                {"id": "A", "name": "one"},
                {"id": "B", "name": "two"}
            ]
        }"#;

        let list: FileList = serde_json::from_str(json).unwrap();
        assert_eq!(list.files.len(), 2);
        assert_eq!(list.next_page_token.as_deref(), Some("token-abc"));
    }

    #[test]
    fn test_file_list_empty() {
        let list: FileList = serde_json::from_str("{}").unwrap();
        assert!(list.files.is_empty());
        assert!(list.next_page_token.is_none());
    }

    // ---- Query construction tests ----

    #[test]
    fn test_escape_query_value_plain() {
        assert_eq!(escape_query_value("Reports"), "Reports");
    }

    #[test]
    fn test_escape_query_value_single_quote() {
        assert_eq!(escape_query_value("Bob's stuff"), "Bob\\'s stuff");
    }

    #[test]
    fn test_escape_query_value_backslash() {
        assert_eq!(escape_query_value(r"a\b"), r"a\\b");
    }

    #[test]
    fn test_folder_query_root() {
        let q = folder_query("Reports", None);
        assert_eq!(
            q,
            "name = 'Reports' and mimeType = 'application/vnd.google-apps.folder' \
             and trashed = false and 'root' in parents"
        );
    }

    #[test]
    fn test_folder_query_with_parent() {
        let q = folder_query("Photos", Some("PARENT_ID"));
        assert!(q.contains("name = 'Photos'"));
        assert!(q.contains("'PARENT_ID' in parents"));
        assert!(q.contains("trashed = false"));
    }

    #[test]
    fn test_folder_query_escapes_name() {
        let q = folder_query("Bob's", None);
        assert!(q.contains("name = 'Bob\\'s'"));
    }

    // ---- Multipart body tests ----

    #[test]
    fn test_build_multipart_body_structure() {
        let metadata = serde_json::json!({"name": "a.txt", "parents": ["P"]});
        let body = build_multipart_body(&metadata, "text/plain", b"hello", "BOUNDARY");
        let text = String::from_utf8(body).unwrap();

        assert!(text.starts_with("--BOUNDARY\r\n"));
        assert!(text.contains("Content-Type: application/json; charset=UTF-8"));
        assert!(text.contains(r#""name":"a.txt""#));
        assert!(text.contains("Content-Type: text/plain\r\n\r\nhello"));
        assert!(text.ends_with("\r\n--BOUNDARY--"));
    }

    #[test]
    fn test_build_multipart_body_binary_content() {
        let metadata = serde_json::json!({"name": "b.bin", "parents": ["P"]});
        let data = [0u8, 159, 146, 150];
        let body = build_multipart_body(&metadata, "application/octet-stream", &data, "B");

        // The raw bytes must appear unmodified between the headers and terminator
        let needle: &[u8] = &data;
        assert!(body
            .windows(needle.len())
            .any(|window| window == needle));
    }

    // ---- DEFAULT_CHUNK_SIZE tests ----

    #[test]
    fn test_chunk_size_is_multiple_of_256kib() {
        // Google requires chunk sizes to be multiples of 256 KiB
        let kib_256 = 256 * 1024;
        assert_eq!(
            DEFAULT_CHUNK_SIZE % kib_256,
            0,
            "DEFAULT_CHUNK_SIZE must be a multiple of 256 KiB"
        );
    }

    #[test]
    fn test_chunk_size_is_8mib() {
        assert_eq!(DEFAULT_CHUNK_SIZE, 8 * 1024 * 1024);
    }
}
