//! Shared test helpers for Drive API integration tests
//!
//! Provides wiremock-based mock server setup for Google Drive v3 endpoints.
//! Each helper mounts the necessary mock endpoints against a server that
//! serves as both the metadata and upload base for a DriveClient.

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dropsync_drive::client::DriveClient;

/// Starts a mock server and returns it together with a DriveClient whose
/// API base and upload base both point at the server.
pub async fn setup_drive_mock() -> (MockServer, DriveClient) {
    let server = MockServer::start().await;
    let client = DriveClient::with_base_urls("test-access-token", server.uri(), server.uri());
    (server, client)
}

/// Mounts a files.list endpoint returning a single page with the given items.
pub async fn mount_folder_list(server: &MockServer, files: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "files": files
        })))
        .mount(server)
        .await;
}

/// Mounts a multipart upload endpoint returning the given item metadata.
///
/// Matches only requests carrying `uploadType=multipart`, so it can coexist
/// with folder-create mocks on the same `/files` path.
pub async fn mount_multipart_upload(server: &MockServer, id: &str, name: &str, size: u64) {
    Mock::given(method("POST"))
        .and(path("/files"))
        .and(query_param("uploadType", "multipart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": id,
            "name": name,
            "size": size.to_string()
        })))
        .mount(server)
        .await;
}

/// Mounts a resumable session initiation endpoint.
///
/// The returned `Location` header points at `session_path` on the same
/// mock server, so chunk PUTs can be mocked with ordinary path matchers.
pub async fn mount_resumable_session(server: &MockServer, session_path: &str) {
    let session_url = format!("{}{}", server.uri(), session_path);
    Mock::given(method("POST"))
        .and(path("/files"))
        .and(query_param("uploadType", "resumable"))
        .respond_with(ResponseTemplate::new(200).insert_header("Location", session_url.as_str()))
        .mount(server)
        .await;
}
