//! Integration tests for the IRemoteStore adapter
//!
//! Exercises DriveStore through the port trait against the mock server,
//! covering DTO conversion and ID validation at the boundary.

use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dropsync_core::domain::RemoteId;
use dropsync_core::ports::IRemoteStore;
use dropsync_drive::files::FOLDER_MIME_TYPE;
use dropsync_drive::store::DriveStore;

use crate::common;

async fn setup_store() -> (MockServer, DriveStore) {
    let (server, client) = common::setup_drive_mock().await;
    let store = DriveStore::new(client).with_chunk_size(256 * 1024);
    (server, store)
}

#[tokio::test]
async fn test_store_find_folders_preserves_order() {
    let (server, store) = setup_store().await;

    common::mount_folder_list(
        &server,
        serde_json::json!([
            {"id": "OLDER_1", "name": "Reports", "mimeType": FOLDER_MIME_TYPE},
            {"id": "NEWER_2", "name": "Reports", "mimeType": FOLDER_MIME_TYPE}
        ]),
    )
    .await;

    let folders = store
        .find_folders("Reports", None)
        .await
        .expect("find_folders failed");

    assert_eq!(folders.len(), 2);
    assert_eq!(folders[0].id.as_str(), "OLDER_1");
    assert_eq!(folders[0].name, "Reports");
    assert_eq!(folders[1].id.as_str(), "NEWER_2");
}

#[tokio::test]
async fn test_store_find_folders_rejects_invalid_item_id() {
    let (server, store) = setup_store().await;

    common::mount_folder_list(
        &server,
        serde_json::json!([
            {"id": "has spaces", "name": "Broken"}
        ]),
    )
    .await;

    let result = store.find_folders("Broken", None).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_store_create_folder_returns_dto() {
    let (server, store) = setup_store().await;

    Mock::given(method("POST"))
        .and(path("/files"))
        .and(body_partial_json(serde_json::json!({
            "name": "Photos",
            "mimeType": FOLDER_MIME_TYPE,
            "parents": ["PARENT_1"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "NEW_FOLDER_1",
            "name": "Photos",
            "mimeType": FOLDER_MIME_TYPE
        })))
        .expect(1)
        .mount(&server)
        .await;

    let parent = RemoteId::new("PARENT_1".to_string()).unwrap();
    let folder = store
        .create_folder("Photos", Some(&parent))
        .await
        .expect("create_folder failed");

    assert_eq!(folder.id.as_str(), "NEW_FOLDER_1");
    assert_eq!(folder.name, "Photos");
}

#[tokio::test]
async fn test_store_upload_simple_returns_remote_id() {
    let (server, store) = setup_store().await;
    common::mount_multipart_upload(&server, "FILE_1", "a.txt", 5).await;

    let parent = RemoteId::new("PARENT_1".to_string()).unwrap();
    let id = store
        .upload_simple(b"hello", "a.txt", "text/plain", &parent)
        .await
        .expect("upload_simple failed");

    assert_eq!(id.as_str(), "FILE_1");
}

#[tokio::test]
async fn test_store_upload_resumable_returns_remote_id() {
    let (server, store) = setup_store().await;
    common::mount_resumable_session(&server, "/upload-session/store1").await;

    // 100 KB fits the 256 KiB test chunk size in one PUT
    Mock::given(method("PUT"))
        .and(path("/upload-session/store1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "FILE_2",
            "name": "big.bin",
            "size": "100000"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let parent = RemoteId::new("PARENT_1".to_string()).unwrap();
    let data = vec![1u8; 100_000];
    let id = store
        .upload_resumable(&data, "big.bin", "application/octet-stream", &parent, None)
        .await
        .expect("upload_resumable failed");

    assert_eq!(id.as_str(), "FILE_2");
}
