//! Integration tests for folder lookup and creation
//!
//! Verifies exact-name folder queries, pagination, and metadata-only
//! folder creation against a wiremock-based Drive API mock server.

use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use dropsync_drive::files::{self, FOLDER_MIME_TYPE};

use crate::common;

// ============================================================================
// Folder lookup tests
// ============================================================================

#[tokio::test]
async fn test_list_folders_returns_matches_in_order() {
    let (server, client) = common::setup_drive_mock().await;

    common::mount_folder_list(
        &server,
        serde_json::json!([
            {
                "id": "OLDER_1",
                "name": "Reports",
                "mimeType": FOLDER_MIME_TYPE,
                "createdTime": "2025-01-01T00:00:00.000Z"
            },
            {
                "id": "NEWER_2",
                "name": "Reports",
                "mimeType": FOLDER_MIME_TYPE,
                "createdTime": "2025-06-01T00:00:00.000Z"
            }
        ]),
    )
    .await;

    let folders = files::list_folders(&client, "Reports", None)
        .await
        .expect("Folder query failed");

    assert_eq!(folders.len(), 2);
    assert_eq!(folders[0].id, "OLDER_1");
    assert_eq!(folders[1].id, "NEWER_2");
    assert!(folders.iter().all(files::DriveItem::is_folder));
}

#[tokio::test]
async fn test_list_folders_empty_when_no_match() {
    let (server, client) = common::setup_drive_mock().await;
    common::mount_folder_list(&server, serde_json::json!([])).await;

    let folders = files::list_folders(&client, "Nothing Here", None)
        .await
        .expect("Folder query failed");

    assert!(folders.is_empty());
}

#[tokio::test]
async fn test_list_folders_sends_scoped_escaped_query() {
    let (server, client) = common::setup_drive_mock().await;

    // The name's single quote must be backslash-escaped inside the query
    let expected_query = "name = 'Bob\\'s files' \
                          and mimeType = 'application/vnd.google-apps.folder' \
                          and trashed = false and 'PARENT_9' in parents";
    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("q", expected_query))
        .and(query_param("orderBy", "createdTime"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "files": [] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let folders = files::list_folders(&client, "Bob's files", Some("PARENT_9"))
        .await
        .expect("Folder query failed");

    assert!(folders.is_empty());
}

#[tokio::test]
async fn test_list_folders_follows_pagination() {
    let (server, client) = common::setup_drive_mock().await;

    // Page 1 carries a nextPageToken; exhausted after one request so the
    // follow-up falls through to the page 2 mock.
    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "files": [{"id": "PAGE1_A", "name": "Inbox"}],
            "nextPageToken": "tok-page-2"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    // Page 2 requires the token handed out by page 1
    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("pageToken", "tok-page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "files": [{"id": "PAGE2_B", "name": "Inbox"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let folders = files::list_folders(&client, "Inbox", None)
        .await
        .expect("Paginated folder query failed");

    assert_eq!(folders.len(), 2);
    assert_eq!(folders[0].id, "PAGE1_A");
    assert_eq!(folders[1].id, "PAGE2_B");
}

// ============================================================================
// Folder creation tests
// ============================================================================

#[tokio::test]
async fn test_create_folder_at_root() {
    let (server, client) = common::setup_drive_mock().await;

    Mock::given(method("POST"))
        .and(path("/files"))
        .and(body_partial_json(serde_json::json!({
            "name": "Projects",
            "mimeType": FOLDER_MIME_TYPE
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "CREATED_1",
            "name": "Projects",
            "mimeType": FOLDER_MIME_TYPE,
            "createdTime": "2026-02-01T09:00:00.000Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let item = files::create_folder(&client, "Projects", None)
        .await
        .expect("Folder create failed");

    assert_eq!(item.id, "CREATED_1");
    assert_eq!(item.name, "Projects");
    assert!(item.is_folder());
}

#[tokio::test]
async fn test_create_folder_under_parent() {
    let (server, client) = common::setup_drive_mock().await;

    Mock::given(method("POST"))
        .and(path("/files"))
        .and(body_partial_json(serde_json::json!({
            "name": "2026",
            "mimeType": FOLDER_MIME_TYPE,
            "parents": ["PARENT_7"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "CREATED_2",
            "name": "2026",
            "mimeType": FOLDER_MIME_TYPE,
            "createdTime": "2026-02-01T09:00:00.000Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let item = files::create_folder(&client, "2026", Some("PARENT_7"))
        .await
        .expect("Nested folder create failed");

    assert_eq!(item.id, "CREATED_2");
}
