//! Integration tests for Drive API error classification
//!
//! Verifies that HTTP error statuses surface as the right [`DriveError`]
//! variant through the anyhow chain, so callers can branch on them.

use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dropsync_drive::{files, DriveError};

use crate::common;

async fn mount_list_error(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_unauthorized_maps_to_drive_error() {
    let (server, client) = common::setup_drive_mock().await;
    mount_list_error(
        &server,
        ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {"code": 401, "message": "Invalid Credentials"}
        })),
    )
    .await;

    let err = files::list_folders(&client, "X", None).await.unwrap_err();
    match err.downcast_ref::<DriveError>() {
        Some(DriveError::Unauthorized(detail)) => {
            assert!(detail.contains("Invalid Credentials"));
        }
        other => panic!("expected Unauthorized, got {other:?}"),
    }
}

#[tokio::test]
async fn test_not_found_maps_to_drive_error() {
    let (server, client) = common::setup_drive_mock().await;
    mount_list_error(
        &server,
        ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": {"code": 404, "message": "File not found"}
        })),
    )
    .await;

    let err = files::list_folders(&client, "X", Some("GONE_PARENT"))
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DriveError>(),
        Some(DriveError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_rate_limit_carries_retry_after() {
    let (server, client) = common::setup_drive_mock().await;
    mount_list_error(
        &server,
        ResponseTemplate::new(429)
            .insert_header("Retry-After", "7")
            .set_body_string("rateLimitExceeded"),
    )
    .await;

    let err = files::list_folders(&client, "X", None).await.unwrap_err();
    match err.downcast_ref::<DriveError>() {
        Some(DriveError::TooManyRequests { retry_after }) => {
            assert_eq!(*retry_after, Some(Duration::from_secs(7)));
        }
        other => panic!("expected TooManyRequests, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_maps_to_drive_error() {
    let (server, client) = common::setup_drive_mock().await;
    mount_list_error(
        &server,
        ResponseTemplate::new(503).set_body_string("Service unavailable"),
    )
    .await;

    let err = files::list_folders(&client, "X", None).await.unwrap_err();
    match err.downcast_ref::<DriveError>() {
        Some(DriveError::ServerError(detail)) => {
            assert!(detail.contains("503"));
        }
        other => panic!("expected ServerError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unexpected_status_maps_to_invalid_response() {
    let (server, client) = common::setup_drive_mock().await;
    mount_list_error(&server, ResponseTemplate::new(418)).await;

    let err = files::list_folders(&client, "X", None).await.unwrap_err();
    match err.downcast_ref::<DriveError>() {
        Some(DriveError::InvalidResponse(detail)) => {
            assert!(detail.contains("418"));
        }
        other => panic!("expected InvalidResponse, got {other:?}"),
    }
}
