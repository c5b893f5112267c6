//! Integration tests for upload operations
//!
//! Verifies multipart uploads and chunked resumable sessions, including
//! the 308 Resume Incomplete handshake and progress reporting.

use std::sync::{Arc, Mutex};

use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use dropsync_drive::files;
use dropsync_drive::DriveError;

use crate::common;

// ============================================================================
// Multipart upload tests
// ============================================================================

#[tokio::test]
async fn test_multipart_upload_returns_item() {
    let (server, client) = common::setup_drive_mock().await;
    common::mount_multipart_upload(&server, "UPLOAD_1", "notes.txt", 34).await;

    let data = b"Small file content for upload test";
    let item = files::upload_multipart(&client, "notes.txt", "text/plain", "PARENT_1", data)
        .await
        .expect("Multipart upload failed");

    assert_eq!(item.id, "UPLOAD_1");
    assert_eq!(item.name, "notes.txt");
    assert_eq!(item.size_bytes(), Some(34));
}

#[tokio::test]
async fn test_multipart_upload_sends_metadata_and_content() {
    let (server, client) = common::setup_drive_mock().await;

    // The multipart/related body must carry the metadata JSON part and the
    // content part with its own Content-Type header
    Mock::given(method("POST"))
        .and(path("/files"))
        .and(query_param("uploadType", "multipart"))
        .and(body_string_contains(r#""name":"photo.jpg""#))
        .and(body_string_contains(r#""parents":["PARENT_2"]"#))
        .and(body_string_contains("Content-Type: image/jpeg"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "UPLOAD_2",
            "name": "photo.jpg"
        })))
        .expect(1)
        .mount(&server)
        .await;

    files::upload_multipart(&client, "photo.jpg", "image/jpeg", "PARENT_2", b"jpeg bytes")
        .await
        .expect("Multipart upload failed");
}

#[tokio::test]
async fn test_multipart_upload_zero_byte_file() {
    let (server, client) = common::setup_drive_mock().await;
    common::mount_multipart_upload(&server, "EMPTY_1", "empty.bin", 0).await;

    let item = files::upload_multipart(
        &client,
        "empty.bin",
        "application/octet-stream",
        "PARENT_1",
        &[],
    )
    .await
    .expect("Zero-byte upload failed");

    assert_eq!(item.id, "EMPTY_1");
    assert_eq!(item.size_bytes(), Some(0));
}

// ============================================================================
// Resumable upload tests
// ============================================================================

#[tokio::test]
async fn test_resumable_upload_single_chunk() {
    let (server, client) = common::setup_drive_mock().await;
    common::mount_resumable_session(&server, "/upload-session/s1").await;

    // 100 KiB fits in one 256 KiB chunk, so the sole PUT returns the item
    let data = vec![7u8; 100 * 1024];
    Mock::given(method("PUT"))
        .and(path("/upload-session/s1"))
        .and(header(
            "Content-Range",
            format!("bytes 0-{}/{}", data.len() - 1, data.len()).as_str(),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "BIG_1",
            "name": "archive.bin",
            "size": data.len().to_string()
        })))
        .expect(1)
        .mount(&server)
        .await;

    let item = files::upload_resumable(
        &client,
        "archive.bin",
        "application/octet-stream",
        "PARENT_1",
        &data,
        256 * 1024,
        None,
    )
    .await
    .expect("Resumable upload failed");

    assert_eq!(item.id, "BIG_1");
    assert_eq!(item.size_bytes(), Some(102_400));
}

#[tokio::test]
async fn test_resumable_upload_chunked_with_progress() {
    let (server, client) = common::setup_drive_mock().await;
    common::mount_resumable_session(&server, "/upload-session/s2").await;

    let chunk: usize = 256 * 1024;
    let total: usize = 600_000;
    let data: Vec<u8> = (0..total).map(|i| (i % 251) as u8).collect();

    // First two chunks come back as 308 Resume Incomplete
    Mock::given(method("PUT"))
        .and(path("/upload-session/s2"))
        .and(header(
            "Content-Range",
            format!("bytes 0-{}/{}", chunk - 1, total).as_str(),
        ))
        .respond_with(
            ResponseTemplate::new(308)
                .insert_header("Range", format!("bytes=0-{}", chunk - 1).as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/upload-session/s2"))
        .and(header(
            "Content-Range",
            format!("bytes {}-{}/{}", chunk, 2 * chunk - 1, total).as_str(),
        ))
        .respond_with(
            ResponseTemplate::new(308)
                .insert_header("Range", format!("bytes=0-{}", 2 * chunk - 1).as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;

    // Final chunk returns the completed file metadata
    Mock::given(method("PUT"))
        .and(path("/upload-session/s2"))
        .and(header(
            "Content-Range",
            format!("bytes {}-{}/{}", 2 * chunk, total - 1, total).as_str(),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "BIG_2",
            "name": "video.mp4",
            "size": total.to_string()
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reported: Arc<Mutex<Vec<(u64, u64)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&reported);
    let progress: Box<dyn Fn(u64, u64) + Send> = Box::new(move |sent, total_bytes| {
        sink.lock().unwrap().push((sent, total_bytes));
    });

    let item = files::upload_resumable(
        &client,
        "video.mp4",
        "video/mp4",
        "PARENT_1",
        &data,
        chunk,
        Some(progress),
    )
    .await
    .expect("Chunked upload failed");

    assert_eq!(item.id, "BIG_2");

    // Progress advances once per chunk and lands exactly on the total
    let calls = reported.lock().unwrap();
    assert_eq!(
        *calls,
        vec![
            (chunk as u64, total as u64),
            (2 * chunk as u64, total as u64),
            (total as u64, total as u64),
        ]
    );
}

#[tokio::test]
async fn test_resumable_session_without_location_fails() {
    let (server, client) = common::setup_drive_mock().await;

    Mock::given(method("POST"))
        .and(path("/files"))
        .and(query_param("uploadType", "resumable"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let result = files::upload_resumable(
        &client,
        "f.bin",
        "application/octet-stream",
        "PARENT_1",
        &[1, 2, 3],
        256 * 1024,
        None,
    )
    .await;

    let err = result.unwrap_err();
    assert!(format!("{err:#}").contains("Location header"));
}

#[tokio::test]
async fn test_resumable_chunk_failure_reports_offset() {
    let (server, client) = common::setup_drive_mock().await;
    common::mount_resumable_session(&server, "/upload-session/s3").await;

    Mock::given(method("PUT"))
        .and(path("/upload-session/s3"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
        .mount(&server)
        .await;

    let data = vec![0u8; 300_000];
    let result = files::upload_resumable(
        &client,
        "f.bin",
        "application/octet-stream",
        "PARENT_1",
        &data,
        256 * 1024,
        None,
    )
    .await;

    let err = result.unwrap_err();
    assert!(format!("{err:#}").contains("offset 0"));
    assert!(matches!(
        err.downcast_ref::<DriveError>(),
        Some(DriveError::ServerError(_))
    ));
}
