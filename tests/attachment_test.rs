//! Integration tests for attachment upload validation, round-trips, and
//! database/filesystem consistency.

mod helpers;

use http::StatusCode;

/// Minimal but valid PNG header.
const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

#[tokio::test]
async fn test_pdf_round_trip() {
    let app = helpers::TestApp::new().await;
    let todo = app.create_todo("With attachment").await;

    let uploaded = app
        .upload(todo, "report.pdf", "application/pdf", b"%PDF")
        .await;
    assert_eq!(uploaded.status, StatusCode::CREATED);
    assert_eq!(uploaded.data()["original_name"], "report.pdf");
    assert_eq!(uploaded.data()["mime_type"], "application/pdf");
    assert_eq!(uploaded.data()["size_bytes"], 4);
    let attachment_id = uploaded.data_id();

    let downloaded = app
        .request("GET", &format!("/api/attachments/{attachment_id}"), None)
        .await;
    assert_eq!(downloaded.status, StatusCode::OK);
    assert_eq!(downloaded.bytes.as_ref(), b"%PDF");
    assert_eq!(
        downloaded.headers.get("content-type").unwrap(),
        "application/pdf"
    );
    let disposition = downloaded
        .headers
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(disposition.contains("filename=\"report.pdf\""));
    assert!(disposition.contains("filename*=UTF-8''report.pdf"));
}

#[tokio::test]
async fn test_mismatched_content_leaves_no_row_and_no_file() {
    let app = helpers::TestApp::new().await;
    let todo = app.create_todo("Mismatch target").await;

    // ZIP magic under a .pdf name.
    let response = app
        .upload(todo, "fake.pdf", "application/pdf", b"PK\x03\x04rest")
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(
        response.body["message"]
            .as_str()
            .unwrap()
            .contains("does not match")
    );
    assert_eq!(app.attachment_count(todo).await, 0);
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_oversized_upload_is_rejected_before_any_write() {
    let app = helpers::TestApp::with_config(|config| {
        config.storage.max_upload_size_bytes = 1024;
    })
    .await;
    let todo = app.create_todo("Oversize target").await;

    let big = vec![0x41u8; 2048];
    let response = app.upload(todo, "big.txt", "text/plain", &big).await;

    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(app.attachment_count(todo).await, 0);
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_disallowed_extension_is_rejected() {
    let app = helpers::TestApp::new().await;
    let todo = app.create_todo("Exe target").await;

    let response = app
        .upload(todo, "malware.exe", "application/octet-stream", b"MZ")
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(
        response.body["message"]
            .as_str()
            .unwrap()
            .contains("not allowed")
    );
}

#[tokio::test]
async fn test_missing_extension_is_rejected() {
    let app = helpers::TestApp::new().await;
    let todo = app.create_todo("No extension").await;

    let response = app.upload(todo, "README", "text/plain", b"hello").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_directory_components_are_stripped() {
    let app = helpers::TestApp::new().await;
    let todo = app.create_todo("Traversal target").await;

    let response = app
        .upload(todo, "../../etc/nested/report.pdf", "application/pdf", b"%PDF")
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.data()["original_name"], "report.pdf");

    // The stored name is generated, not client-controlled, and lives
    // flat inside the attachments directory.
    let stored = app.stored_files();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].ends_with(".pdf"));
    assert_ne!(stored[0], "report.pdf");
}

#[tokio::test]
async fn test_upload_to_unknown_todo_is_404() {
    let app = helpers::TestApp::new().await;

    let response = app
        .upload(
            uuid::Uuid::new_v4(),
            "report.pdf",
            "application/pdf",
            b"%PDF",
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_text_formats_skip_signature_check() {
    let app = helpers::TestApp::new().await;
    let todo = app.create_todo("Notes").await;

    let response = app
        .upload(todo, "notes.txt", "text/plain", b"any bytes at all")
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_png_upload_and_mime_fallback() {
    let app = helpers::TestApp::new().await;
    let todo = app.create_todo("Image holder").await;

    // No content type supplied: the MIME type falls back to the
    // validated extension.
    let response = app.upload(todo, "pixel.png", "", PNG_MAGIC).await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.data()["mime_type"], "image/png");
}

#[tokio::test]
async fn test_delete_attachment_removes_row_and_file() {
    let app = helpers::TestApp::new().await;
    let todo = app.create_todo("Delete attachment").await;

    let uploaded = app
        .upload(todo, "report.pdf", "application/pdf", b"%PDF")
        .await;
    let attachment_id = uploaded.data_id();
    assert_eq!(app.stored_files().len(), 1);

    let deleted = app
        .request("DELETE", &format!("/api/attachments/{attachment_id}"), None)
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    assert!(app.stored_files().is_empty());

    let lookup = app
        .request("GET", &format!("/api/attachments/{attachment_id}"), None)
        .await;
    assert_eq!(lookup.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_todo_cascades_to_attachment_files() {
    let app = helpers::TestApp::new().await;
    let parent = app.create_todo("Parent with files").await;
    let child = app.create_subtask(parent, "Child with files").await;

    app.upload(parent, "a.pdf", "application/pdf", b"%PDF").await;
    app.upload(child, "b.pdf", "application/pdf", b"%PDF").await;
    assert_eq!(app.stored_files().len(), 2);

    let deleted = app
        .request("DELETE", &format!("/api/todos/{parent}"), None)
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    assert_eq!(app.attachment_count(parent).await, 0);
    assert_eq!(app.attachment_count(child).await, 0);
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_dangling_row_reads_as_not_found() {
    let app = helpers::TestApp::new().await;
    let todo = app.create_todo("Dangling").await;

    let uploaded = app
        .upload(todo, "report.pdf", "application/pdf", b"%PDF")
        .await;
    let attachment_id = uploaded.data_id();

    // Remove the backing file out from under the row.
    let dir = app.state.config.storage.attachments_dir.clone();
    for file in app.stored_files() {
        std::fs::remove_file(std::path::Path::new(&dir).join(file))
            .expect("failed to remove backing file");
    }
    assert_eq!(app.attachment_count(todo).await, 1);

    let lookup = app
        .request("GET", &format!("/api/attachments/{attachment_id}"), None)
        .await;
    assert_eq!(lookup.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_orphan_sweep_removes_unreferenced_files() {
    let app = helpers::TestApp::new().await;
    let todo = app.create_todo("Sweep").await;

    app.upload(todo, "keep.pdf", "application/pdf", b"%PDF").await;

    // Simulate a file left behind by an aborted upload.
    let orphan = app
        .state
        .attachment_service
        .sweep_orphans()
        .await
        .expect("sweep failed");
    assert_eq!(orphan, 0);

    std::fs::write(
        std::path::Path::new(&app.state.config.storage.attachments_dir).join("orphan.bin"),
        b"garbage",
    )
    .expect("failed to plant orphan");

    let removed = app
        .state
        .attachment_service
        .sweep_orphans()
        .await
        .expect("sweep failed");
    assert_eq!(removed, 1);
    assert_eq!(app.stored_files().len(), 1);
}
