//! Integration tests for categories, tags, priorities, and API key auth.

mod helpers;

use http::StatusCode;
use serde_json::json;
use uuid::Uuid;

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4())
}

#[tokio::test]
async fn test_category_crud() {
    let app = helpers::TestApp::new().await;
    let name = unique("work");

    let created = app
        .request(
            "POST",
            "/api/categories",
            Some(json!({ "name": name, "color": "#FF8800", "icon": "briefcase" })),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.data_id();

    // Duplicate name is a conflict.
    let duplicate = app
        .request("POST", "/api/categories", Some(json!({ "name": name })))
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let renamed = app
        .request(
            "PATCH",
            &format!("/api/categories/{id}"),
            Some(json!({ "name": unique("renamed") })),
        )
        .await;
    assert_eq!(renamed.status, StatusCode::OK);
    // Untouched fields survive a partial update.
    assert_eq!(renamed.data()["color"], "#FF8800");

    let deleted = app
        .request("DELETE", &format!("/api/categories/{id}"), None)
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let lookup = app
        .request("GET", &format!("/api/categories/{id}"), None)
        .await;
    assert_eq!(lookup.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_color_is_rejected() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/categories",
            Some(json!({ "name": unique("bad-color"), "color": "red" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_deleting_category_keeps_todos() {
    let app = helpers::TestApp::new().await;

    let category = app
        .request(
            "POST",
            "/api/categories",
            Some(json!({ "name": unique("doomed") })),
        )
        .await;
    let category_id = category.data_id();

    let todo = app
        .request(
            "POST",
            "/api/todos",
            Some(json!({ "title": "categorized", "category_id": category_id })),
        )
        .await;
    let todo_id = todo.data_id();

    let deleted = app
        .request("DELETE", &format!("/api/categories/{category_id}"), None)
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    // The todo survives with its category reference nulled.
    let after = app
        .request("GET", &format!("/api/todos/{todo_id}"), None)
        .await;
    assert_eq!(after.status, StatusCode::OK);
    assert!(after.data()["category_id"].is_null());
}

#[tokio::test]
async fn test_tag_crud_and_association_cleanup() {
    let app = helpers::TestApp::new().await;

    let tag = app
        .request(
            "POST",
            "/api/tags",
            Some(json!({ "name": unique("urgent"), "color": "#FF0000" })),
        )
        .await;
    assert_eq!(tag.status, StatusCode::CREATED);
    let tag_id = tag.data_id();

    let todo = app
        .request(
            "POST",
            "/api/todos",
            Some(json!({ "title": "tagged", "tag_ids": [tag_id] })),
        )
        .await;
    assert_eq!(todo.status, StatusCode::CREATED);
    let todo_id = todo.data_id();
    assert_eq!(todo.data()["tags"].as_array().unwrap().len(), 1);

    // Deleting the tag removes the association only.
    let deleted = app
        .request("DELETE", &format!("/api/tags/{tag_id}"), None)
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let after = app
        .request("GET", &format!("/api/todos/{todo_id}"), None)
        .await;
    assert_eq!(after.status, StatusCode::OK);
    assert!(after.data()["tags"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_replacing_tag_set_is_all_or_nothing() {
    let app = helpers::TestApp::new().await;

    let tag = app
        .request("POST", "/api/tags", Some(json!({ "name": unique("keep") })))
        .await;
    let tag_id = tag.data_id();

    let todo = app
        .request(
            "POST",
            "/api/todos",
            Some(json!({ "title": "retag me", "tag_ids": [tag_id] })),
        )
        .await;
    let todo_id = todo.data_id();

    let response = app
        .request(
            "PATCH",
            &format!("/api/todos/{todo_id}"),
            Some(json!({ "tag_ids": [Uuid::new_v4()] })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    // The original tag set is untouched.
    let after = app
        .request("GET", &format!("/api/todos/{todo_id}"), None)
        .await;
    assert_eq!(after.data()["tags"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_priorities_are_seeded_and_updatable() {
    let app = helpers::TestApp::new().await;

    let listed = app.request("GET", "/api/priorities", None).await;
    assert_eq!(listed.status, StatusCode::OK);
    let levels = listed.data().as_array().unwrap();
    assert_eq!(levels.len(), 10);
    assert_eq!(levels[0]["level"], 1);
    assert_eq!(levels[9]["level"], 10);

    let out_of_range = app
        .request("PUT", "/api/priorities/0", Some(json!({ "name": "Zero" })))
        .await;
    assert_eq!(out_of_range.status, StatusCode::BAD_REQUEST);

    let renamed = app
        .request(
            "PUT",
            "/api/priorities/7",
            Some(json!({ "name": "Important" })),
        )
        .await;
    assert_eq!(renamed.status, StatusCode::OK);
    assert_eq!(renamed.data()["name"], "Important");

    // The write invalidated the cache, so the next read is fresh.
    let relisted = app.request("GET", "/api/priorities", None).await;
    let fresh = relisted.data().as_array().unwrap();
    assert_eq!(fresh[6]["name"], "Important");

    // Restore the seeded name for other runs.
    app.request("PUT", "/api/priorities/7", Some(json!({ "name": "High" })))
        .await;
}

#[tokio::test]
async fn test_api_key_is_enforced_when_configured() {
    let app = helpers::TestApp::with_config(|config| {
        config.auth.api_key = Some("test-secret".to_string());
    })
    .await;

    // Health stays open.
    let health = app.request("GET", "/health", None).await;
    assert_eq!(health.status, StatusCode::OK);

    let denied = app.request("GET", "/api/todos", None).await;
    assert_eq!(denied.status, StatusCode::UNAUTHORIZED);
    assert_eq!(denied.headers.get("www-authenticate").unwrap(), "ApiKey");

    let wrong = app
        .request("GET", "/api/todos?api_key=wrong", None)
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let via_query = app
        .request("GET", "/api/todos?api_key=test-secret", None)
        .await;
    assert_eq!(via_query.status, StatusCode::OK);

    let via_header = {
        let request = http::Request::builder()
            .method("GET")
            .uri("/api/todos")
            .header("x-api-key", "test-secret")
            .body(axum::body::Body::empty())
            .unwrap();
        use tower::ServiceExt;
        app.router.clone().oneshot(request).await.unwrap()
    };
    assert_eq!(via_header.status(), StatusCode::OK);
}
