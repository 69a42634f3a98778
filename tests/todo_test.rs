//! Integration tests for todo CRUD, completion, and list filtering.

mod helpers;

use http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_create_and_get_todo() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/todos",
            Some(json!({
                "title": "Write the report",
                "description": "quarterly numbers",
                "priority": 7
            })),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let id = response.data_id();
    assert_eq!(response.data()["title"], "Write the report");
    assert_eq!(response.data()["priority"], 7);
    assert_eq!(response.data()["completed"], false);
    assert!(response.data()["completed_at"].is_null());

    let fetched = app.request("GET", &format!("/api/todos/{id}"), None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.data()["title"], "Write the report");
    assert!(fetched.data()["subtasks"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_get_unknown_todo_is_404() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request(
            "GET",
            "/api/todos/00000000-0000-0000-0000-999999999999",
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_rejects_empty_title() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request("POST", "/api/todos", Some(json!({ "title": "" })))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_rejects_out_of_range_priority() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/todos",
            Some(json!({ "title": "x", "priority": 11 })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_scalar_fields() {
    let app = helpers::TestApp::new().await;
    let id = app.create_todo("Original").await;

    let response = app
        .request(
            "PATCH",
            &format!("/api/todos/{id}"),
            Some(json!({ "title": "Updated", "priority": 9 })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["title"], "Updated");
    assert_eq!(response.data()["priority"], 9);
}

#[tokio::test]
async fn test_completion_invariant_through_updates() {
    let app = helpers::TestApp::new().await;
    let id = app.create_todo("Complete me").await;

    let done = app
        .request(
            "PATCH",
            &format!("/api/todos/{id}"),
            Some(json!({ "completed": true })),
        )
        .await;
    assert_eq!(done.status, StatusCode::OK);
    assert_eq!(done.data()["completed"], true);
    assert!(!done.data()["completed_at"].is_null());

    let undone = app
        .request(
            "PATCH",
            &format!("/api/todos/{id}"),
            Some(json!({ "completed": false })),
        )
        .await;
    assert_eq!(undone.data()["completed"], false);
    assert!(undone.data()["completed_at"].is_null());
}

#[tokio::test]
async fn test_complete_endpoint_sets_timestamp() {
    let app = helpers::TestApp::new().await;
    let id = app.create_todo("Complete via endpoint").await;

    let response = app
        .request("POST", &format!("/api/todos/{id}/complete"), None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["completed"], true);
    assert!(!response.data()["completed_at"].is_null());
}

#[tokio::test]
async fn test_delete_cascades_to_subtasks() {
    let app = helpers::TestApp::new().await;
    let parent = app.create_todo("Parent").await;
    let child = app.create_subtask(parent, "Child").await;
    let grandchild = app.create_subtask(child, "Grandchild").await;

    let response = app
        .request("DELETE", &format!("/api/todos/{parent}"), None)
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    for id in [parent, child, grandchild] {
        let lookup = app.request("GET", &format!("/api/todos/{id}"), None).await;
        assert_eq!(lookup.status, StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn test_delete_unknown_todo_is_404() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request(
            "DELETE",
            "/api/todos/00000000-0000-0000-0000-999999999999",
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_with_unknown_tags_is_all_or_nothing() {
    let app = helpers::TestApp::new().await;

    let tag = app
        .request("POST", "/api/tags", Some(json!({ "name": format!("t-{}", uuid::Uuid::new_v4()) })))
        .await;
    assert_eq!(tag.status, StatusCode::CREATED);
    let tag_id = tag.data_id();

    let missing = uuid::Uuid::new_v4();
    let response = app
        .request(
            "POST",
            "/api/todos",
            Some(json!({ "title": "tagged", "tag_ids": [tag_id, missing] })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(
        response.body["message"]
            .as_str()
            .unwrap()
            .contains(&missing.to_string())
    );
}

#[tokio::test]
async fn test_list_filters_and_ordering() {
    let app = helpers::TestApp::new().await;

    // Scope the listing to a category unique to this test run.
    let category = app
        .request(
            "POST",
            "/api/categories",
            Some(json!({ "name": format!("cat-{}", uuid::Uuid::new_v4()) })),
        )
        .await;
    let category_id = category.data_id();

    for (title, priority) in [("low", 2), ("high", 9), ("mid", 5)] {
        let response = app
            .request(
                "POST",
                "/api/todos",
                Some(json!({
                    "title": title,
                    "priority": priority,
                    "category_id": category_id
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
    }

    let listed = app
        .request(
            "GET",
            &format!("/api/todos?category_id={category_id}"),
            None,
        )
        .await;
    assert_eq!(listed.status, StatusCode::OK);

    let items = listed.data()["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(listed.data()["total"], 3);

    // Ordered by priority descending.
    let priorities: Vec<i64> = items
        .iter()
        .map(|i| i["priority"].as_i64().unwrap())
        .collect();
    assert_eq!(priorities, vec![9, 5, 2]);

    let filtered = app
        .request(
            "GET",
            &format!("/api/todos?category_id={category_id}&priority_min=5"),
            None,
        )
        .await;
    let filtered_items = filtered.data()["items"].as_array().unwrap();
    assert_eq!(filtered_items.len(), 2);
    assert!(
        filtered_items
            .iter()
            .all(|i| i["priority"].as_i64().unwrap() >= 5)
    );
}

#[tokio::test]
async fn test_list_loads_nested_subtasks() {
    let app = helpers::TestApp::new().await;

    let category = app
        .request(
            "POST",
            "/api/categories",
            Some(json!({ "name": format!("cat-{}", uuid::Uuid::new_v4()) })),
        )
        .await;
    let category_id = category.data_id();

    let root = app
        .request(
            "POST",
            "/api/todos",
            Some(json!({ "title": "root", "category_id": category_id })),
        )
        .await
        .data_id();
    let child = app.create_subtask(root, "child").await;
    app.create_subtask(child, "grandchild").await;

    let listed = app
        .request(
            "GET",
            &format!("/api/todos?category_id={category_id}"),
            None,
        )
        .await;

    let items = listed.data()["items"].as_array().unwrap();
    // Subtasks are not listed as roots.
    assert_eq!(items.len(), 1);

    let subtasks = items[0]["subtasks"].as_array().unwrap();
    assert_eq!(subtasks.len(), 1);
    assert_eq!(subtasks[0]["title"], "child");
    assert_eq!(subtasks[0]["subtasks"][0]["title"], "grandchild");
}

#[tokio::test]
async fn test_health_check() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "healthy");
}
