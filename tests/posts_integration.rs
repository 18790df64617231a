use axum::http::StatusCode;
use axum_test::TestServer;
use postdex::{
    Config, create_app,
    index::{DynDocumentIndex, providers::memory::MemoryIndex},
};
use serde_json::{Value, json};
use std::{collections::HashSet, sync::Arc};
use tempfile::TempDir;
use uuid::Uuid;

fn setup_test_server() -> (TempDir, TestServer) {
    let temp_dir = TempDir::new().unwrap();

    let mut config = Config::default();
    config.uploads.directory = temp_dir.path().join("public");

    let index: DynDocumentIndex = Arc::new(MemoryIndex::default());
    let app = create_app(config, index);
    let server = TestServer::new(app).unwrap();

    (temp_dir, server)
}

#[tokio::test]
async fn test_create_then_fetch_post() {
    let (_temp_dir, server) = setup_test_server();

    let post = json!({
        "id": "hello-world",
        "title": "Hello, World",
        "tags": ["intro", "meta"],
        "description": "The first post",
        "content": "Welcome to the blog."
    });

    let response = server.post("/posts").json(&post).await;
    response.assert_status_ok();
    let ack: Value = response.json();
    assert_eq!(ack["postId"], "hello-world");
    assert!(ack["taskId"].is_u64());

    let response = server.get("/posts/hello-world").await;
    response.assert_status_ok();
    let fetched: Value = response.json();
    assert_eq!(fetched, post);
}

#[tokio::test]
async fn test_create_without_id_generates_unique_uuids() {
    let (_temp_dir, server) = setup_test_server();

    let mut ids = HashSet::new();
    for i in 0..5 {
        let response = server
            .post("/posts")
            .json(&json!({ "title": format!("Untitled {}", i) }))
            .await;
        response.assert_status_ok();

        let ack: Value = response.json();
        let post_id = ack["postId"].as_str().unwrap().to_string();
        assert!(Uuid::parse_str(&post_id).is_ok());
        assert!(ids.insert(post_id));
    }
}

#[tokio::test]
async fn test_invalid_json_is_bad_request() {
    let (_temp_dir, server) = setup_test_server();

    let response = server
        .post("/posts")
        .content_type("application/json")
        .bytes("{not json".into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid JSON");
}

#[tokio::test]
async fn test_null_tags_are_accepted() {
    let (_temp_dir, server) = setup_test_server();

    server
        .post("/posts")
        .json(&json!({ "id": "untagged", "title": "No tags", "tags": null }))
        .await
        .assert_status_ok();

    let fetched: Value = server.get("/posts/untagged").await.json();
    assert_eq!(fetched["tags"], json!([]));
}

#[tokio::test]
async fn test_missing_post_is_not_found() {
    let (_temp_dir, server) = setup_test_server();

    let response = server.get("/posts/does-not-exist").await;

    response.assert_status_not_found();
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("does-not-exist"));
}

#[tokio::test]
async fn test_delete_post() {
    let (_temp_dir, server) = setup_test_server();

    server
        .post("/posts")
        .json(&json!({ "id": "short-lived", "title": "Bye" }))
        .await
        .assert_status_ok();

    let response = server.delete("/posts/short-lived").await;
    response.assert_status_ok();
    let ack: Value = response.json();
    assert_eq!(ack["postId"], "short-lived");

    server
        .get("/posts/short-lived")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_delete_unknown_post_is_acknowledged() {
    let (_temp_dir, server) = setup_test_server();

    let response = server.delete("/posts/never-created").await;

    response.assert_status_ok();
    let ack: Value = response.json();
    assert_eq!(ack["postId"], "never-created");
}

#[tokio::test]
async fn test_search_defaults_to_first_page() {
    let (_temp_dir, server) = setup_test_server();

    for i in 0..25 {
        server
            .post("/posts")
            .json(&json!({
                "id": format!("post-{:02}", i),
                "title": format!("Post {}", i),
                "content": "body that should not be returned"
            }))
            .await
            .assert_status_ok();
    }

    let response = server.get("/search").await;
    response.assert_status_ok();
    let page: Value = response.json();

    assert_eq!(page["hits"].as_array().unwrap().len(), 20);
    assert_eq!(page["hits"][0]["id"], "post-00");
    assert!(page["hits"][0].get("content").is_none());
    assert_eq!(page["totalPages"], 2);
    assert_eq!(page["query"], "");
    assert!(page["processingTimeMs"].is_u64());

    let response = server.get("/search").add_query_param("p", 1).await;
    let page: Value = response.json();
    assert_eq!(page["hits"].as_array().unwrap().len(), 5);
    assert_eq!(page["hits"][0]["id"], "post-20");
}

#[tokio::test]
async fn test_search_total_pages_on_exact_multiple() {
    let (_temp_dir, server) = setup_test_server();

    for i in 0..20 {
        server
            .post("/posts")
            .json(&json!({ "id": format!("p{}", i), "title": "Same" }))
            .await
            .assert_status_ok();
    }

    let page: Value = server.get("/search").await.json();
    assert_eq!(page["totalPages"], 2);
}

#[tokio::test]
async fn test_search_filters_by_query() {
    let (_temp_dir, server) = setup_test_server();

    server
        .post("/posts")
        .json(&json!({ "id": "a", "title": "Writing a parser", "tags": ["rust"] }))
        .await
        .assert_status_ok();
    server
        .post("/posts")
        .json(&json!({ "id": "b", "title": "Bread baking" }))
        .await
        .assert_status_ok();

    let page: Value = server
        .get("/search")
        .add_query_param("s", "parser")
        .add_query_param("p", "0")
        .await
        .json();

    assert_eq!(page["query"], "parser");
    assert_eq!(page["hits"].as_array().unwrap().len(), 1);
    assert_eq!(page["hits"][0]["id"], "a");
    assert_eq!(page["hits"][0]["tags"], json!(["rust"]));
}

#[tokio::test]
async fn test_search_rejects_malformed_page() {
    let (_temp_dir, server) = setup_test_server();

    for bad in ["abc", "-1", "2.5"] {
        let response = server.get("/search").add_query_param("p", bad).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["error"].as_str().unwrap().contains("page"));
    }
}

#[tokio::test]
async fn test_health() {
    let (_temp_dir, server) = setup_test_server();

    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "ok");
}

#[tokio::test]
async fn test_unknown_route_is_json_not_found() {
    let (_temp_dir, server) = setup_test_server();

    let response = server.get("/nope").await;

    response.assert_status_not_found();
    let body: Value = response.json();
    assert!(body["error"].is_string());
}
