//! Backend API Integration Tests
//!
//! Drives every backend route through `HttpImageStore` (and raw reqwest
//! where the client has no verb for it) against a server on an ephemeral
//! port with an in-memory store.

use serde_json::{json, Value};

use imagegen_core::error::RemoteError;
use imagegen_core::models::NewRecord;
use imagegen_core::remote::ImageStore;
use imagegen_remote::HttpImageStore;

use crate::support::{service_config, TestBackend};

fn store_for(backend: &TestBackend) -> HttpImageStore {
    let config = service_config("http://unused.invalid/", &backend.base_url());
    HttpImageStore::new(&config, reqwest::Client::new()).unwrap()
}

fn record(name: Option<&str>, prompt: &str, url: &str) -> NewRecord {
    NewRecord {
        name: name.map(str::to_string),
        prompt: prompt.to_string(),
        url: url.to_string(),
    }
}

#[tokio::test]
async fn test_image_lifecycle() {
    let backend = TestBackend::start().await;
    let store = store_for(&backend);

    let saved = store
        .save_image(&record(None, "a red fox", "https://img/fox.png"))
        .await
        .unwrap();
    assert!(saved.persisted);
    assert!(saved.created_at.is_some());
    let id = saved.id.clone().unwrap();

    let found = store.find_image(&id).await.unwrap().unwrap();
    assert_eq!(found.prompt, "a red fox");

    store
        .save_image(&record(None, "a red fox", "https://img/fox.png"))
        .await
        .unwrap();
    store
        .save_image(&record(None, "a blue fox", "https://img/blue.png"))
        .await
        .unwrap();

    let listed = store.list_images().await.unwrap();
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[0].url, "https://img/blue.png");

    let deleted = store.delete_image("https://img/fox.png").await.unwrap();
    assert_eq!(deleted, 2);
    assert!(store.find_image(&id).await.unwrap().is_none());
    assert_eq!(store.list_images().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_posts_listed_in_insertion_order() {
    let backend = TestBackend::start().await;
    let store = store_for(&backend);

    store
        .create_post(&record(Some("a"), "cat", "https://img/cat.png"))
        .await
        .unwrap();
    store
        .create_post(&record(Some("b"), "dog", "https://img/dog.png"))
        .await
        .unwrap();

    let posts = store.list_posts().await.unwrap();
    let prompts: Vec<&str> = posts.iter().map(|p| p.prompt.as_str()).collect();
    assert_eq!(prompts, vec!["cat", "dog"]);
}

#[tokio::test]
async fn test_missing_fields_are_rejected() {
    let backend = TestBackend::start().await;
    let store = store_for(&backend);

    let err = store
        .create_post(&record(Some("a"), "", "https://img/cat.png"))
        .await
        .unwrap_err();
    match err {
        RemoteError::Status { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("prompt is required"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(store.list_posts().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_json_gets_error_body() {
    let backend = TestBackend::start().await;
    let response = reqwest::Client::new()
        .post(format!("{}/api/images", backend.base_url()))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_legacy_listing_route() {
    let backend = TestBackend::start().await;
    let store = store_for(&backend);
    store
        .create_post(&record(None, "harbor", "https://img/harbor.png"))
        .await
        .unwrap();

    let client = reqwest::Client::new();
    for request in [
        client.get(format!("{}/get", backend.base_url())),
        client.post(format!("{}/get", backend.base_url())),
    ] {
        let body: Value = request.send().await.unwrap().json().await.unwrap();
        assert_eq!(body["data"][0]["prompt"], json!("harbor"));
        assert!(body["data"][0].get("name").is_none());
    }
}

#[tokio::test]
async fn test_health_and_cors() {
    let backend = TestBackend::start().await;
    let response = reqwest::Client::new()
        .get(format!("{}/health", backend.base_url()))
        .header("origin", "http://localhost:5173")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert!(response
        .headers()
        .contains_key("access-control-allow-origin"));
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["database"], json!(true));
}
