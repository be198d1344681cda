//! OpenAI Client Integration Tests
//!
//! `OpenAIImageService` against a local fake of the images endpoint:
//! request shape, success parsing and every failure mapping.

use axum::http::StatusCode;
use serde_json::json;

use imagegen_core::error::RemoteError;
use imagegen_core::remote::{GenerationRequest, GenerationService};
use imagegen_remote::OpenAIImageService;

use crate::support::{service_config, FakeImagesApi};

fn request(prompt: &str, count: u32) -> GenerationRequest {
    GenerationRequest {
        prompt: prompt.to_string(),
        count,
        size: "1024x1024".to_string(),
    }
}

fn service_for(api: &FakeImagesApi) -> OpenAIImageService {
    let config = service_config(&api.endpoint(), "http://localhost:3000");
    OpenAIImageService::new(&config, reqwest::Client::new())
}

#[tokio::test]
async fn test_generate_returns_urls_and_sends_expected_request() {
    let api = FakeImagesApi::start(
        StatusCode::OK,
        json!({"created": 1, "data": [{"url": "a"}, {"url": "b"}]}),
    )
    .await;

    let urls = service_for(&api)
        .generate(&request("a red fox", 2))
        .await
        .unwrap();

    assert_eq!(urls, vec!["a".to_string(), "b".to_string()]);
    let requests = api.requests();
    assert_eq!(requests.len(), 1);
    let (auth, body) = &requests[0];
    assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
    assert_eq!(body, &json!({"prompt": "a red fox", "n": 2, "size": "1024x1024"}));
}

#[tokio::test]
async fn test_empty_object_is_malformed() {
    let api = FakeImagesApi::start(StatusCode::OK, json!({})).await;
    let err = service_for(&api)
        .generate(&request("a red fox", 2))
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::MalformedPayload { .. }));
}

#[tokio::test]
async fn test_entry_without_url_is_malformed() {
    let api = FakeImagesApi::start(StatusCode::OK, json!({"data": [{"b64_json": "..."}]})).await;
    let err = service_for(&api)
        .generate(&request("p", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::MalformedPayload { .. }));
}

#[tokio::test]
async fn test_rejected_credential() {
    let api = FakeImagesApi::start(
        StatusCode::UNAUTHORIZED,
        json!({"error": {"message": "Incorrect API key provided"}}),
    )
    .await;
    let err = service_for(&api)
        .generate(&request("p", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Authentication { .. }));
}

#[tokio::test]
async fn test_server_error_status() {
    let api = FakeImagesApi::start(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"error": "overloaded"}),
    )
    .await;
    let err = service_for(&api)
        .generate(&request("p", 1))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        RemoteError::Status {
            status: 500,
            body: "overloaded".to_string()
        }
    );
}

#[tokio::test]
async fn test_missing_credential_makes_no_call() {
    let api = FakeImagesApi::start(StatusCode::OK, json!({"data": [{"url": "a"}]})).await;
    let mut config = service_config(&api.endpoint(), "http://localhost:3000");
    config.credential = None;

    let err = OpenAIImageService::new(&config, reqwest::Client::new())
        .generate(&request("p", 1))
        .await
        .unwrap_err();

    assert!(matches!(err, RemoteError::Authentication { .. }));
    assert_eq!(api.calls(), 0);
}

#[tokio::test]
async fn test_unreachable_endpoint_is_network_error() {
    let config = service_config("http://127.0.0.1:9/v1/images/generations", "http://localhost:3000");
    let err = OpenAIImageService::new(&config, reqwest::Client::new())
        .generate(&request("p", 1))
        .await
        .unwrap_err();
    assert!(err.is_network());
}
