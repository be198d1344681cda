//! Workflow Integration Tests
//!
//! The client controllers wired to real HTTP collaborators: the fake images
//! API for generation and a live backend for persistence.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use imagegen::services::{
    FileSaver, GenerationController, GenerationSettings, ListingView, RecentCreations,
    SearchController,
};
use imagegen_core::error::{ErrorCategory, GenerationError};
use imagegen_core::remote::ImageStore;
use imagegen_remote::{HttpImageStore, OpenAIImageService};

use crate::support::{service_config, FakeImagesApi, TestBackend, FAKE_IMAGE_BYTES};

struct Rig {
    api: FakeImagesApi,
    _backend: TestBackend,
    store: Arc<HttpImageStore>,
    controller: GenerationController,
    download_dir: tempfile::TempDir,
}

async fn rig(body: Value) -> Rig {
    let api = FakeImagesApi::start(StatusCode::OK, body).await;
    let backend = TestBackend::start().await;
    let config = service_config(&api.endpoint(), &backend.base_url());
    let client = reqwest::Client::new();

    let store = Arc::new(HttpImageStore::new(&config, client.clone()).unwrap());
    let download_dir = tempfile::tempdir().unwrap();
    let saver = Arc::new(FileSaver::new(client.clone(), download_dir.path().to_path_buf()));
    let recent = RecentCreations::new(store.clone(), saver);
    let controller = GenerationController::new(
        Arc::new(OpenAIImageService::new(&config, client)),
        store.clone(),
        recent,
        GenerationSettings {
            count: 2,
            size: "1024x1024".to_string(),
        },
    );

    Rig {
        api,
        _backend: backend,
        store,
        controller,
        download_dir,
    }
}

#[tokio::test]
async fn test_generate_persists_every_image() {
    let mut rig = rig(json!({"data": [{"url": "a"}, {"url": "b"}]})).await;
    let cancel = CancellationToken::new();

    let batch = rig.controller.generate("a red fox", &cancel).await.unwrap();

    assert_eq!(batch.len(), 2);
    assert!(batch.iter().all(|i| i.prompt == "a red fox" && i.persisted));
    assert_eq!(rig.controller.recent().len(), 2);

    let stored = rig.store.list_images().await.unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|i| i.prompt == "a red fox"));
}

#[tokio::test]
async fn test_malformed_payload_end_to_end() {
    let mut rig = rig(json!({})).await;
    let flag = rig.controller.generating_watch();

    let err = rig
        .controller
        .generate("a red fox", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::Service(_)));
    assert_eq!(err.category(), ErrorCategory::RemoteService);
    assert!(!*flag.borrow());
    assert!(rig.controller.current_batch().is_empty());
    assert!(rig.store.list_images().await.unwrap().is_empty());
    assert_eq!(rig.api.calls(), 1);
}

#[tokio::test]
async fn test_share_then_search_feed() {
    let mut rig = rig(json!({"data": [{"url": "https://img/fox1.png"}, {"url": "https://img/fox2.png"}]})).await;
    let cancel = CancellationToken::new();
    rig.controller.generate("a red fox", &cancel).await.unwrap();

    let report = rig
        .controller
        .submit(Some("Jimin"), "a red fox", &cancel)
        .await
        .unwrap();
    assert!(report.is_complete());

    let mut search = SearchController::new(rig.store.clone(), Duration::from_millis(50));
    let posts = search.load_all(&cancel).await.unwrap();
    assert_eq!(posts.len(), 2);
    assert!(posts.iter().all(|p| p.created_at.is_some()));
    assert!(posts[0].created_at >= posts[1].created_at);

    assert_eq!(search.search_now("jimin").map(|p| p.len()), Some(2));
    assert_eq!(search.search_now("zebra"), Some(Vec::new()));

    search.on_query_changed("FOX");
    tokio::time::sleep(Duration::from_millis(200)).await;
    match search.view() {
        ListingView::Cards(posts) => assert_eq!(posts.len(), 2),
        other => panic!("unexpected view: {:?}", other),
    }
}

#[tokio::test]
async fn test_recent_delete_and_download() {
    let mut rig = rig(json!({"data": [{"url": "a"}, {"url": "b"}]})).await;
    let cancel = CancellationToken::new();
    rig.controller.generate("p", &cancel).await.unwrap();

    let recent = rig.controller.recent_mut();
    recent.hydrate(&cancel).await.unwrap();
    assert_eq!(recent.len(), 2);

    let removed = recent.delete("a", &cancel).await.unwrap();
    assert_eq!(removed, 1);
    let stored = rig.store.list_images().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].url, "b");

    let file_url = format!("{}?sig=abc", rig.api.file_url("fox.png"));
    let filename = rig.controller.recent().save(&file_url).await;
    assert_eq!(filename, "fox.png");
    let written = std::fs::read(rig.download_dir.path().join("fox.png")).unwrap();
    assert_eq!(written, FAKE_IMAGE_BYTES);
}
