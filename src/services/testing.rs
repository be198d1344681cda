//! In-memory collaborators for controller tests.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::services::download::DeviceSaver;
use crate::utils::error::{AppError, AppResult};
use imagegen_core::error::{RemoteError, RemoteResult, SpeechError};
use imagegen_core::models::{GeneratedImage, NewRecord, Post};
use imagegen_core::remote::{GenerationRequest, GenerationService, ImageStore};
use imagegen_core::speech::{RecognitionSession, SpeechRecognizer, TranscriptSender};

/// Generation service returning a scripted result
pub struct FakeGenerator {
    response: RemoteResult<Vec<String>>,
    calls: AtomicUsize,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl FakeGenerator {
    pub fn returning(urls: &[&str]) -> Self {
        Self::with_result(Ok(urls.iter().map(|u| u.to_string()).collect()))
    }

    pub fn failing(err: RemoteError) -> Self {
        Self::with_result(Err(err))
    }

    pub fn with_result(response: RemoteResult<Vec<String>>) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationService for FakeGenerator {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn generate(&self, request: &GenerationRequest) -> RemoteResult<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.response.clone()
    }
}

/// Image store kept in memory, with per-url failure injection
#[derive(Default)]
pub struct MemoryStore {
    images: Mutex<Vec<GeneratedImage>>,
    posts: Mutex<Vec<Post>>,
    failing_urls: Mutex<HashSet<String>>,
    fail_listing: Mutex<bool>,
    listing_gate: Mutex<Option<Arc<Notify>>>,
    cancel_after_save: Mutex<Option<CancellationToken>>,
    delete_calls: Mutex<Vec<String>>,
    next_id: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every save, post or delete for `url` fails with HTTP 500
    pub fn fail_url(&self, url: &str) {
        self.failing_urls.lock().unwrap().insert(url.to_string());
    }

    pub fn fail_listing(&self) {
        *self.fail_listing.lock().unwrap() = true;
    }

    /// Post listings wait until the returned gate is notified
    pub fn hold_listing(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.listing_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Cancel `token` once an image save has gone through
    pub fn cancel_after_save(&self, token: CancellationToken) {
        *self.cancel_after_save.lock().unwrap() = Some(token);
    }

    /// Seed images; later entries get later timestamps
    pub fn seed_images(&self, urls: &[&str]) {
        let base = Utc::now();
        let mut images = self.images.lock().unwrap();
        for (i, url) in urls.iter().enumerate() {
            let mut image = GeneratedImage::new("seed", *url);
            image.id = Some(format!("seed-{}", i));
            image.created_at = Some(base + ChronoDuration::seconds(i as i64));
            image.persisted = true;
            images.push(image);
        }
    }

    pub fn seed_posts(&self, posts: Vec<Post>) {
        self.posts.lock().unwrap().extend(posts);
    }

    pub fn images(&self) -> Vec<GeneratedImage> {
        self.images.lock().unwrap().clone()
    }

    pub fn posts(&self) -> Vec<Post> {
        self.posts.lock().unwrap().clone()
    }

    pub fn delete_calls(&self) -> Vec<String> {
        self.delete_calls.lock().unwrap().clone()
    }

    fn check(&self, url: &str) -> RemoteResult<()> {
        if self.failing_urls.lock().unwrap().contains(url) {
            return Err(RemoteError::Status {
                status: 500,
                body: "store unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn next_id(&self) -> String {
        format!("mem-{}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

#[async_trait]
impl ImageStore for MemoryStore {
    async fn save_image(&self, record: &NewRecord) -> RemoteResult<GeneratedImage> {
        self.check(&record.url)?;
        let mut image = GeneratedImage::new(record.prompt.clone(), record.url.clone());
        image.id = Some(self.next_id());
        image.name = record.normalized_name();
        image.created_at = Some(Utc::now());
        image.persisted = true;
        self.images.lock().unwrap().push(image.clone());
        if let Some(token) = self.cancel_after_save.lock().unwrap().as_ref() {
            token.cancel();
        }
        Ok(image)
    }

    async fn list_images(&self) -> RemoteResult<Vec<GeneratedImage>> {
        if *self.fail_listing.lock().unwrap() {
            return Err(RemoteError::network("connection refused"));
        }
        let mut images = self.images();
        images.reverse();
        Ok(images)
    }

    async fn delete_image(&self, url: &str) -> RemoteResult<usize> {
        self.delete_calls.lock().unwrap().push(url.to_string());
        self.check(url)?;
        let mut images = self.images.lock().unwrap();
        let before = images.len();
        images.retain(|image| image.url != url);
        Ok(before - images.len())
    }

    async fn find_image(&self, id: &str) -> RemoteResult<Option<GeneratedImage>> {
        Ok(self
            .images()
            .into_iter()
            .find(|image| image.id.as_deref() == Some(id)))
    }

    async fn create_post(&self, record: &NewRecord) -> RemoteResult<Post> {
        self.check(&record.url)?;
        let mut post = Post::new(
            record.normalized_name(),
            record.prompt.clone(),
            record.url.clone(),
        );
        post.id = Some(self.next_id());
        post.created_at = Some(Utc::now());
        self.posts.lock().unwrap().push(post.clone());
        Ok(post)
    }

    async fn list_posts(&self) -> RemoteResult<Vec<Post>> {
        let gate = self.listing_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if *self.fail_listing.lock().unwrap() {
            return Err(RemoteError::network("connection refused"));
        }
        Ok(self.posts())
    }
}

/// Saver that records requests instead of touching the network
#[derive(Default)]
pub struct RecordingSaver {
    saved: Mutex<Vec<(String, String, Option<PathBuf>)>>,
    fail: bool,
}

impl RecordingSaver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn saved(&self) -> Vec<(String, String, Option<PathBuf>)> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeviceSaver for RecordingSaver {
    async fn save(&self, url: &str, filename: &str, dir: Option<&Path>) -> AppResult<PathBuf> {
        self.saved.lock().unwrap().push((
            url.to_string(),
            filename.to_string(),
            dir.map(Path::to_path_buf),
        ));
        if self.fail {
            return Err(AppError::internal("disk full"));
        }
        Ok(dir.unwrap_or(Path::new("/downloads")).join(filename))
    }
}

/// Recognizer whose sessions are driven by the test through the returned
/// senders
#[derive(Default)]
pub struct ScriptedRecognizer {
    senders: Mutex<Vec<TranscriptSender>>,
    opened: AtomicUsize,
}

impl ScriptedRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sessions_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Take the sender of the most recently opened session
    pub fn take_sender(&self) -> Option<TranscriptSender> {
        self.senders.lock().unwrap().pop()
    }
}

impl SpeechRecognizer for ScriptedRecognizer {
    fn is_available(&self) -> bool {
        true
    }

    fn start(&self) -> Result<RecognitionSession, SpeechError> {
        let (sender, session) = RecognitionSession::channel();
        self.opened.fetch_add(1, Ordering::SeqCst);
        self.senders.lock().unwrap().push(sender);
        Ok(session)
    }
}
