//! Generation Workflow
//!
//! Takes the committed prompt, calls the generation service, fans the
//! returned URLs out into the current batch and recent creations, then
//! persists every image concurrently. Each save is independent: a failed
//! save leaves its image visible with `persisted == false`.
//!
//! Submitting publishes every image of the current batch as a post, with
//! the same per-item isolation.

use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::models::settings::AppConfig;
use crate::services::events::UiNotifier;
use crate::services::recent::RecentCreations;
use imagegen_core::cancel::run_cancellable;
use imagegen_core::error::{
    GenerationError, PersistOp, PersistenceError, RemoteError, SubmitError,
};
use imagegen_core::models::{GeneratedImage, NewRecord, Post};
use imagegen_core::remote::{GenerationRequest, GenerationService, ImageStore};

/// Per-call generation parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSettings {
    /// Images requested per call
    pub count: u32,
    /// Requested image size
    pub size: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for GenerationSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            count: config.generation_count,
            size: config.image_size.clone(),
        }
    }
}

/// Outcome of a submit: what got published and what did not
#[derive(Debug, Clone, Default)]
pub struct SubmitReport {
    pub published: Vec<Post>,
    pub failures: Vec<PersistenceError>,
}

impl SubmitReport {
    /// Whether every item of the batch was published
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Raises a busy flag for its lifetime
pub(crate) struct BusyGuard {
    flag: Arc<watch::Sender<bool>>,
}

impl BusyGuard {
    pub(crate) fn raise(flag: &Arc<watch::Sender<bool>>) -> Self {
        flag.send_replace(true);
        Self { flag: flag.clone() }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flag.send_replace(false);
    }
}

/// Orchestrates generate and submit for one create form
pub struct GenerationController {
    generator: Arc<dyn GenerationService>,
    store: Arc<dyn ImageStore>,
    settings: GenerationSettings,
    current_batch: Vec<GeneratedImage>,
    recent: RecentCreations,
    generating: Arc<watch::Sender<bool>>,
    submitting: Arc<watch::Sender<bool>>,
    last_persistence_errors: Vec<PersistenceError>,
    notifier: UiNotifier,
}

impl GenerationController {
    pub fn new(
        generator: Arc<dyn GenerationService>,
        store: Arc<dyn ImageStore>,
        recent: RecentCreations,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            generator,
            store,
            settings,
            current_batch: Vec::new(),
            recent,
            generating: Arc::new(watch::channel(false).0),
            submitting: Arc::new(watch::channel(false).0),
            last_persistence_errors: Vec::new(),
            notifier: UiNotifier::silent(),
        }
    }

    /// Route alerts and navigation through `notifier`
    pub fn with_notifier(mut self, notifier: UiNotifier) -> Self {
        self.notifier = notifier;
        self
    }

    /// Generate images for `prompt` and persist them.
    ///
    /// On success the returned batch reflects which saves went through.
    /// Cancellation while saving leaves the batch visible but unconfirmed
    /// and returns `Cancelled`.
    pub async fn generate(
        &mut self,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<GeneratedImage>, GenerationError> {
        if prompt.trim().is_empty() {
            self.notifier.alert(GenerationError::EmptyPrompt.to_string());
            return Err(GenerationError::EmptyPrompt);
        }

        let _generating = BusyGuard::raise(&self.generating);

        let request = GenerationRequest {
            prompt: prompt.to_string(),
            count: self.settings.count,
            size: self.settings.size.clone(),
        };
        tracing::info!(
            service = self.generator.name(),
            count = request.count,
            "generating images"
        );

        let urls = match run_cancellable(cancel, self.generator.generate(&request)).await {
            Ok(urls) if urls.is_empty() => {
                return Err(self.generation_failed(RemoteError::malformed(
                    "generation service returned no images",
                )))
            }
            Ok(urls) => urls,
            Err(RemoteError::Cancelled) => return Err(GenerationError::Cancelled),
            Err(e) => return Err(self.generation_failed(e)),
        };

        let batch: Vec<GeneratedImage> = urls
            .into_iter()
            .map(|url| GeneratedImage::new(prompt, url))
            .collect();
        self.current_batch = batch.clone();
        self.recent.append(batch.clone());
        self.last_persistence_errors.clear();

        let saves = batch.iter().map(|image| {
            let store = self.store.clone();
            let record = image.to_new_record();
            async move { store.save_image(&record).await }
        });
        let results = join_all(saves).await;

        if cancel.is_cancelled() {
            tracing::warn!(
                images = results.len(),
                "generation cancelled; save results discarded"
            );
            return Err(GenerationError::Cancelled);
        }

        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(saved) => {
                    self.recent.mark_persisted(&saved);
                    if let Some(image) = self.current_batch.get_mut(index) {
                        image.id = saved.id;
                        image.created_at = saved.created_at;
                        image.persisted = true;
                    }
                }
                Err(e) => {
                    let err = PersistenceError::new(PersistOp::SaveImage, &batch[index].url, e);
                    tracing::warn!("{}", err);
                    self.notifier.alert(err.to_string());
                    self.last_persistence_errors.push(err);
                }
            }
        }

        tracing::info!(
            generated = self.current_batch.len(),
            unsaved = self.last_persistence_errors.len(),
            "generation finished"
        );
        Ok(self.current_batch.clone())
    }

    fn generation_failed(&self, source: RemoteError) -> GenerationError {
        let err = GenerationError::Service(source);
        tracing::warn!("{}", err);
        self.notifier.alert(err.to_string());
        err
    }

    /// Publish every image of the current batch as a post.
    ///
    /// Emits `NavigateHome` only when every item was published.
    pub async fn submit(
        &mut self,
        name: Option<&str>,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<SubmitReport, SubmitError> {
        if prompt.trim().is_empty() || self.current_batch.is_empty() {
            self.notifier
                .alert(SubmitError::IncompleteSubmission.to_string());
            return Err(SubmitError::IncompleteSubmission);
        }
        if cancel.is_cancelled() {
            return Err(SubmitError::Cancelled);
        }

        let _submitting = BusyGuard::raise(&self.submitting);

        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        let records: Vec<NewRecord> = self
            .current_batch
            .iter()
            .map(|image| NewRecord {
                name: name.clone(),
                prompt: image.prompt.clone(),
                url: image.url.clone(),
            })
            .collect();

        let posts = records.iter().map(|record| {
            let store = self.store.clone();
            async move { store.create_post(record).await }
        });
        let results = join_all(posts).await;

        if cancel.is_cancelled() {
            return Err(SubmitError::Cancelled);
        }

        let mut report = SubmitReport::default();
        for (record, result) in records.iter().zip(results) {
            match result {
                Ok(post) => report.published.push(post),
                Err(e) => {
                    let err = PersistenceError::new(PersistOp::CreatePost, &record.url, e);
                    tracing::warn!("{}", err);
                    self.notifier.alert(err.to_string());
                    report.failures.push(err);
                }
            }
        }

        tracing::info!(
            published = report.published.len(),
            failed = report.failures.len(),
            "submission finished"
        );
        if report.is_complete() {
            self.notifier.alert("Success");
            self.notifier.navigate_home();
        }
        Ok(report)
    }

    pub fn is_generating(&self) -> bool {
        *self.generating.borrow()
    }

    pub fn is_submitting(&self) -> bool {
        *self.submitting.borrow()
    }

    /// Observe the generating flag, e.g. to drive a spinner
    pub fn generating_watch(&self) -> watch::Receiver<bool> {
        self.generating.subscribe()
    }

    pub fn submitting_watch(&self) -> watch::Receiver<bool> {
        self.submitting.subscribe()
    }

    pub fn current_batch(&self) -> &[GeneratedImage] {
        &self.current_batch
    }

    pub fn recent(&self) -> &RecentCreations {
        &self.recent
    }

    pub fn recent_mut(&mut self) -> &mut RecentCreations {
        &mut self.recent
    }

    /// Save failures from the latest generation
    pub fn last_persistence_errors(&self) -> &[PersistenceError] {
        &self.last_persistence_errors
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }
}

impl std::fmt::Debug for GenerationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationController")
            .field("generator", &self.generator.name())
            .field("settings", &self.settings)
            .field("current_batch", &self.current_batch.len())
            .field("generating", &self.is_generating())
            .finish()
    }
}
