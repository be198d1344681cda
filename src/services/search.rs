//! Listing and Search
//!
//! Loads every post once, then filters locally. Each query change restarts
//! the debounce timer; only a timer that runs to expiry filters and
//! publishes, so results always belong to the latest query.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::services::events::UiNotifier;
use crate::services::generation::BusyGuard;
use imagegen_core::cancel::run_cancellable;
use imagegen_core::error::{RemoteError, RemoteResult};
use imagegen_core::models::Post;
use imagegen_core::remote::ImageStore;

/// Default debounce window
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

pub const NO_RESULTS_LABEL: &str = "No Search Results Found";
pub const NO_POSTS_LABEL: &str = "No Posts Yet";

/// Case-insensitive substring filter on name or prompt.
///
/// An empty query keeps every post.
pub fn filter_posts(posts: &[Post], query: &str) -> Vec<Post> {
    if query.is_empty() {
        return posts.to_vec();
    }
    let needle = query.to_lowercase();
    posts
        .iter()
        .filter(|post| post.matches_lowercase(&needle))
        .cloned()
        .collect()
}

/// Filter a possibly unloaded set. Unloaded means no results.
pub fn filter_loaded(posts: Option<&[Post]>, query: &str) -> Option<Vec<Post>> {
    posts.map(|posts| filter_posts(posts, query))
}

/// Filtered results published when a debounce timer expires
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResults {
    pub query: String,
    /// `None` when the post set had not loaded yet
    pub posts: Option<Vec<Post>>,
}

/// What the listing page should render
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingView {
    Loading,
    Cards(Vec<Post>),
    NoResults { label: &'static str },
    Empty { label: &'static str },
}

pub type LoadedPosts = Option<Arc<Vec<Post>>>;

fn render(
    loading: bool,
    query: &str,
    loaded: &LoadedPosts,
    results: &Option<SearchResults>,
) -> ListingView {
    if loading {
        return ListingView::Loading;
    }

    if query.is_empty() {
        return match loaded {
            Some(posts) if !posts.is_empty() => ListingView::Cards(posts.as_ref().clone()),
            _ => ListingView::Empty {
                label: NO_POSTS_LABEL,
            },
        };
    }

    match results.as_ref().and_then(|r| r.posts.clone()) {
        Some(posts) if !posts.is_empty() => ListingView::Cards(posts),
        _ => ListingView::NoResults {
            label: NO_RESULTS_LABEL,
        },
    }
}

/// Read-only handle on a controller's listing state. Stays live while the
/// controller itself is busy loading.
#[derive(Debug, Clone)]
pub struct ListingViewer {
    loading: watch::Receiver<bool>,
    query: watch::Receiver<String>,
    posts: watch::Receiver<LoadedPosts>,
    results: watch::Receiver<Option<SearchResults>>,
}

impl ListingViewer {
    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    /// Subscribe to the loading flag
    pub fn loading_watch(&self) -> watch::Receiver<bool> {
        self.loading.clone()
    }

    pub fn view(&self) -> ListingView {
        render(
            *self.loading.borrow(),
            &self.query.borrow(),
            &self.posts.borrow(),
            &self.results.borrow(),
        )
    }
}

/// Controller behind the community feed
pub struct SearchController {
    store: Arc<dyn ImageStore>,
    debounce: Duration,
    posts: watch::Sender<LoadedPosts>,
    results: Arc<watch::Sender<Option<SearchResults>>>,
    query: watch::Sender<String>,
    pending: Option<CancellationToken>,
    loading: Arc<watch::Sender<bool>>,
    notifier: UiNotifier,
}

impl SearchController {
    pub fn new(store: Arc<dyn ImageStore>, debounce: Duration) -> Self {
        Self {
            store,
            debounce,
            posts: watch::channel(None).0,
            results: Arc::new(watch::channel(None).0),
            query: watch::channel(String::new()).0,
            pending: None,
            loading: Arc::new(watch::channel(false).0),
            notifier: UiNotifier::silent(),
        }
    }

    pub fn with_notifier(mut self, notifier: UiNotifier) -> Self {
        self.notifier = notifier;
        self
    }

    /// Load every post, most recent first. Later calls reuse the loaded set.
    pub async fn load_all(&mut self, cancel: &CancellationToken) -> RemoteResult<Vec<Post>> {
        if let Some(posts) = self.loaded() {
            return Ok(posts.as_ref().clone());
        }

        let result = {
            let _loading = BusyGuard::raise(&self.loading);
            run_cancellable(cancel, self.store.list_posts()).await
        };

        let mut posts = match result {
            Ok(posts) => posts,
            Err(RemoteError::Cancelled) => return Err(RemoteError::Cancelled),
            Err(e) => {
                tracing::warn!("failed to fetch posts: {}", e);
                self.notifier
                    .alert("An error occurred while fetching posts.");
                return Err(e);
            }
        };

        posts.reverse();
        // Stable: posts without a timestamp keep the reversed order at the tail
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        tracing::debug!("loaded {} posts", posts.len());
        self.posts.send_replace(Some(Arc::new(posts.clone())));
        Ok(posts)
    }

    /// Record a query change and restart the debounce timer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn on_query_changed(&mut self, query: impl Into<String>) {
        if let Some(pending) = self.pending.take() {
            pending.cancel();
        }

        let query = query.into();
        self.query.send_replace(query.clone());

        let token = CancellationToken::new();
        self.pending = Some(token.clone());

        let posts = self.posts.subscribe();
        let results = self.results.clone();
        let window = self.debounce;

        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(window) => {
                    let filtered = {
                        let loaded = posts.borrow();
                        filter_loaded(loaded.as_ref().map(|p| p.as_slice()), &query)
                    };
                    results.send_replace(Some(SearchResults { query, posts: filtered }));
                }
            }
        });
    }

    /// Filter immediately, bypassing the debounce timer
    pub fn search_now(&mut self, query: impl Into<String>) -> Option<Vec<Post>> {
        if let Some(pending) = self.pending.take() {
            pending.cancel();
        }
        let query = query.into();
        self.query.send_replace(query.clone());
        let filtered = filter_loaded(self.loaded().as_ref().map(|p| p.as_slice()), &query);
        self.results.send_replace(Some(SearchResults {
            query,
            posts: filtered.clone(),
        }));
        filtered
    }

    /// Subscribe to published search results
    pub fn results(&self) -> watch::Receiver<Option<SearchResults>> {
        self.results.subscribe()
    }

    /// The loaded post set, most recent first
    pub fn loaded(&self) -> LoadedPosts {
        self.posts.borrow().clone()
    }

    pub fn query(&self) -> String {
        self.query.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    /// Handle for rendering from elsewhere, including while `load_all` runs
    pub fn viewer(&self) -> ListingViewer {
        ListingViewer {
            loading: self.loading.subscribe(),
            query: self.query.subscribe(),
            posts: self.posts.subscribe(),
            results: self.results.subscribe(),
        }
    }

    /// Decide what the listing renders right now
    pub fn view(&self) -> ListingView {
        render(
            self.is_loading(),
            &self.query.borrow(),
            &self.posts.borrow(),
            &self.results.borrow(),
        )
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.cancel();
        }
    }
}
