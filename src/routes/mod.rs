//! Backend HTTP Routes
//!
//! Axum handlers over the document store, organized by resource:
//! - images: generated image records (`/api/images`)
//! - posts: published posts (`/api/posts`, legacy `/get`)
//! - health: service health report (`/health`)

pub mod health;
pub mod images;
pub mod posts;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

use crate::state::AppState;
use crate::utils::error::AppResult;

/// Build the backend router with every route mounted
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/images",
            get(images::list_images)
                .post(images::create_image)
                .delete(images::delete_image),
        )
        .route("/api/images/{id}", get(images::get_image))
        .route("/api/posts", get(posts::list_posts).post(posts::create_post))
        .route("/get", get(posts::list_posts).post(posts::list_posts))
        .route("/health", get(health::get_health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the backend on `listener` until `shutdown` is cancelled
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: CancellationToken,
) -> AppResult<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("backend listening on http://{}", addr);
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    tracing::info!("backend stopped");
    Ok(())
}
