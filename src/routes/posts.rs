//! Post Routes
//!
//! Publish and list posts for the community feed.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::models::{NewRecord, Post, PostsEnvelope};
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

/// Publish one post
pub async fn create_post(
    State(state): State<AppState>,
    payload: Result<Json<NewRecord>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Post>)> {
    let Json(record) = payload.map_err(|e| AppError::validation(e.body_text()))?;
    let post = state.with_database(|db| db.insert_post(&record)).await?;
    tracing::info!(url = %post.url, "post published");
    Ok((StatusCode::CREATED, Json(post)))
}

/// List every post in insertion order, wrapped in `{data}`
pub async fn list_posts(State(state): State<AppState>) -> AppResult<Json<PostsEnvelope>> {
    let data = state.with_database(|db| db.list_posts()).await?;
    Ok(Json(PostsEnvelope { data }))
}
