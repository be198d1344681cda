//! Image Routes
//!
//! Create, list, fetch and delete generated image records.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::models::{DeleteImageRequest, DeleteImageResponse, GeneratedImage, NewRecord};
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

/// Insert one image record
pub async fn create_image(
    State(state): State<AppState>,
    payload: Result<Json<NewRecord>, JsonRejection>,
) -> AppResult<(StatusCode, Json<GeneratedImage>)> {
    let Json(record) = payload.map_err(|e| AppError::validation(e.body_text()))?;
    let image = state.with_database(|db| db.insert_image(&record)).await?;
    tracing::debug!(url = %image.url, "image saved");
    Ok((StatusCode::CREATED, Json(image)))
}

/// List every image record, newest first
pub async fn list_images(State(state): State<AppState>) -> AppResult<Json<Vec<GeneratedImage>>> {
    let images = state.with_database(|db| db.list_images()).await?;
    Ok(Json(images))
}

/// Fetch one image record by id
pub async fn get_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<GeneratedImage>> {
    state
        .with_database(|db| db.find_image(&id))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("image {}", id)))
}

/// Delete every image record with the given url
pub async fn delete_image(
    State(state): State<AppState>,
    payload: Result<Json<DeleteImageRequest>, JsonRejection>,
) -> AppResult<Json<DeleteImageResponse>> {
    let Json(request) = payload.map_err(|e| AppError::validation(e.body_text()))?;
    let deleted = state
        .with_database(|db| db.delete_images_by_url(&request.url))
        .await?;
    tracing::debug!(url = %request.url, deleted, "images deleted");
    Ok(Json(DeleteImageResponse {
        url: request.url,
        deleted,
    }))
}
