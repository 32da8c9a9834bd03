//! Gallery endpoints.

use super::capped;
use crate::error::AppError;
use crate::extractors::{ApiJson, ApiPath, ApiQuery, CurrentUser};
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use fanclub_core::{Photo, PhotoDraft, PhotoId};
use serde::Deserialize;
use uuid::Uuid;

/// Query parameters for the gallery.
#[derive(Debug, Default, Deserialize)]
pub struct ListPhotosQuery {
    /// Restrict to one album
    pub album: Option<String>,
    /// Maximum number of results
    pub limit: Option<usize>,
}

/// Published photos, newest first.
pub async fn list_photos(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListPhotosQuery>,
) -> Result<Json<Vec<Photo>>, AppError> {
    let album = query.album.filter(|album| !album.is_empty());
    let photos = state
        .catalog
        .list_published_photos(album, Some(capped(query.limit)))
        .await?;
    Ok(Json(photos))
}

/// Add a batch of photos. All are stored or none.
///
/// ```bash
/// curl -X POST http://localhost:8080/api/photos \
///   -H "Authorization: Bearer <admin token>" \
///   -H "Content-Type: application/json" \
///   -d '[{"title": "Kick-off", "image_url": "https://cdn.example/1.jpg", "album": "Derby"}]'
/// ```
pub async fn add_photos(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiJson(drafts): ApiJson<Vec<PhotoDraft>>,
) -> Result<(StatusCode, Json<Vec<Photo>>), AppError> {
    let photos = state.catalog.add_photos(&actor, drafts).await?;
    Ok((StatusCode::CREATED, Json(photos)))
}

/// Replace a photo's caption, album or visibility.
pub async fn update_photo(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(draft): ApiJson<PhotoDraft>,
) -> Result<Json<Photo>, AppError> {
    let photo = state
        .catalog
        .update_photo(&actor, PhotoId::from_uuid(id), draft)
        .await?;
    Ok(Json(photo))
}

/// Delete a photo.
pub async fn delete_photo(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .catalog
        .delete_photo(&actor, PhotoId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
