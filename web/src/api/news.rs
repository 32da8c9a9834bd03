//! News endpoints.

use super::capped;
use crate::error::AppError;
use crate::extractors::{ApiJson, ApiPath, ApiQuery, CurrentUser};
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use fanclub_core::{News, NewsCategory, NewsDraft, NewsId, NewsQuery};
use serde::Deserialize;
use uuid::Uuid;

/// Query parameters for the public news listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListNewsQuery {
    /// Restrict to one category
    pub category: Option<NewsCategory>,
    /// Text to look for in the title or summary
    pub search: Option<String>,
    /// Maximum number of results
    pub limit: Option<usize>,
}

impl From<ListNewsQuery> for NewsQuery {
    fn from(query: ListNewsQuery) -> Self {
        Self {
            published_only: true,
            category: query.category,
            search: query.search,
            limit: Some(capped(query.limit)),
        }
    }
}

/// Published articles, newest first.
///
/// ```bash
/// curl "http://localhost:8080/api/news?category=match&search=derby"
/// ```
pub async fn list_news(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListNewsQuery>,
) -> Result<Json<Vec<News>>, AppError> {
    let news = state.catalog.list_published_news(query.into()).await?;
    Ok(Json(news))
}

/// Publish or draft an article.
pub async fn create_news(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiJson(draft): ApiJson<NewsDraft>,
) -> Result<(StatusCode, Json<News>), AppError> {
    let news = state.catalog.create_news(&actor, draft).await?;
    Ok((StatusCode::CREATED, Json(news)))
}

/// Replace an article's content.
pub async fn update_news(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(draft): ApiJson<NewsDraft>,
) -> Result<Json<News>, AppError> {
    let news = state
        .catalog
        .update_news(&actor, NewsId::from_uuid(id), draft)
        .await?;
    Ok(Json(news))
}

/// Delete an article.
pub async fn delete_news(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .catalog
        .delete_news(&actor, NewsId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
