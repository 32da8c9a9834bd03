//! Raffle endpoints.
//!
//! - GET /api/raffles - Raffles, most recently drawn first
//! - GET /api/raffles/:id - Raffle details
//! - POST /api/raffles - Create a raffle for an event (admin)
//! - PUT /api/raffles/:id - Edit the prize of a pending raffle (admin)
//! - DELETE /api/raffles/:id - Delete a raffle (admin)
//! - POST /api/raffles/:id/draw - Draw the winner (admin)
//! - GET /api/raffles/:id/participants - Tickets in the draw (admin)

use super::LimitQuery;
use crate::error::AppError;
use crate::extractors::{ApiJson, ApiPath, ApiQuery, CurrentUser};
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use fanclub_core::{NewRaffle, Raffle, RaffleDetails, RaffleId, Ticket};
use uuid::Uuid;

/// List raffles.
pub async fn list_raffles(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LimitQuery>,
) -> Result<Json<Vec<Raffle>>, AppError> {
    let raffles = state.catalog.list_raffles(Some(query.capped())).await?;
    Ok(Json(raffles))
}

/// Raffle details, including the winner once drawn.
pub async fn get_raffle(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Raffle>, AppError> {
    Ok(Json(state.catalog.get_raffle(RaffleId::from_uuid(id)).await?))
}

/// Create a raffle.
pub async fn create_raffle(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiJson(input): ApiJson<NewRaffle>,
) -> Result<(StatusCode, Json<Raffle>), AppError> {
    let raffle = state.catalog.create_raffle(&actor, input).await?;
    Ok((StatusCode::CREATED, Json(raffle)))
}

/// Edit the prize of a pending raffle.
pub async fn update_raffle(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(details): ApiJson<RaffleDetails>,
) -> Result<Json<Raffle>, AppError> {
    let raffle = state
        .catalog
        .update_raffle(&actor, RaffleId::from_uuid(id), details)
        .await?;
    Ok(Json(raffle))
}

/// Delete a raffle.
pub async fn delete_raffle(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .catalog
        .delete_raffle(&actor, RaffleId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Draw the winner among the paid, eligible tickets of the raffle's event.
///
/// ```bash
/// curl -X POST -H "Authorization: Bearer <admin token>" \
///   http://localhost:8080/api/raffles/<id>/draw
/// ```
pub async fn draw_winner(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Raffle>, AppError> {
    let raffle = state
        .ledger
        .draw_winner(&actor, RaffleId::from_uuid(id))
        .await?;
    Ok(Json(raffle))
}

/// Tickets a draw would pick from, in purchase order.
pub async fn participants(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Vec<Ticket>>, AppError> {
    let pool = state
        .ledger
        .raffle_participants(&actor, RaffleId::from_uuid(id))
        .await?;
    Ok(Json(pool))
}
