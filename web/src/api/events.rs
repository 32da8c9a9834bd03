//! Event endpoints.
//!
//! - GET /api/events - Published events, upcoming by default (`?when=past`, `?when=all`);
//!   `?scope=all` lists everything, admin only
//! - GET /api/events/:id - Event details
//! - POST /api/events - Create an event (admin)
//! - PUT /api/events/:id - Update an event (admin)
//! - DELETE /api/events/:id - Delete an event without sales (admin)
//! - POST /api/events/:id/purchase - Buy seats (member)

use super::capped;
use crate::error::AppError;
use crate::extractors::{ApiJson, ApiPath, ApiQuery, CorrelationId, CurrentUser, MaybeUser};
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use fanclub_core::{
    Event, EventDetails, EventId, EventTimeframe, LedgerError, NewEvent, PaymentMethod,
    PurchaseRequest, Ticket,
};
use serde::Deserialize;
use uuid::Uuid;

/// Which events to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventScope {
    /// Published events, soonest first
    #[default]
    Public,
    /// Every event, newest first (admin only)
    All,
}

/// Query parameters for listing events.
#[derive(Debug, Default, Deserialize)]
pub struct ListEventsQuery {
    /// Listing scope
    #[serde(default)]
    pub scope: EventScope,
    /// Upcoming, past or all published events
    #[serde(default)]
    pub when: EventTimeframe,
    /// Maximum number of public events
    pub limit: Option<usize>,
}

/// Request to buy seats.
#[derive(Debug, Deserialize)]
pub struct PurchaseBody {
    /// Seats to buy
    pub quantity: u32,
    /// How the buyer pays
    pub payment_method: PaymentMethod,
}

/// List events.
///
/// ```bash
/// curl http://localhost:8080/api/events?limit=6
/// curl http://localhost:8080/api/events?when=past
/// curl -H "Authorization: Bearer <token>" http://localhost:8080/api/events?scope=all
/// ```
pub async fn list_events(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    ApiQuery(query): ApiQuery<ListEventsQuery>,
) -> Result<Json<Vec<Event>>, AppError> {
    let events = match query.scope {
        EventScope::Public => {
            state
                .catalog
                .list_public_events(query.when, Some(capped(query.limit)))
                .await?
        },
        EventScope::All => {
            let actor = viewer.ok_or(LedgerError::Unauthenticated)?;
            state.catalog.list_all_events(&actor).await?
        },
    };
    Ok(Json(events))
}

/// Event details. Unpublished events are visible to admins only.
pub async fn get_event(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Event>, AppError> {
    let event = state
        .catalog
        .get_event(viewer.as_ref(), EventId::from_uuid(id))
        .await?;
    Ok(Json(event))
}

/// Create an event.
///
/// ```bash
/// curl -X POST http://localhost:8080/api/events \
///   -H "Authorization: Bearer <admin token>" \
///   -H "Content-Type: application/json" \
///   -d '{
///     "title": "Away day bus trip",
///     "date": "2026-11-21T09:00:00Z",
///     "ticket_price": 2500,
///     "total_tickets": 150,
///     "raffle_limit": 100,
///     "published": true
///   }'
/// ```
pub async fn create_event(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiJson(input): ApiJson<NewEvent>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let event = state.catalog.create_event(&actor, input).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// Replace the editable details of an event. Capacity and sales are untouched.
pub async fn update_event(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(details): ApiJson<EventDetails>,
) -> Result<Json<Event>, AppError> {
    let event = state
        .catalog
        .update_event(&actor, EventId::from_uuid(id), details)
        .await?;
    Ok(Json(event))
}

/// Delete an event.
pub async fn delete_event(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .catalog
        .delete_event(&actor, EventId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Buy seats for an event.
///
/// ```bash
/// curl -X POST http://localhost:8080/api/events/<id>/purchase \
///   -H "Authorization: Bearer <token>" \
///   -H "Content-Type: application/json" \
///   -d '{"quantity": 2, "payment_method": "card"}'
/// ```
pub async fn purchase(
    State(state): State<AppState>,
    CurrentUser(buyer): CurrentUser,
    CorrelationId(correlation_id): CorrelationId,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<PurchaseBody>,
) -> Result<(StatusCode, Json<Ticket>), AppError> {
    tracing::debug!(
        %correlation_id,
        event_id = %id,
        quantity = body.quantity,
        "Purchase requested"
    );

    let ticket = state
        .ledger
        .purchase(
            &buyer,
            PurchaseRequest {
                event_id: EventId::from_uuid(id),
                quantity: body.quantity,
                payment_method: body.payment_method,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ticket)))
}
