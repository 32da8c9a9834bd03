//! Ticket endpoints.
//!
//! - GET /api/tickets/mine - The caller's tickets, newest first
//! - GET /api/tickets - Filtered ticket listing (admin)
//! - PUT /api/tickets/:id/status - Change payment status (admin)

use super::capped;
use crate::error::AppError;
use crate::extractors::{ApiJson, ApiPath, ApiQuery, CurrentUser};
use crate::state::AppState;
use axum::{Json, extract::State};
use fanclub_core::{EventId, PaymentStatus, Ticket, TicketId, TicketQuery};
use serde::Deserialize;
use uuid::Uuid;

/// Query parameters for the admin ticket listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListTicketsQuery {
    /// Restrict to one event
    pub event_id: Option<Uuid>,
    /// Restrict to one buyer
    pub buyer_email: Option<String>,
    /// Text to look for in the buyer's name, email or the ticket code
    pub search: Option<String>,
    /// Restrict to one payment status
    pub payment_status: Option<PaymentStatus>,
    /// Only raffle-eligible tickets
    #[serde(default)]
    pub eligible_only: bool,
    /// Maximum number of results
    pub limit: Option<usize>,
}

impl From<ListTicketsQuery> for TicketQuery {
    fn from(query: ListTicketsQuery) -> Self {
        Self {
            event_id: query.event_id.map(EventId::from_uuid),
            buyer_email: query.buyer_email.filter(|email| !email.is_empty()),
            search: query.search,
            payment_status: query.payment_status,
            eligible_only: query.eligible_only,
            created_since: None,
            limit: Some(capped(query.limit)),
        }
    }
}

/// Request to change a ticket's payment status.
#[derive(Debug, Deserialize)]
pub struct StatusBody {
    /// Target status
    pub status: PaymentStatus,
}

/// The caller's own tickets.
pub async fn my_tickets(
    State(state): State<AppState>,
    CurrentUser(member): CurrentUser,
) -> Result<Json<Vec<Ticket>>, AppError> {
    Ok(Json(state.catalog.my_tickets(&member).await?))
}

/// Ticket listing for administrators.
///
/// ```bash
/// curl -H "Authorization: Bearer <admin token>" \
///   "http://localhost:8080/api/tickets?event_id=<id>&payment_status=pending"
/// curl -H "Authorization: Bearer <admin token>" \
///   "http://localhost:8080/api/tickets?search=souza"
/// ```
pub async fn list_tickets(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiQuery(query): ApiQuery<ListTicketsQuery>,
) -> Result<Json<Vec<Ticket>>, AppError> {
    let tickets = state.catalog.list_tickets(&actor, query.into()).await?;
    Ok(Json(tickets))
}

/// Change a ticket's payment status.
pub async fn change_status(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<StatusBody>,
) -> Result<Json<Ticket>, AppError> {
    let ticket = state
        .catalog
        .change_ticket_status(&actor, TicketId::from_uuid(id), body.status)
        .await?;
    Ok(Json(ticket))
}
