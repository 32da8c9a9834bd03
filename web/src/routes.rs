//! Router configuration.

use crate::api::{events, news, photos, raffles, reports, tickets};
use crate::health::{health_check, readiness_check};
use crate::middleware::correlation_id_layer;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// Health checks live at the root; everything else is nested under `/api`. Handlers
/// that need an identity read it from the bearer token themselves, so there is no
/// authentication layer.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Events
        .route("/events", get(events::list_events).post(events::create_event))
        .route(
            "/events/:id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/events/:id/purchase", post(events::purchase))
        // Tickets
        .route("/tickets", get(tickets::list_tickets))
        .route("/tickets/mine", get(tickets::my_tickets))
        .route("/tickets/:id/status", put(tickets::change_status))
        // Raffles
        .route(
            "/raffles",
            get(raffles::list_raffles).post(raffles::create_raffle),
        )
        .route(
            "/raffles/:id",
            get(raffles::get_raffle)
                .put(raffles::update_raffle)
                .delete(raffles::delete_raffle),
        )
        .route("/raffles/:id/draw", post(raffles::draw_winner))
        .route("/raffles/:id/participants", get(raffles::participants))
        // News
        .route("/news", get(news::list_news).post(news::create_news))
        .route(
            "/news/:id",
            put(news::update_news).delete(news::delete_news),
        )
        // Gallery
        .route("/photos", get(photos::list_photos).post(photos::add_photos))
        .route(
            "/photos/:id",
            put(photos::update_photo).delete(photos::delete_photo),
        )
        // Reports
        .route("/reports/sales", get(reports::sales_report));

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
        .with_state(state)
}
