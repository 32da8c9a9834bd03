//! Business metrics for the fan club ledger.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `fanclub_purchases_total{outcome}` - Purchase attempts by outcome
//! - `fanclub_tickets_sold_total` - Seats sold
//! - `fanclub_revenue_cents_total` - Revenue of committed purchases in cents
//! - `fanclub_purchase_conflicts_total` - Lost compare-and-swap commits (retried)
//! - `fanclub_raffles_drawn_total` - Completed raffle draws
//! - `fanclub_events_created_total` - Events created
//! - `fanclub_ticket_status_changes_total{to}` - Administrative payment status changes
//!
//! ## Histograms
//! - `fanclub_purchase_duration_seconds` - Time spent in the purchase critical section

use metrics::{describe_counter, describe_histogram};

/// Initialize and register all business metrics descriptions.
///
/// This should be called once at application startup, before any metrics are recorded.
pub fn register_business_metrics() {
    describe_counter!(
        "fanclub_purchases_total",
        "Total purchase attempts by outcome (committed, capacity_exceeded, not_purchasable, transient_failure, error)"
    );
    describe_counter!("fanclub_tickets_sold_total", "Total number of seats sold");
    describe_counter!(
        "fanclub_revenue_cents_total",
        "Total value of committed purchases in cents"
    );
    describe_counter!(
        "fanclub_purchase_conflicts_total",
        "Purchase commits that lost the conditional update and were retried"
    );
    describe_histogram!(
        "fanclub_purchase_duration_seconds",
        "Time taken to commit a purchase, including retries"
    );

    describe_counter!("fanclub_raffles_drawn_total", "Total number of raffle draws");

    describe_counter!("fanclub_events_created_total", "Total number of events created");
    describe_counter!(
        "fanclub_ticket_status_changes_total",
        "Administrative payment status changes by target status"
    );

    tracing::info!("Business metrics registered");
}

// ============================================================================
// Metric Recording Functions
// ============================================================================

/// Record a committed purchase.
///
/// # Arguments
///
/// * `quantity` - Seats in the purchase
/// * `amount_cents` - Total price in cents
/// * `duration_secs` - Time spent committing, including retries
pub fn record_purchase_committed(quantity: u32, amount_cents: u64, duration_secs: f64) {
    metrics::counter!("fanclub_purchases_total", "outcome" => "committed").increment(1);
    metrics::counter!("fanclub_tickets_sold_total").increment(u64::from(quantity));
    metrics::counter!("fanclub_revenue_cents_total").increment(amount_cents);
    metrics::histogram!("fanclub_purchase_duration_seconds").record(duration_secs);
    tracing::debug!(quantity, amount_cents, "Recorded purchase_committed metric");
}

/// Record a rejected purchase.
///
/// # Arguments
///
/// * `outcome` - Rejection label (e.g., `capacity_exceeded`, `not_purchasable`)
pub fn record_purchase_rejected(outcome: &'static str) {
    metrics::counter!("fanclub_purchases_total", "outcome" => outcome).increment(1);
    tracing::debug!(outcome, "Recorded purchase_rejected metric");
}

/// Record a lost conditional update on the sold counter.
pub fn record_purchase_conflict() {
    metrics::counter!("fanclub_purchase_conflicts_total").increment(1);
}

/// Record a completed raffle draw.
///
/// # Arguments
///
/// * `participants` - Size of the pool the winner was drawn from
pub fn record_raffle_drawn(participants: usize) {
    metrics::counter!("fanclub_raffles_drawn_total").increment(1);
    tracing::debug!(participants, "Recorded raffle_drawn metric");
}

/// Record an event created.
pub fn record_event_created() {
    metrics::counter!("fanclub_events_created_total").increment(1);
    tracing::debug!("Recorded event_created metric");
}

/// Record an administrative payment status change.
pub fn record_ticket_status_changed(to: &'static str) {
    metrics::counter!("fanclub_ticket_status_changes_total", "to" => to).increment(1);
    tracing::debug!(to, "Recorded ticket_status_changed metric");
}
