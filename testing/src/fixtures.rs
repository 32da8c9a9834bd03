//! Builders for identities, events and a wired-up in-memory backend.

use crate::mocks::{ScriptedTicketCodes, ScriptedWinnerSelector, test_clock, test_time};
use crate::store::InMemoryCatalogStore;
use chrono::{DateTime, Duration, Utc};
use fanclub_core::{
    Catalog, Event, EventDetails, EventId, EventStatus, Identity, Ledger, LedgerEnvironment,
    MemberId, Money, PaymentMethod, PurchaseRequest, Raffle, RaffleId, RetryPolicy, Role,
};
use std::sync::Arc;

/// A member identity with a predictable email.
#[must_use]
pub fn member(name: &str) -> Identity {
    Identity {
        member_id: MemberId::new(),
        email: format!("{name}@fans.example"),
        full_name: name.to_string(),
        role: Role::Member,
    }
}

/// An administrator identity.
#[must_use]
pub fn admin() -> Identity {
    Identity {
        member_id: MemberId::new(),
        email: "admin@fans.example".to_string(),
        full_name: "Club Admin".to_string(),
        role: Role::Admin,
    }
}

/// A purchase request paid by card.
#[must_use]
pub const fn purchase_of(event_id: EventId, quantity: u32) -> PurchaseRequest {
    PurchaseRequest {
        event_id,
        quantity,
        payment_method: PaymentMethod::Card,
    }
}

/// Builder for events with sensible defaults.
///
/// Defaults: published, active, 30 days after [`test_time`], 100 seats, raffle limit 100,
/// R$ 50.00 per seat, nothing sold.
#[derive(Debug, Clone)]
pub struct EventBuilder {
    details: EventDetails,
    total_tickets: u32,
    sold_tickets: u32,
}

impl Default for EventBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBuilder {
    /// Start from the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            details: EventDetails {
                title: "Derby watch party".to_string(),
                description: "Big screen, club songs, cold drinks".to_string(),
                date: test_time() + Duration::days(30),
                location: "Fan club HQ".to_string(),
                image_url: None,
                ticket_price: Money::from_cents(5_000),
                raffle_limit: 100,
                status: EventStatus::Active,
                published: true,
            },
            total_tickets: 100,
            sold_tickets: 0,
        }
    }

    /// Set the title.
    #[must_use]
    pub fn title(mut self, title: &str) -> Self {
        self.details.title = title.to_string();
        self
    }

    /// Set the capacity.
    #[must_use]
    pub const fn capacity(mut self, total_tickets: u32) -> Self {
        self.total_tickets = total_tickets;
        self
    }

    /// Pretend `sold` seats were already sold.
    #[must_use]
    pub const fn sold(mut self, sold: u32) -> Self {
        self.sold_tickets = sold;
        self
    }

    /// Set the raffle limit.
    #[must_use]
    pub const fn raffle_limit(mut self, limit: u32) -> Self {
        self.details.raffle_limit = limit;
        self
    }

    /// Set the seat price in cents.
    #[must_use]
    pub const fn price_cents(mut self, cents: u64) -> Self {
        self.details.ticket_price = Money::from_cents(cents);
        self
    }

    /// Set the status.
    #[must_use]
    pub const fn status(mut self, status: EventStatus) -> Self {
        self.details.status = status;
        self
    }

    /// Set the scheduled date.
    #[must_use]
    pub const fn date(mut self, date: DateTime<Utc>) -> Self {
        self.details.date = date;
        self
    }

    /// Hide the event from public listings.
    #[must_use]
    pub const fn unpublished(mut self) -> Self {
        self.details.published = false;
        self
    }

    /// Build the event.
    #[must_use]
    pub fn build(self) -> Event {
        let mut event = Event::new(
            EventId::new(),
            self.details,
            self.total_tickets,
            test_time() - Duration::days(7),
        );
        event.sold_tickets = self.sold_tickets;
        event
    }
}

/// Ledger and catalog wired to an in-memory store and deterministic mocks.
pub struct TestBackend {
    /// The store, for seeding and inspection
    pub store: Arc<InMemoryCatalogStore>,
    /// Ticket codes handed out by the ledger
    pub codes: Arc<ScriptedTicketCodes>,
    /// Winner selection used by draws
    pub selector: Arc<ScriptedWinnerSelector>,
    /// The ledger
    pub ledger: Arc<Ledger>,
    /// The catalog service
    pub catalog: Catalog,
}

impl TestBackend {
    /// Backend with sequential codes, a selector picking index 0 and a fast retry policy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_parts(
            ScriptedTicketCodes::new(),
            ScriptedWinnerSelector::new(0),
            fast_retry(),
        )
    }

    /// Backend with explicit mocks.
    #[must_use]
    pub fn with_parts(
        codes: ScriptedTicketCodes,
        selector: ScriptedWinnerSelector,
        retry: RetryPolicy,
    ) -> Self {
        let store = Arc::new(InMemoryCatalogStore::new());
        let codes = Arc::new(codes);
        let selector = Arc::new(selector);
        let env = LedgerEnvironment::new(store.clone(), retry)
            .with_clock(Arc::new(test_clock()))
            .with_codes(codes.clone())
            .with_selector(selector.clone());

        Self {
            store,
            codes,
            selector,
            ledger: Arc::new(Ledger::new(env.clone())),
            catalog: Catalog::new(env),
        }
    }

    /// Seed `event` and return its ID.
    #[must_use]
    pub fn seed(&self, event: Event) -> EventId {
        let id = event.id;
        self.store.seed_event(event);
        id
    }

    /// Seed a pending raffle for `event_id` and return its ID.
    #[must_use]
    pub fn seed_raffle(&self, event_id: EventId) -> RaffleId {
        let raffle = Raffle::new(
            RaffleId::new(),
            event_id,
            "Signed home jersey".to_string(),
            None,
            test_time(),
        );
        let id = raffle.id;
        self.store.seed_raffle(raffle);
        id
    }
}

impl Default for TestBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Retry policy with millisecond delays, for tests.
#[must_use]
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy::builder()
        .max_retries(3)
        .initial_delay(std::time::Duration::from_millis(1))
        .max_delay(std::time::Duration::from_millis(2))
        .build()
}
