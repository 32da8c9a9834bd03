//! Catalog Store abstraction.
//!
//! The store persists events, tickets, raffles, news and photos. Beyond plain CRUD it
//! must provide two atomic conditional updates that the ledger relies on:
//!
//! - [`CatalogStore::commit_purchase`]: compare-and-swap on an event's sold counter
//!   together with the ticket insert, as one unit.
//! - [`CatalogStore::complete_raffle`]: completion only while the raffle is pending.
//!
//! A last-write-wins store cannot implement this trait correctly.
//!
//! # Dyn Compatibility
//!
//! Methods return `Pin<Box<dyn Future>>` instead of using `async fn` so the store can be
//! shared as `Arc<dyn CatalogStore>` across the ledger, the catalog service and the web
//! layer.

use crate::error::StoreError;
use crate::types::{
    Event, EventDetails, EventId, EventStatus, News, NewsCategory, NewsId, PaymentStatus, Photo,
    PhotoId, Raffle, RaffleId, RaffleWinner, Ticket, TicketId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by every [`CatalogStore`] method.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Which published events a public listing shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTimeframe {
    /// Active events that have not happened yet
    #[default]
    Upcoming,
    /// Events that already happened or were closed
    Past,
    /// Every published event
    All,
}

impl EventTimeframe {
    /// Database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Past => "past",
            Self::All => "all",
        }
    }
}

/// A public listing window: published events in `timeframe`, as seen at `now`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicListing {
    /// Which events to show
    pub timeframe: EventTimeframe,
    /// Instant separating upcoming from past
    pub now: DateTime<Utc>,
}

impl PublicListing {
    /// Whether `event` belongs in this listing.
    #[must_use]
    pub fn includes(&self, event: &Event) -> bool {
        if !event.published {
            return false;
        }
        match self.timeframe {
            EventTimeframe::Upcoming => {
                event.status == EventStatus::Active && event.date >= self.now
            },
            EventTimeframe::Past => event.status == EventStatus::Closed || event.date < self.now,
            EventTimeframe::All => true,
        }
    }
}

/// Filter for [`CatalogStore::list_events`].
///
/// Without `public` every event is listed, newest first. Public listings are ordered by
/// date ascending.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventQuery {
    /// Restrict to a public listing window
    pub public: Option<PublicListing>,
    /// Maximum number of results
    pub limit: Option<usize>,
}

impl EventQuery {
    /// Published events in `timeframe` as of `now`.
    #[must_use]
    pub const fn public(timeframe: EventTimeframe, now: DateTime<Utc>, limit: Option<usize>) -> Self {
        Self {
            public: Some(PublicListing { timeframe, now }),
            limit,
        }
    }
}

/// Filter for [`CatalogStore::list_tickets`]. Results are newest first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TicketQuery {
    /// Restrict to one event
    pub event_id: Option<EventId>,
    /// Restrict to one buyer
    pub buyer_email: Option<String>,
    /// Case-insensitive substring of the buyer's name, email or the ticket code
    pub search: Option<String>,
    /// Restrict to one payment status
    pub payment_status: Option<PaymentStatus>,
    /// Only raffle-eligible tickets
    pub eligible_only: bool,
    /// Only tickets created at or after this instant
    pub created_since: Option<DateTime<Utc>>,
    /// Maximum number of results
    pub limit: Option<usize>,
}

impl TicketQuery {
    /// Tickets of one event.
    #[must_use]
    pub fn for_event(event_id: EventId) -> Self {
        Self {
            event_id: Some(event_id),
            ..Self::default()
        }
    }

    /// The raffle pool of one event: eligible tickets that are paid.
    #[must_use]
    pub fn raffle_pool(event_id: EventId) -> Self {
        Self {
            event_id: Some(event_id),
            payment_status: Some(PaymentStatus::Paid),
            eligible_only: true,
            ..Self::default()
        }
    }
}

/// Filter for [`CatalogStore::list_news`]. Results are newest first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewsQuery {
    /// Only published articles
    pub published_only: bool,
    /// Restrict to one category
    pub category: Option<NewsCategory>,
    /// Case-insensitive substring of the title or summary
    pub search: Option<String>,
    /// Maximum number of results
    pub limit: Option<usize>,
}

/// Whether `haystack` contains `needle`, ignoring case.
///
/// The matching rule behind the `search` filters; stores that search natively must agree
/// with it.
#[must_use]
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Filter for [`CatalogStore::list_photos`]. Results are newest first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PhotoQuery {
    /// Only published photos
    pub published_only: bool,
    /// Restrict to one album
    pub album: Option<String>,
    /// Maximum number of results
    pub limit: Option<usize>,
}

/// Persistent catalog of fan club records.
pub trait CatalogStore: Send + Sync {
    // ═══════════════════════════════════════════════════════════
    // Events
    // ═══════════════════════════════════════════════════════════

    /// Load an event.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the event does not exist.
    fn get_event(&self, id: EventId) -> StoreFuture<'_, Event>;

    /// List events. Public listings are ordered by date ascending, full listings by
    /// creation time descending.
    fn list_events(&self, query: EventQuery) -> StoreFuture<'_, Vec<Event>>;

    /// Insert a new event.
    fn insert_event(&self, event: Event) -> StoreFuture<'_, ()>;

    /// Replace the editable part of an event. Never touches capacity or the sold counter.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the event does not exist.
    fn update_event_details(
        &self,
        id: EventId,
        details: EventDetails,
        updated_at: DateTime<Utc>,
    ) -> StoreFuture<'_, Event>;

    /// Delete an event.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the event does not exist.
    fn delete_event(&self, id: EventId) -> StoreFuture<'_, ()>;

    /// Atomically commit a purchase.
    ///
    /// Sets the event's sold counter to `expected_sold + ticket.quantity` and inserts
    /// `ticket`, but only if the counter still holds `expected_sold` and the new value does
    /// not exceed capacity. Returns the new counter value.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Conflict`] if the condition failed; nothing was written.
    /// - [`StoreError::Duplicate`] if the ticket code is taken; nothing was written.
    /// - [`StoreError::NotFound`] if the event does not exist.
    fn commit_purchase(&self, expected_sold: u32, ticket: Ticket) -> StoreFuture<'_, u32>;

    // ═══════════════════════════════════════════════════════════
    // Tickets
    // ═══════════════════════════════════════════════════════════

    /// Load a ticket.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the ticket does not exist.
    fn get_ticket(&self, id: TicketId) -> StoreFuture<'_, Ticket>;

    /// List tickets matching `query`, newest first.
    fn list_tickets(&self, query: TicketQuery) -> StoreFuture<'_, Vec<Ticket>>;

    /// Change a ticket's payment status if it currently is `from`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Conflict`] if the current status is not `from`.
    /// - [`StoreError::NotFound`] if the ticket does not exist.
    fn transition_ticket_status(
        &self,
        id: TicketId,
        from: PaymentStatus,
        to: PaymentStatus,
        updated_at: DateTime<Utc>,
    ) -> StoreFuture<'_, Ticket>;

    // ═══════════════════════════════════════════════════════════
    // Raffles
    // ═══════════════════════════════════════════════════════════

    /// Load a raffle.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the raffle does not exist.
    fn get_raffle(&self, id: RaffleId) -> StoreFuture<'_, Raffle>;

    /// List raffles, most recently drawn first, then newest.
    fn list_raffles(&self, limit: Option<usize>) -> StoreFuture<'_, Vec<Raffle>>;

    /// Insert a new raffle.
    fn insert_raffle(&self, raffle: Raffle) -> StoreFuture<'_, ()>;

    /// Update prize details of a pending raffle.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Conflict`] if the raffle is already completed.
    /// - [`StoreError::NotFound`] if the raffle does not exist.
    fn update_raffle_details(
        &self,
        id: RaffleId,
        prize: String,
        prize_image_url: Option<String>,
    ) -> StoreFuture<'_, Raffle>;

    /// Mark a pending raffle completed with its winner.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Conflict`] if the raffle is not pending; nothing was written.
    /// - [`StoreError::NotFound`] if the raffle does not exist.
    fn complete_raffle(
        &self,
        id: RaffleId,
        winner: RaffleWinner,
        draw_date: DateTime<Utc>,
    ) -> StoreFuture<'_, Raffle>;

    /// Delete a raffle.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the raffle does not exist.
    fn delete_raffle(&self, id: RaffleId) -> StoreFuture<'_, ()>;

    // ═══════════════════════════════════════════════════════════
    // News
    // ═══════════════════════════════════════════════════════════

    /// Insert an article.
    fn insert_news(&self, news: News) -> StoreFuture<'_, ()>;

    /// Load an article.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the article does not exist.
    fn get_news(&self, id: NewsId) -> StoreFuture<'_, News>;

    /// List articles, newest first.
    fn list_news(&self, query: NewsQuery) -> StoreFuture<'_, Vec<News>>;

    /// Replace an article.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the article does not exist.
    fn update_news(&self, news: News) -> StoreFuture<'_, ()>;

    /// Delete an article.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the article does not exist.
    fn delete_news(&self, id: NewsId) -> StoreFuture<'_, ()>;

    // ═══════════════════════════════════════════════════════════
    // Photos
    // ═══════════════════════════════════════════════════════════

    /// Insert photos, all or nothing.
    fn insert_photos(&self, photos: Vec<Photo>) -> StoreFuture<'_, ()>;

    /// Load a photo.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the photo does not exist.
    fn get_photo(&self, id: PhotoId) -> StoreFuture<'_, Photo>;

    /// List photos, newest first.
    fn list_photos(&self, query: PhotoQuery) -> StoreFuture<'_, Vec<Photo>>;

    /// Replace a photo.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the photo does not exist.
    fn update_photo(&self, photo: Photo) -> StoreFuture<'_, ()>;

    /// Delete a photo.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the photo does not exist.
    fn delete_photo(&self, id: PhotoId) -> StoreFuture<'_, ()>;
}
