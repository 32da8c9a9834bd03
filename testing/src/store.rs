//! In-memory Catalog Store for fast, deterministic tests.
//!
//! Implements the same conditional-update contract as the `PostgreSQL` store: the purchase
//! commit is a compare-and-swap on the sold counter, checked and applied under one write
//! lock together with the ticket insert, and ticket codes are unique.
//!
//! Fault injection helpers simulate writers in other processes so the ledger's retry path
//! can be exercised without a database.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Lock poisoning only happens after a test already panicked

use chrono::{DateTime, Utc};
use fanclub_core::store::{
    CatalogStore, EventQuery, NewsQuery, PhotoQuery, StoreFuture, TicketQuery,
    contains_ignore_case,
};
use fanclub_core::{
    Event, EventDetails, EventId, News, NewsId, PaymentStatus, Photo, PhotoId,
    Raffle, RaffleId, RaffleStatus, RaffleWinner, StoreError, Ticket, TicketId,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct Tables {
    events: HashMap<EventId, Event>,
    tickets: HashMap<TicketId, Ticket>,
    ticket_codes: HashSet<String>,
    raffles: HashMap<RaffleId, Raffle>,
    news: HashMap<NewsId, News>,
    photos: HashMap<PhotoId, Photo>,
    /// Commits to fail with `Conflict` before looking at the counter
    injected_conflicts: usize,
    /// Seats another writer sells right before each of the next commits
    interleaved_sales: Vec<u32>,
    commit_attempts: usize,
}

/// In-memory [`CatalogStore`].
///
/// # Example
///
/// ```
/// use fanclub_testing::InMemoryCatalogStore;
///
/// let store = InMemoryCatalogStore::new();
/// assert_eq!(store.ticket_count(), 0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryCatalogStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryCatalogStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an event as-is, sold counter included.
    pub fn seed_event(&self, event: Event) {
        self.tables.write().unwrap().events.insert(event.id, event);
    }

    /// Insert a ticket as-is, without touching any counter.
    pub fn seed_ticket(&self, ticket: Ticket) {
        let mut tables = self.tables.write().unwrap();
        tables.ticket_codes.insert(ticket.ticket_code.as_str().to_string());
        tables.tickets.insert(ticket.id, ticket);
    }

    /// Insert or replace a raffle as-is.
    pub fn seed_raffle(&self, raffle: Raffle) {
        self.tables.write().unwrap().raffles.insert(raffle.id, raffle);
    }

    /// Current copy of an event.
    #[must_use]
    pub fn event(&self, id: EventId) -> Option<Event> {
        self.tables.read().unwrap().events.get(&id).cloned()
    }

    /// Current copy of a raffle.
    #[must_use]
    pub fn raffle(&self, id: RaffleId) -> Option<Raffle> {
        self.tables.read().unwrap().raffles.get(&id).cloned()
    }

    /// Tickets of an event in purchase order.
    #[must_use]
    pub fn tickets_of(&self, event_id: EventId) -> Vec<Ticket> {
        let mut tickets: Vec<Ticket> = self
            .tables
            .read()
            .unwrap()
            .tickets
            .values()
            .filter(|t| t.event_id == event_id)
            .cloned()
            .collect();
        tickets.sort_by_key(|t| t.purchase_order);
        tickets
    }

    /// Number of stored tickets.
    #[must_use]
    pub fn ticket_count(&self) -> usize {
        self.tables.read().unwrap().tickets.len()
    }

    /// Number of `commit_purchase` calls so far, successful or not.
    #[must_use]
    pub fn commit_attempts(&self) -> usize {
        self.tables.read().unwrap().commit_attempts
    }

    /// Make the next `count` purchase commits fail with `Conflict`.
    pub fn inject_conflicts(&self, count: usize) {
        self.tables.write().unwrap().injected_conflicts = count;
    }

    /// Simulate another server instance selling `seats` of the target event right before
    /// each of the next commits, one entry per commit.
    pub fn interleave_sales(&self, seats: Vec<u32>) {
        self.tables.write().unwrap().interleaved_sales = seats;
    }

    fn not_found(entity: &'static str, id: impl ToString) -> StoreError {
        StoreError::not_found(entity, id)
    }
}

fn take_limit<T>(mut items: Vec<T>, limit: Option<usize>) -> Vec<T> {
    if let Some(limit) = limit {
        items.truncate(limit);
    }
    items
}

fn ticket_matches(ticket: &Ticket, query: &TicketQuery) -> bool {
    query.event_id.is_none_or(|id| ticket.event_id == id)
        && query
            .buyer_email
            .as_deref()
            .is_none_or(|email| ticket.buyer.email == email)
        && query.search.as_deref().is_none_or(|term| {
            contains_ignore_case(&ticket.buyer.full_name, term)
                || contains_ignore_case(&ticket.buyer.email, term)
                || contains_ignore_case(ticket.ticket_code.as_str(), term)
        })
        && query
            .payment_status
            .is_none_or(|status| ticket.payment_status == status)
        && (!query.eligible_only || ticket.eligible_for_raffle)
        && query.created_since.is_none_or(|since| ticket.created_at >= since)
}

fn news_matches(news: &News, query: &NewsQuery) -> bool {
    (!query.published_only || news.published)
        && query.category.is_none_or(|category| news.category == category)
        && query.search.as_deref().is_none_or(|term| {
            contains_ignore_case(&news.title, term) || contains_ignore_case(&news.summary, term)
        })
}

impl CatalogStore for InMemoryCatalogStore {
    fn get_event(&self, id: EventId) -> StoreFuture<'_, Event> {
        Box::pin(async move {
            self.event(id).ok_or_else(|| Self::not_found("event", id))
        })
    }

    fn list_events(&self, query: EventQuery) -> StoreFuture<'_, Vec<Event>> {
        Box::pin(async move {
            let tables = self.tables.read().unwrap();
            let mut events: Vec<Event> = tables
                .events
                .values()
                .filter(|e| query.public.is_none_or(|listing| listing.includes(e)))
                .cloned()
                .collect();
            if query.public.is_some() {
                events.sort_by_key(|e| e.date);
            } else {
                events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            }
            Ok(take_limit(events, query.limit))
        })
    }

    fn insert_event(&self, event: Event) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.seed_event(event);
            Ok(())
        })
    }

    fn update_event_details(
        &self,
        id: EventId,
        details: EventDetails,
        updated_at: DateTime<Utc>,
    ) -> StoreFuture<'_, Event> {
        Box::pin(async move {
            let mut tables = self.tables.write().unwrap();
            let event = tables
                .events
                .get_mut(&id)
                .ok_or_else(|| Self::not_found("event", id))?;
            event.apply_details(details, updated_at);
            Ok(event.clone())
        })
    }

    fn delete_event(&self, id: EventId) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.tables
                .write()
                .unwrap()
                .events
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| Self::not_found("event", id))
        })
    }

    fn commit_purchase(&self, expected_sold: u32, ticket: Ticket) -> StoreFuture<'_, u32> {
        Box::pin(async move {
            let mut tables = self.tables.write().unwrap();
            tables.commit_attempts += 1;

            if !tables.interleaved_sales.is_empty() {
                let seats = tables.interleaved_sales.remove(0);
                if let Some(event) = tables.events.get_mut(&ticket.event_id) {
                    event.sold_tickets = (event.sold_tickets + seats).min(event.total_tickets);
                }
            }

            if tables.injected_conflicts > 0 {
                tables.injected_conflicts -= 1;
                return Err(StoreError::conflict("event", ticket.event_id));
            }

            if tables.ticket_codes.contains(ticket.ticket_code.as_str()) {
                return Err(StoreError::Duplicate {
                    entity: "ticket",
                    field: "ticket_code",
                });
            }

            let event = tables
                .events
                .get_mut(&ticket.event_id)
                .ok_or_else(|| StoreError::not_found("event", ticket.event_id))?;
            let new_sold = expected_sold
                .checked_add(ticket.quantity)
                .filter(|&sold| sold <= event.total_tickets);
            let Some(new_sold) = new_sold.filter(|_| event.sold_tickets == expected_sold) else {
                return Err(StoreError::conflict("event", ticket.event_id));
            };

            event.sold_tickets = new_sold;
            event.updated_at = ticket.created_at;
            tables
                .ticket_codes
                .insert(ticket.ticket_code.as_str().to_string());
            tables.tickets.insert(ticket.id, ticket);
            Ok(new_sold)
        })
    }

    fn get_ticket(&self, id: TicketId) -> StoreFuture<'_, Ticket> {
        Box::pin(async move {
            self.tables
                .read()
                .unwrap()
                .tickets
                .get(&id)
                .cloned()
                .ok_or_else(|| Self::not_found("ticket", id))
        })
    }

    fn list_tickets(&self, query: TicketQuery) -> StoreFuture<'_, Vec<Ticket>> {
        Box::pin(async move {
            let tables = self.tables.read().unwrap();
            let mut tickets: Vec<Ticket> = tables
                .tickets
                .values()
                .filter(|t| ticket_matches(t, &query))
                .cloned()
                .collect();
            tickets.sort_by(|a, b| {
                b.created_at
                    .cmp(&a.created_at)
                    .then(b.purchase_order.cmp(&a.purchase_order))
            });
            Ok(take_limit(tickets, query.limit))
        })
    }

    fn transition_ticket_status(
        &self,
        id: TicketId,
        from: PaymentStatus,
        to: PaymentStatus,
        updated_at: DateTime<Utc>,
    ) -> StoreFuture<'_, Ticket> {
        Box::pin(async move {
            let mut tables = self.tables.write().unwrap();
            let ticket = tables
                .tickets
                .get_mut(&id)
                .ok_or_else(|| Self::not_found("ticket", id))?;
            if ticket.payment_status != from {
                return Err(StoreError::conflict("ticket", id));
            }
            ticket.payment_status = to;
            ticket.updated_at = updated_at;
            Ok(ticket.clone())
        })
    }

    fn get_raffle(&self, id: RaffleId) -> StoreFuture<'_, Raffle> {
        Box::pin(async move {
            self.raffle(id).ok_or_else(|| Self::not_found("raffle", id))
        })
    }

    fn list_raffles(&self, limit: Option<usize>) -> StoreFuture<'_, Vec<Raffle>> {
        Box::pin(async move {
            let tables = self.tables.read().unwrap();
            let mut raffles: Vec<Raffle> = tables.raffles.values().cloned().collect();
            raffles.sort_by(|a, b| {
                b.draw_date
                    .cmp(&a.draw_date)
                    .then(b.created_at.cmp(&a.created_at))
            });
            Ok(take_limit(raffles, limit))
        })
    }

    fn insert_raffle(&self, raffle: Raffle) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.seed_raffle(raffle);
            Ok(())
        })
    }

    fn update_raffle_details(
        &self,
        id: RaffleId,
        prize: String,
        prize_image_url: Option<String>,
    ) -> StoreFuture<'_, Raffle> {
        Box::pin(async move {
            let mut tables = self.tables.write().unwrap();
            let raffle = tables
                .raffles
                .get_mut(&id)
                .ok_or_else(|| Self::not_found("raffle", id))?;
            if raffle.status != RaffleStatus::Pending {
                return Err(StoreError::conflict("raffle", id));
            }
            raffle.prize = prize;
            raffle.prize_image_url = prize_image_url;
            Ok(raffle.clone())
        })
    }

    fn complete_raffle(
        &self,
        id: RaffleId,
        winner: RaffleWinner,
        draw_date: DateTime<Utc>,
    ) -> StoreFuture<'_, Raffle> {
        Box::pin(async move {
            let mut tables = self.tables.write().unwrap();
            let raffle = tables
                .raffles
                .get_mut(&id)
                .ok_or_else(|| Self::not_found("raffle", id))?;
            if raffle.status != RaffleStatus::Pending {
                return Err(StoreError::conflict("raffle", id));
            }
            raffle.status = RaffleStatus::Completed;
            raffle.winner = Some(winner);
            raffle.draw_date = Some(draw_date);
            Ok(raffle.clone())
        })
    }

    fn delete_raffle(&self, id: RaffleId) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.tables
                .write()
                .unwrap()
                .raffles
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| Self::not_found("raffle", id))
        })
    }

    fn insert_news(&self, news: News) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.tables.write().unwrap().news.insert(news.id, news);
            Ok(())
        })
    }

    fn get_news(&self, id: NewsId) -> StoreFuture<'_, News> {
        Box::pin(async move {
            self.tables
                .read()
                .unwrap()
                .news
                .get(&id)
                .cloned()
                .ok_or_else(|| Self::not_found("news", id))
        })
    }

    fn list_news(&self, query: NewsQuery) -> StoreFuture<'_, Vec<News>> {
        Box::pin(async move {
            let tables = self.tables.read().unwrap();
            let mut news: Vec<News> = tables
                .news
                .values()
                .filter(|n| news_matches(n, &query))
                .cloned()
                .collect();
            news.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(take_limit(news, query.limit))
        })
    }

    fn update_news(&self, news: News) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let mut tables = self.tables.write().unwrap();
            let slot = tables
                .news
                .get_mut(&news.id)
                .ok_or_else(|| Self::not_found("news", news.id))?;
            *slot = news;
            Ok(())
        })
    }

    fn delete_news(&self, id: NewsId) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.tables
                .write()
                .unwrap()
                .news
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| Self::not_found("news", id))
        })
    }

    fn insert_photos(&self, photos: Vec<Photo>) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let mut tables = self.tables.write().unwrap();
            for photo in photos {
                tables.photos.insert(photo.id, photo);
            }
            Ok(())
        })
    }

    fn get_photo(&self, id: PhotoId) -> StoreFuture<'_, Photo> {
        Box::pin(async move {
            self.tables
                .read()
                .unwrap()
                .photos
                .get(&id)
                .cloned()
                .ok_or_else(|| Self::not_found("photo", id))
        })
    }

    fn list_photos(&self, query: PhotoQuery) -> StoreFuture<'_, Vec<Photo>> {
        Box::pin(async move {
            let tables = self.tables.read().unwrap();
            let mut photos: Vec<Photo> = tables
                .photos
                .values()
                .filter(|p| !query.published_only || p.published)
                .filter(|p| query.album.is_none() || p.album == query.album)
                .cloned()
                .collect();
            photos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(take_limit(photos, query.limit))
        })
    }

    fn update_photo(&self, photo: Photo) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let mut tables = self.tables.write().unwrap();
            let slot = tables
                .photos
                .get_mut(&photo.id)
                .ok_or_else(|| Self::not_found("photo", photo.id))?;
            *slot = photo;
            Ok(())
        })
    }

    fn delete_photo(&self, id: PhotoId) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.tables
                .write()
                .unwrap()
                .photos
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| Self::not_found("photo", id))
        })
    }
}
