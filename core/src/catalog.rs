//! Catalog service: administrative CRUD and member-facing listings.
//!
//! Every mutating operation takes the acting [`Identity`] explicitly and checks its role
//! before touching the store. The sold counter and raffle completion are not reachable
//! from here; those belong to the [`Ledger`](crate::ledger::Ledger).

use crate::environment::LedgerEnvironment;
use crate::error::{LedgerError, Result, StoreError};
use crate::identity::Identity;
use crate::metrics;
use crate::reports::{ReportQuery, SalesReport};
use crate::store::{EventQuery, EventTimeframe, NewsQuery, PhotoQuery, TicketQuery};
use crate::types::{
    DEFAULT_RAFFLE_LIMIT, Event, EventDetails, EventId, EventStatus, Money, News, NewsCategory,
    NewsId, PaymentStatus, Photo, PhotoId, Raffle, RaffleId, Ticket, TicketId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tickets returned by [`Catalog::my_tickets`].
pub const MY_TICKETS_LIMIT: usize = 50;

// ============================================================================
// Inputs
// ============================================================================

/// Input for [`Catalog::create_event`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    /// Event title
    pub title: String,
    /// Long description
    #[serde(default)]
    pub description: String,
    /// Scheduled date and time
    pub date: DateTime<Utc>,
    /// Venue
    #[serde(default)]
    pub location: String,
    /// Cover image URL
    #[serde(default)]
    pub image_url: Option<String>,
    /// Price of one seat
    pub ticket_price: Money,
    /// Capacity
    pub total_tickets: u32,
    /// Raffle limit, [`DEFAULT_RAFFLE_LIMIT`] when absent
    #[serde(default)]
    pub raffle_limit: Option<u32>,
    /// Listed publicly
    #[serde(default)]
    pub published: bool,
}

/// Input for [`Catalog::create_raffle`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRaffle {
    /// Event whose buyers take part
    pub event_id: EventId,
    /// Prize description
    pub prize: String,
    /// Prize image URL
    #[serde(default)]
    pub prize_image_url: Option<String>,
}

/// Editable fields of a raffle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaffleDetails {
    /// Prize description
    pub prize: String,
    /// Prize image URL
    #[serde(default)]
    pub prize_image_url: Option<String>,
}

/// Content of a news article, for create and update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsDraft {
    /// Headline
    pub title: String,
    /// Short summary
    #[serde(default)]
    pub summary: String,
    /// Body
    pub content: String,
    /// Header image URL
    #[serde(default)]
    pub image_url: Option<String>,
    /// Category
    #[serde(default)]
    pub category: NewsCategory,
    /// Featured on the home page
    #[serde(default)]
    pub featured: bool,
    /// Publicly visible
    #[serde(default)]
    pub published: bool,
}

/// Content of a gallery photo, for create and update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoDraft {
    /// Caption
    #[serde(default)]
    pub title: String,
    /// Image URL
    pub image_url: String,
    /// Album
    #[serde(default)]
    pub album: Option<String>,
    /// Publicly visible
    #[serde(default = "published_by_default")]
    pub published: bool,
}

const fn published_by_default() -> bool {
    true
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(LedgerError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

fn validate_details(details: &EventDetails) -> Result<()> {
    require_text("title", &details.title)?;
    if details.raffle_limit == 0 {
        return Err(LedgerError::Validation(
            "raffle_limit must be at least 1".to_string(),
        ));
    }
    Ok(())
}

// ============================================================================
// Service
// ============================================================================

/// Administrative and member-facing catalog operations.
#[derive(Clone)]
pub struct Catalog {
    env: LedgerEnvironment,
}

impl Catalog {
    /// Creates a catalog service over `env`.
    #[must_use]
    pub const fn new(env: LedgerEnvironment) -> Self {
        Self { env }
    }

    // ═══════════════════════════════════════════════════════════
    // Events
    // ═══════════════════════════════════════════════════════════

    /// Create an event with nothing sold.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Forbidden`] for non-admins, [`LedgerError::Validation`] for an empty
    /// title, zero capacity or zero raffle limit.
    pub async fn create_event(&self, actor: &Identity, input: NewEvent) -> Result<Event> {
        actor.require_admin()?;
        if input.total_tickets == 0 {
            return Err(LedgerError::Validation(
                "total_tickets must be at least 1".to_string(),
            ));
        }

        let details = EventDetails {
            title: input.title,
            description: input.description,
            date: input.date,
            location: input.location,
            image_url: input.image_url,
            ticket_price: input.ticket_price,
            raffle_limit: input.raffle_limit.unwrap_or(DEFAULT_RAFFLE_LIMIT),
            status: EventStatus::Active,
            published: input.published,
        };
        validate_details(&details)?;

        let event = Event::new(EventId::new(), details, input.total_tickets, self.env.clock.now());
        self.env.store.insert_event(event.clone()).await?;

        tracing::info!(
            event_id = %event.id,
            total_tickets = event.total_tickets,
            raffle_limit = event.raffle_limit,
            "Event created"
        );
        metrics::record_event_created();
        Ok(event)
    }

    /// Replace the editable details of an event. Capacity and the sold counter are kept.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Forbidden`], [`LedgerError::Validation`] or [`LedgerError::NotFound`].
    pub async fn update_event(
        &self,
        actor: &Identity,
        id: EventId,
        details: EventDetails,
    ) -> Result<Event> {
        actor.require_admin()?;
        validate_details(&details)?;

        let event = self
            .env
            .store
            .update_event_details(id, details, self.env.clock.now())
            .await?;
        tracing::info!(event_id = %id, status = %event.status, "Event updated");
        Ok(event)
    }

    /// Delete an event that has not sold anything.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Validation`] once tickets have been sold; close or cancel the event
    /// instead.
    pub async fn delete_event(&self, actor: &Identity, id: EventId) -> Result<()> {
        actor.require_admin()?;

        let event = self.env.store.get_event(id).await?;
        if event.sold_tickets > 0 {
            return Err(LedgerError::Validation(format!(
                "event has {} sold tickets and cannot be deleted",
                event.sold_tickets
            )));
        }

        self.env.store.delete_event(id).await?;
        tracing::info!(event_id = %id, "Event deleted");
        Ok(())
    }

    /// Load an event. Unpublished events are only visible to admins.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NotFound`] if missing or hidden from `viewer`.
    pub async fn get_event(&self, viewer: Option<&Identity>, id: EventId) -> Result<Event> {
        let event = self.env.store.get_event(id).await?;
        if !event.published && !viewer.is_some_and(Identity::is_admin) {
            return Err(LedgerError::not_found("event", id));
        }
        Ok(event)
    }

    /// Published events in `timeframe`, by date.
    ///
    /// Upcoming events are active and not yet held. Past events were held or closed.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Store`] on storage failure.
    pub async fn list_public_events(
        &self,
        timeframe: EventTimeframe,
        limit: Option<usize>,
    ) -> Result<Vec<Event>> {
        let query = EventQuery::public(timeframe, self.env.clock.now(), limit);
        Ok(self.env.store.list_events(query).await?)
    }

    /// Every event, newest first.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Forbidden`] for non-admins.
    pub async fn list_all_events(&self, actor: &Identity) -> Result<Vec<Event>> {
        actor.require_admin()?;
        Ok(self.env.store.list_events(EventQuery::default()).await?)
    }

    // ═══════════════════════════════════════════════════════════
    // Tickets
    // ═══════════════════════════════════════════════════════════

    /// The member's own tickets, newest first.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Store`] on storage failure.
    pub async fn my_tickets(&self, member: &Identity) -> Result<Vec<Ticket>> {
        let tickets = self
            .env
            .store
            .list_tickets(TicketQuery {
                buyer_email: Some(member.email.clone()),
                limit: Some(MY_TICKETS_LIMIT),
                ..TicketQuery::default()
            })
            .await?;
        Ok(tickets)
    }

    /// Search tickets. A blank search term matches everything.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Forbidden`] for non-admins.
    pub async fn list_tickets(&self, actor: &Identity, query: TicketQuery) -> Result<Vec<Ticket>> {
        actor.require_admin()?;
        let query = TicketQuery {
            search: query.search.filter(|term| !term.trim().is_empty()),
            ..query
        };
        Ok(self.env.store.list_tickets(query).await?)
    }

    /// Change a ticket's payment status.
    ///
    /// Allowed: pending → paid, pending → cancelled, paid → cancelled. Cancelling does not
    /// give seats back.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidStatusTransition`] for any other change.
    /// - [`LedgerError::ConcurrentUpdateConflict`] if the status changed meanwhile.
    pub async fn change_ticket_status(
        &self,
        actor: &Identity,
        id: TicketId,
        to: PaymentStatus,
    ) -> Result<Ticket> {
        actor.require_admin()?;

        let ticket = self.env.store.get_ticket(id).await?;
        let from = ticket.payment_status;
        if !from.can_transition_to(to) {
            return Err(LedgerError::InvalidStatusTransition { from, to });
        }

        let updated = self
            .env
            .store
            .transition_ticket_status(id, from, to, self.env.clock.now())
            .await?;

        tracing::info!(ticket_id = %id, %from, %to, "Ticket status changed");
        metrics::record_ticket_status_changed(to.as_str());
        Ok(updated)
    }

    // ═══════════════════════════════════════════════════════════
    // Raffles
    // ═══════════════════════════════════════════════════════════

    /// Create a pending raffle for an existing event.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NotFound`] if the event does not exist.
    pub async fn create_raffle(&self, actor: &Identity, input: NewRaffle) -> Result<Raffle> {
        actor.require_admin()?;
        require_text("prize", &input.prize)?;

        let event = self.env.store.get_event(input.event_id).await?;
        let raffle = Raffle::new(
            RaffleId::new(),
            event.id,
            input.prize,
            input.prize_image_url,
            self.env.clock.now(),
        );
        self.env.store.insert_raffle(raffle.clone()).await?;

        tracing::info!(raffle_id = %raffle.id, event_id = %event.id, "Raffle created");
        Ok(raffle)
    }

    /// Edit the prize of a pending raffle.
    ///
    /// # Errors
    ///
    /// [`LedgerError::AlreadyDrawn`] once the raffle is completed.
    pub async fn update_raffle(
        &self,
        actor: &Identity,
        id: RaffleId,
        details: RaffleDetails,
    ) -> Result<Raffle> {
        actor.require_admin()?;
        require_text("prize", &details.prize)?;

        match self
            .env
            .store
            .update_raffle_details(id, details.prize, details.prize_image_url)
            .await
        {
            Ok(raffle) => Ok(raffle),
            Err(StoreError::Conflict { .. }) => Err(LedgerError::AlreadyDrawn),
            Err(err) => Err(err.into()),
        }
    }

    /// Delete a raffle.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Forbidden`] or [`LedgerError::NotFound`].
    pub async fn delete_raffle(&self, actor: &Identity, id: RaffleId) -> Result<()> {
        actor.require_admin()?;
        self.env.store.delete_raffle(id).await?;
        tracing::info!(raffle_id = %id, "Raffle deleted");
        Ok(())
    }

    /// Load a raffle.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NotFound`] if it does not exist.
    pub async fn get_raffle(&self, id: RaffleId) -> Result<Raffle> {
        Ok(self.env.store.get_raffle(id).await?)
    }

    /// Raffles, most recently drawn first.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Store`] on storage failure.
    pub async fn list_raffles(&self, limit: Option<usize>) -> Result<Vec<Raffle>> {
        Ok(self.env.store.list_raffles(limit).await?)
    }

    // ═══════════════════════════════════════════════════════════
    // News
    // ═══════════════════════════════════════════════════════════

    /// Publish or draft an article.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Validation`] for an empty title or body.
    pub async fn create_news(&self, actor: &Identity, draft: NewsDraft) -> Result<News> {
        actor.require_admin()?;
        require_text("title", &draft.title)?;
        require_text("content", &draft.content)?;

        let now = self.env.clock.now();
        let news = News {
            id: NewsId::new(),
            title: draft.title,
            summary: draft.summary,
            content: draft.content,
            image_url: draft.image_url,
            category: draft.category,
            featured: draft.featured,
            published: draft.published,
            created_at: now,
            updated_at: now,
        };
        self.env.store.insert_news(news.clone()).await?;
        tracing::info!(news_id = %news.id, published = news.published, "News created");
        Ok(news)
    }

    /// Replace an article's content.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NotFound`] if the article does not exist.
    pub async fn update_news(&self, actor: &Identity, id: NewsId, draft: NewsDraft) -> Result<News> {
        actor.require_admin()?;
        require_text("title", &draft.title)?;
        require_text("content", &draft.content)?;

        let current = self.env.store.get_news(id).await?;
        let news = News {
            title: draft.title,
            summary: draft.summary,
            content: draft.content,
            image_url: draft.image_url,
            category: draft.category,
            featured: draft.featured,
            published: draft.published,
            updated_at: self.env.clock.now(),
            ..current
        };
        self.env.store.update_news(news.clone()).await?;
        Ok(news)
    }

    /// Delete an article.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NotFound`] if the article does not exist.
    pub async fn delete_news(&self, actor: &Identity, id: NewsId) -> Result<()> {
        actor.require_admin()?;
        self.env.store.delete_news(id).await?;
        Ok(())
    }

    /// Published articles, newest first, narrowed by `query`'s category and search.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Store`] on storage failure.
    pub async fn list_published_news(&self, query: NewsQuery) -> Result<Vec<News>> {
        let query = NewsQuery {
            published_only: true,
            search: query.search.filter(|term| !term.trim().is_empty()),
            ..query
        };
        Ok(self.env.store.list_news(query).await?)
    }

    // ═══════════════════════════════════════════════════════════
    // Photos
    // ═══════════════════════════════════════════════════════════

    /// Add a batch of photos, all or nothing.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Validation`] for an empty batch or a photo without an image URL.
    pub async fn add_photos(&self, actor: &Identity, drafts: Vec<PhotoDraft>) -> Result<Vec<Photo>> {
        actor.require_admin()?;
        if drafts.is_empty() {
            return Err(LedgerError::Validation("no photos given".to_string()));
        }
        for draft in &drafts {
            require_text("image_url", &draft.image_url)?;
        }

        let now = self.env.clock.now();
        let photos: Vec<Photo> = drafts
            .into_iter()
            .map(|draft| Photo {
                id: PhotoId::new(),
                title: draft.title,
                image_url: draft.image_url,
                album: draft.album,
                published: draft.published,
                created_at: now,
            })
            .collect();

        self.env.store.insert_photos(photos.clone()).await?;
        tracing::info!(count = photos.len(), "Photos added");
        Ok(photos)
    }

    /// Replace a photo's caption, URL, album or visibility.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NotFound`] if the photo does not exist.
    pub async fn update_photo(
        &self,
        actor: &Identity,
        id: PhotoId,
        draft: PhotoDraft,
    ) -> Result<Photo> {
        actor.require_admin()?;
        require_text("image_url", &draft.image_url)?;

        let current = self.env.store.get_photo(id).await?;
        let photo = Photo {
            title: draft.title,
            image_url: draft.image_url,
            album: draft.album,
            published: draft.published,
            ..current
        };
        self.env.store.update_photo(photo.clone()).await?;
        Ok(photo)
    }

    /// Delete a photo.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NotFound`] if the photo does not exist.
    pub async fn delete_photo(&self, actor: &Identity, id: PhotoId) -> Result<()> {
        actor.require_admin()?;
        self.env.store.delete_photo(id).await?;
        Ok(())
    }

    /// Published photos, newest first, optionally from one album.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Store`] on storage failure.
    pub async fn list_published_photos(
        &self,
        album: Option<String>,
        limit: Option<usize>,
    ) -> Result<Vec<Photo>> {
        let photos = self
            .env
            .store
            .list_photos(PhotoQuery {
                published_only: true,
                album,
                limit,
            })
            .await?;
        Ok(photos)
    }

    // ═══════════════════════════════════════════════════════════
    // Reports
    // ═══════════════════════════════════════════════════════════

    /// Sales figures for the requested period.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Forbidden`] for non-admins, [`LedgerError::Validation`] for a period
    /// outside `1..=MAX_PERIOD_DAYS`.
    ///
    /// [`MAX_PERIOD_DAYS`]: crate::reports::MAX_PERIOD_DAYS
    pub async fn sales_report(&self, actor: &Identity, query: ReportQuery) -> Result<SalesReport> {
        actor.require_admin()?;
        query.validate()?;

        let now = self.env.clock.now();
        let tickets = self
            .env
            .store
            .list_tickets(TicketQuery {
                event_id: query.event_id,
                payment_status: Some(PaymentStatus::Paid),
                created_since: Some(query.period_start(now)),
                ..TicketQuery::default()
            })
            .await?;
        let events = self.env.store.list_events(EventQuery::default()).await?;

        Ok(SalesReport::compile(&tickets, &events, &query, now))
    }
}
