//! `PostgreSQL` implementation of [`CatalogStore`].

use crate::rows::{
    count_from_db, count_to_db, database_error, decode_all, event_columns, event_from_row,
    like_pattern, limit_to_db, money_to_db, news_columns, news_from_row, photo_columns,
    photo_from_row, raffle_columns, raffle_from_row, ticket_columns, ticket_from_row,
    violated_unique_constraint,
};
use chrono::{DateTime, Utc};
use fanclub_core::{
    CatalogStore, Event, EventDetails, EventId, EventQuery, News, NewsId, NewsQuery,
    PaymentStatus, Photo, PhotoId, PhotoQuery, Raffle, RaffleId, RaffleStatus, RaffleWinner,
    StoreError, StoreFuture, Ticket, TicketId, TicketQuery,
};
use sqlx::postgres::{PgExecutor, PgPool, PgPoolOptions};
use tracing::{debug, info, warn};
use uuid::Uuid;

const TICKET_CODE_CONSTRAINT: &str = "tickets_ticket_code_unique";
const PURCHASE_ORDER_CONSTRAINT: &str = "tickets_purchase_order_unique";

/// `PostgreSQL`-backed catalog store.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone, Debug)]
pub struct PostgresCatalogStore {
    pool: PgPool,
}

impl PostgresCatalogStore {
    /// Wrap an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect with default pool settings.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the database is unreachable.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(database_error)?;
        Ok(Self::new(pool))
    }

    /// The underlying pool, shared with the identity provider.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns error if migrations fail.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(format!("Migration failed: {e}")))?;
        info!("Catalog migrations applied");
        Ok(())
    }

    /// Whether the database answers a trivial query.
    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

/// Distinguish "lost the conditional update" from "row does not exist" after a guarded
/// `UPDATE` matched nothing.
async fn missing_or_conflict<'e, E>(
    executor: E,
    exists_sql: &'static str,
    entity: &'static str,
    id: Uuid,
) -> StoreError
where
    E: PgExecutor<'e>,
{
    match sqlx::query_scalar::<_, bool>(exists_sql)
        .bind(id)
        .fetch_one(executor)
        .await
    {
        Ok(true) => StoreError::conflict(entity, id),
        Ok(false) => StoreError::not_found(entity, id),
        Err(e) => database_error(e),
    }
}

async fn insert_ticket<'e, E>(executor: E, ticket: &Ticket) -> Result<(), StoreError>
where
    E: PgExecutor<'e>,
{
    sqlx::query(concat!(
        "INSERT INTO tickets (",
        ticket_columns!(),
        ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)"
    ))
    .bind(ticket.id.as_uuid())
    .bind(ticket.event_id.as_uuid())
    .bind(ticket.buyer.member_id.as_uuid())
    .bind(&ticket.buyer.email)
    .bind(&ticket.buyer.full_name)
    .bind(count_to_db(ticket.quantity))
    .bind(money_to_db(ticket.unit_price)?)
    .bind(money_to_db(ticket.total_price)?)
    .bind(ticket.payment_method.as_str())
    .bind(ticket.payment_status.as_str())
    .bind(count_to_db(ticket.purchase_order))
    .bind(ticket.eligible_for_raffle)
    .bind(ticket.ticket_code.as_str())
    .bind(ticket.created_at)
    .bind(ticket.updated_at)
    .execute(executor)
    .await
    .map_err(|e| match violated_unique_constraint(&e).as_deref() {
        Some(TICKET_CODE_CONSTRAINT) => StoreError::Duplicate {
            entity: "ticket",
            field: "ticket_code",
        },
        Some(PURCHASE_ORDER_CONSTRAINT) => StoreError::conflict("event", ticket.event_id),
        _ => database_error(e),
    })?;
    Ok(())
}

impl CatalogStore for PostgresCatalogStore {
    // ═══════════════════════════════════════════════════════════
    // Events
    // ═══════════════════════════════════════════════════════════

    fn get_event(&self, id: EventId) -> StoreFuture<'_, Event> {
        Box::pin(async move {
            let row = sqlx::query(concat!("SELECT ", event_columns!(), " FROM events WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(database_error)?
                .ok_or_else(|| StoreError::not_found("event", id))?;
            event_from_row(&row)
        })
    }

    fn list_events(&self, query: EventQuery) -> StoreFuture<'_, Vec<Event>> {
        Box::pin(async move {
            let rows = match query.public {
                Some(listing) => {
                    sqlx::query(concat!(
                        "SELECT ",
                        event_columns!(),
                        r"
                        FROM events
                        WHERE published
                          AND CASE $1::text
                                WHEN 'upcoming' THEN status = 'active' AND date >= $2
                                WHEN 'past' THEN status = 'closed' OR date < $2
                                ELSE TRUE
                              END
                        ORDER BY date ASC
                        LIMIT $3
                        "
                    ))
                    .bind(listing.timeframe.as_str())
                    .bind(listing.now)
                    .bind(limit_to_db(query.limit))
                    .fetch_all(&self.pool)
                    .await
                },
                None => {
                    sqlx::query(concat!(
                        "SELECT ",
                        event_columns!(),
                        " FROM events ORDER BY created_at DESC LIMIT $1"
                    ))
                    .bind(limit_to_db(query.limit))
                    .fetch_all(&self.pool)
                    .await
                },
            }
            .map_err(database_error)?;
            decode_all(&rows, event_from_row)
        })
    }

    fn insert_event(&self, event: Event) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            sqlx::query(concat!(
                "INSERT INTO events (",
                event_columns!(),
                ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)"
            ))
            .bind(event.id.as_uuid())
            .bind(&event.title)
            .bind(&event.description)
            .bind(event.date)
            .bind(&event.location)
            .bind(&event.image_url)
            .bind(money_to_db(event.ticket_price)?)
            .bind(count_to_db(event.total_tickets))
            .bind(count_to_db(event.sold_tickets))
            .bind(count_to_db(event.raffle_limit))
            .bind(event.status.as_str())
            .bind(event.published)
            .bind(event.created_at)
            .bind(event.updated_at)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

            debug!(event_id = %event.id, capacity = event.total_tickets, "Event inserted");
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
            let row = sqlx::query(concat!(
                r"
                UPDATE events
                SET title = $2,
                    description = $3,
                    date = $4,
                    location = $5,
                    image_url = $6,
                    ticket_price_cents = $7,
                    raffle_limit = $8,
                    status = $9,
                    published = $10,
                    updated_at = $11
                WHERE id = $1
                RETURNING ",
                event_columns!()
            ))
            .bind(id.as_uuid())
            .bind(&details.title)
            .bind(&details.description)
            .bind(details.date)
            .bind(&details.location)
            .bind(&details.image_url)
            .bind(money_to_db(details.ticket_price)?)
            .bind(count_to_db(details.raffle_limit))
            .bind(details.status.as_str())
            .bind(details.published)
            .bind(updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?
            .ok_or_else(|| StoreError::not_found("event", id))?;
            event_from_row(&row)
        })
    }

    fn delete_event(&self, id: EventId) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM events WHERE id = $1")
                .bind(id.as_uuid())
                .execute(&self.pool)
                .await
                .map_err(database_error)?;
            if result.rows_affected() == 0 {
                return Err(StoreError::not_found("event", id));
            }
            Ok(())
        })
    }

    fn commit_purchase(&self, expected_sold: u32, ticket: Ticket) -> StoreFuture<'_, u32> {
        Box::pin(async move {
            let event_id = ticket.event_id;
            let mut tx = self.pool.begin().await.map_err(database_error)?;

            // The guard re-checks both the counter we computed from and the capacity, so
            // a writer on another instance makes this match zero rows instead of overselling.
            let new_sold: Option<i64> = sqlx::query_scalar(
                r"
                UPDATE events
                SET sold_tickets = sold_tickets + $2,
                    updated_at = $3
                WHERE id = $1
                  AND sold_tickets = $4
                  AND sold_tickets + $2 <= total_tickets
                RETURNING sold_tickets
                ",
            )
            .bind(event_id.as_uuid())
            .bind(count_to_db(ticket.quantity))
            .bind(ticket.created_at)
            .bind(count_to_db(expected_sold))
            .fetch_optional(&mut *tx)
            .await
            .map_err(database_error)?;

            let Some(new_sold) = new_sold else {
                let err = missing_or_conflict(
                    &mut *tx,
                    "SELECT EXISTS(SELECT 1 FROM events WHERE id = $1)",
                    "event",
                    *event_id.as_uuid(),
                )
                .await;
                tx.rollback().await.map_err(database_error)?;
                debug!(%event_id, expected_sold, error = %err, "Purchase commit rejected");
                return Err(err);
            };

            if let Err(err) = insert_ticket(&mut *tx, &ticket).await {
                tx.rollback().await.map_err(database_error)?;
                warn!(%event_id, ticket_code = %ticket.ticket_code, error = %err, "Ticket insert rejected");
                return Err(err);
            }

            tx.commit().await.map_err(database_error)?;
            debug!(
                %event_id,
                ticket_id = %ticket.id,
                purchase_order = ticket.purchase_order,
                new_sold,
                "Purchase committed"
            );
            count_from_db(new_sold, "sold_tickets")
        })
    }

    // ═══════════════════════════════════════════════════════════
    // Tickets
    // ═══════════════════════════════════════════════════════════

    fn get_ticket(&self, id: TicketId) -> StoreFuture<'_, Ticket> {
        Box::pin(async move {
            let row = sqlx::query(concat!("SELECT ", ticket_columns!(), " FROM tickets WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(database_error)?
                .ok_or_else(|| StoreError::not_found("ticket", id))?;
            ticket_from_row(&row)
        })
    }

    fn list_tickets(&self, query: TicketQuery) -> StoreFuture<'_, Vec<Ticket>> {
        Box::pin(async move {
            let rows = sqlx::query(concat!(
                "SELECT ",
                ticket_columns!(),
                r"
                FROM tickets
                WHERE ($1::uuid IS NULL OR event_id = $1)
                  AND ($2::text IS NULL OR buyer_email = $2)
                  AND ($3::text IS NULL OR payment_status = $3)
                  AND (NOT $4 OR eligible_for_raffle)
                  AND ($5::timestamptz IS NULL OR created_at >= $5)
                  AND ($6::text IS NULL
                       OR buyer_full_name ILIKE $6
                       OR buyer_email ILIKE $6
                       OR ticket_code ILIKE $6)
                ORDER BY created_at DESC, purchase_order DESC
                LIMIT $7
                "
            ))
            .bind(query.event_id.map(|id| *id.as_uuid()))
            .bind(query.buyer_email)
            .bind(query.payment_status.map(|status| status.as_str()))
            .bind(query.eligible_only)
            .bind(query.created_since)
            .bind(query.search.as_deref().map(like_pattern))
            .bind(limit_to_db(query.limit))
            .fetch_all(&self.pool)
            .await
            .map_err(database_error)?;
            decode_all(&rows, ticket_from_row)
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
            let row = sqlx::query(concat!(
                r"
                UPDATE tickets
                SET payment_status = $3,
                    updated_at = $4
                WHERE id = $1 AND payment_status = $2
                RETURNING ",
                ticket_columns!()
            ))
            .bind(id.as_uuid())
            .bind(from.as_str())
            .bind(to.as_str())
            .bind(updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

            match row {
                Some(row) => ticket_from_row(&row),
                None => Err(missing_or_conflict(
                    &self.pool,
                    "SELECT EXISTS(SELECT 1 FROM tickets WHERE id = $1)",
                    "ticket",
                    *id.as_uuid(),
                )
                .await),
            }
        })
    }

    // ═══════════════════════════════════════════════════════════
    // Raffles
    // ═══════════════════════════════════════════════════════════

    fn get_raffle(&self, id: RaffleId) -> StoreFuture<'_, Raffle> {
        Box::pin(async move {
            let row = sqlx::query(concat!("SELECT ", raffle_columns!(), " FROM raffles WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(database_error)?
                .ok_or_else(|| StoreError::not_found("raffle", id))?;
            raffle_from_row(&row)
        })
    }

    fn list_raffles(&self, limit: Option<usize>) -> StoreFuture<'_, Vec<Raffle>> {
        Box::pin(async move {
            let rows = sqlx::query(concat!(
                "SELECT ",
                raffle_columns!(),
                " FROM raffles ORDER BY draw_date DESC NULLS LAST, created_at DESC LIMIT $1"
            ))
            .bind(limit_to_db(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(database_error)?;
            decode_all(&rows, raffle_from_row)
        })
    }

    fn insert_raffle(&self, raffle: Raffle) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let winner = raffle.winner.as_ref();
            sqlx::query(concat!(
                "INSERT INTO raffles (",
                raffle_columns!(),
                ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"
            ))
            .bind(raffle.id.as_uuid())
            .bind(raffle.event_id.as_uuid())
            .bind(&raffle.prize)
            .bind(&raffle.prize_image_url)
            .bind(raffle.status.as_str())
            .bind(winner.map(|w| *w.ticket_id.as_uuid()))
            .bind(winner.map(|w| *w.buyer.member_id.as_uuid()))
            .bind(winner.map(|w| w.buyer.email.clone()))
            .bind(winner.map(|w| w.buyer.full_name.clone()))
            .bind(raffle.draw_date)
            .bind(raffle.created_at)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

            debug!(raffle_id = %raffle.id, event_id = %raffle.event_id, "Raffle inserted");
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
            let row = sqlx::query(concat!(
                r"
                UPDATE raffles
                SET prize = $2,
                    prize_image_url = $3
                WHERE id = $1 AND status = 'pending'
                RETURNING ",
                raffle_columns!()
            ))
            .bind(id.as_uuid())
            .bind(prize)
            .bind(prize_image_url)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

            match row {
                Some(row) => raffle_from_row(&row),
                None => Err(missing_or_conflict(
                    &self.pool,
                    "SELECT EXISTS(SELECT 1 FROM raffles WHERE id = $1)",
                    "raffle",
                    *id.as_uuid(),
                )
                .await),
            }
        })
    }

    fn complete_raffle(
        &self,
        id: RaffleId,
        winner: RaffleWinner,
        draw_date: DateTime<Utc>,
    ) -> StoreFuture<'_, Raffle> {
        Box::pin(async move {
            let row = sqlx::query(concat!(
                r"
                UPDATE raffles
                SET status = $2,
                    winner_ticket_id = $3,
                    winner_member_id = $4,
                    winner_email = $5,
                    winner_full_name = $6,
                    draw_date = $7
                WHERE id = $1 AND status = 'pending'
                RETURNING ",
                raffle_columns!()
            ))
            .bind(id.as_uuid())
            .bind(RaffleStatus::Completed.as_str())
            .bind(winner.ticket_id.as_uuid())
            .bind(winner.buyer.member_id.as_uuid())
            .bind(&winner.buyer.email)
            .bind(&winner.buyer.full_name)
            .bind(draw_date)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

            match row {
                Some(row) => raffle_from_row(&row),
                None => Err(missing_or_conflict(
                    &self.pool,
                    "SELECT EXISTS(SELECT 1 FROM raffles WHERE id = $1)",
                    "raffle",
                    *id.as_uuid(),
                )
                .await),
            }
        })
    }

    fn delete_raffle(&self, id: RaffleId) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM raffles WHERE id = $1")
                .bind(id.as_uuid())
                .execute(&self.pool)
                .await
                .map_err(database_error)?;
            if result.rows_affected() == 0 {
                return Err(StoreError::not_found("raffle", id));
            }
            Ok(())
        })
    }

    // ═══════════════════════════════════════════════════════════
    // News
    // ═══════════════════════════════════════════════════════════

    fn insert_news(&self, news: News) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            sqlx::query(concat!(
                "INSERT INTO news (",
                news_columns!(),
                ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"
            ))
            .bind(news.id.as_uuid())
            .bind(&news.title)
            .bind(&news.summary)
            .bind(&news.content)
            .bind(&news.image_url)
            .bind(news.category.as_str())
            .bind(news.featured)
            .bind(news.published)
            .bind(news.created_at)
            .bind(news.updated_at)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;
            Ok(())
        })
    }

    fn get_news(&self, id: NewsId) -> StoreFuture<'_, News> {
        Box::pin(async move {
            let row = sqlx::query(concat!("SELECT ", news_columns!(), " FROM news WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(database_error)?
                .ok_or_else(|| StoreError::not_found("news", id))?;
            news_from_row(&row)
        })
    }

    fn list_news(&self, query: NewsQuery) -> StoreFuture<'_, Vec<News>> {
        Box::pin(async move {
            let rows = sqlx::query(concat!(
                "SELECT ",
                news_columns!(),
                r"
                FROM news
                WHERE (NOT $1 OR published)
                  AND ($2::text IS NULL OR category = $2)
                  AND ($3::text IS NULL OR title ILIKE $3 OR summary ILIKE $3)
                ORDER BY created_at DESC
                LIMIT $4
                "
            ))
            .bind(query.published_only)
            .bind(query.category.map(|category| category.as_str()))
            .bind(query.search.as_deref().map(like_pattern))
            .bind(limit_to_db(query.limit))
            .fetch_all(&self.pool)
            .await
            .map_err(database_error)?;
            decode_all(&rows, news_from_row)
        })
    }

    fn update_news(&self, news: News) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let result = sqlx::query(
                r"
                UPDATE news
                SET title = $2,
                    summary = $3,
                    content = $4,
                    image_url = $5,
                    category = $6,
                    featured = $7,
                    published = $8,
                    updated_at = $9
                WHERE id = $1
                ",
            )
            .bind(news.id.as_uuid())
            .bind(&news.title)
            .bind(&news.summary)
            .bind(&news.content)
            .bind(&news.image_url)
            .bind(news.category.as_str())
            .bind(news.featured)
            .bind(news.published)
            .bind(news.updated_at)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;
            if result.rows_affected() == 0 {
                return Err(StoreError::not_found("news", news.id));
            }
            Ok(())
        })
    }

    fn delete_news(&self, id: NewsId) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM news WHERE id = $1")
                .bind(id.as_uuid())
                .execute(&self.pool)
                .await
                .map_err(database_error)?;
            if result.rows_affected() == 0 {
                return Err(StoreError::not_found("news", id));
            }
            Ok(())
        })
    }

    // ═══════════════════════════════════════════════════════════
    // Photos
    // ═══════════════════════════════════════════════════════════

    fn insert_photos(&self, photos: Vec<Photo>) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let mut tx = self.pool.begin().await.map_err(database_error)?;
            for photo in &photos {
                sqlx::query(concat!(
                    "INSERT INTO photos (",
                    photo_columns!(),
                    ") VALUES ($1, $2, $3, $4, $5, $6)"
                ))
                .bind(photo.id.as_uuid())
                .bind(&photo.title)
                .bind(&photo.image_url)
                .bind(&photo.album)
                .bind(photo.published)
                .bind(photo.created_at)
                .execute(&mut *tx)
                .await
                .map_err(database_error)?;
            }
            tx.commit().await.map_err(database_error)?;

            debug!(count = photos.len(), "Photos inserted");
            Ok(())
        })
    }

    fn get_photo(&self, id: PhotoId) -> StoreFuture<'_, Photo> {
        Box::pin(async move {
            let row = sqlx::query(concat!("SELECT ", photo_columns!(), " FROM photos WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(database_error)?
                .ok_or_else(|| StoreError::not_found("photo", id))?;
            photo_from_row(&row)
        })
    }

    fn list_photos(&self, query: PhotoQuery) -> StoreFuture<'_, Vec<Photo>> {
        Box::pin(async move {
            let rows = sqlx::query(concat!(
                "SELECT ",
                photo_columns!(),
                r"
                FROM photos
                WHERE (NOT $1 OR published)
                  AND ($2::text IS NULL OR album = $2)
                ORDER BY created_at DESC
                LIMIT $3
                "
            ))
            .bind(query.published_only)
            .bind(query.album)
            .bind(limit_to_db(query.limit))
            .fetch_all(&self.pool)
            .await
            .map_err(database_error)?;
            decode_all(&rows, photo_from_row)
        })
    }

    fn update_photo(&self, photo: Photo) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let result = sqlx::query(
                r"
                UPDATE photos
                SET title = $2,
                    image_url = $3,
                    album = $4,
                    published = $5
                WHERE id = $1
                ",
            )
            .bind(photo.id.as_uuid())
            .bind(&photo.title)
            .bind(&photo.image_url)
            .bind(&photo.album)
            .bind(photo.published)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;
            if result.rows_affected() == 0 {
                return Err(StoreError::not_found("photo", photo.id));
            }
            Ok(())
        })
    }

    fn delete_photo(&self, id: PhotoId) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM photos WHERE id = $1")
                .bind(id.as_uuid())
                .execute(&self.pool)
                .await
                .map_err(database_error)?;
            if result.rows_affected() == 0 {
                return Err(StoreError::not_found("photo", id));
            }
            Ok(())
        })
    }
}
