//! Column lists, row decoding, and conversions between domain and column types.
//!
//! Counters and positions are `u32` in the domain and `BIGINT` in the schema; money is
//! `u64` cents in the domain and `BIGINT` cents in the schema. Values that do not fit
//! surface as [`StoreError::Serialization`] rather than being truncated.

use chrono::{DateTime, Utc};
use fanclub_core::{
    Buyer, Event, EventId, EventStatus, MemberId, Money, News, NewsCategory, NewsId,
    PaymentMethod, PaymentStatus, Photo, PhotoId, Raffle, RaffleId, RaffleStatus, RaffleWinner,
    StoreError, Ticket, TicketCode, TicketId,
};
use sqlx::postgres::{PgRow, Postgres};
use sqlx::{Decode, Row, Type};
use uuid::Uuid;

macro_rules! event_columns {
    () => {
        "id, title, description, date, location, image_url, ticket_price_cents, \
         total_tickets, sold_tickets, raffle_limit, status, published, created_at, updated_at"
    };
}

macro_rules! ticket_columns {
    () => {
        "id, event_id, buyer_member_id, buyer_email, buyer_full_name, quantity, \
         unit_price_cents, total_price_cents, payment_method, payment_status, purchase_order, \
         eligible_for_raffle, ticket_code, created_at, updated_at"
    };
}

macro_rules! raffle_columns {
    () => {
        "id, event_id, prize, prize_image_url, status, winner_ticket_id, winner_member_id, \
         winner_email, winner_full_name, draw_date, created_at"
    };
}

macro_rules! news_columns {
    () => {
        "id, title, summary, content, image_url, category, featured, published, created_at, \
         updated_at"
    };
}

macro_rules! photo_columns {
    () => {
        "id, title, image_url, album, published, created_at"
    };
}

pub(crate) use {event_columns, news_columns, photo_columns, raffle_columns, ticket_columns};

// ═══════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════

/// Map a driver error onto the storage error taxonomy.
#[allow(clippy::needless_pass_by_value)] // Used as `map_err(database_error)`
pub(crate) fn database_error(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

/// Name of the unique constraint a write violated, if that is why it failed.
pub(crate) fn violated_unique_constraint(e: &sqlx::Error) -> Option<String> {
    match e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            Some(db_err.constraint().unwrap_or_default().to_string())
        },
        _ => None,
    }
}

fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, StoreError>
where
    T: Decode<'r, Postgres> + Type<Postgres>,
{
    row.try_get(name)
        .map_err(|e| StoreError::Serialization(format!("column {name}: {e}")))
}

fn invalid(column: &str, value: impl std::fmt::Display) -> StoreError {
    StoreError::Serialization(format!("invalid {column}: {value}"))
}

// ═══════════════════════════════════════════════════════════════════════
// Conversions
// ═══════════════════════════════════════════════════════════════════════

pub(crate) fn count_to_db(value: u32) -> i64 {
    i64::from(value)
}

pub(crate) fn count_from_db(value: i64, column: &str) -> Result<u32, StoreError> {
    u32::try_from(value).map_err(|_| invalid(column, value))
}

pub(crate) fn money_to_db(money: Money) -> Result<i64, StoreError> {
    i64::try_from(money.cents()).map_err(|_| invalid("amount", money.cents()))
}

fn money_from_db(cents: i64, column: &str) -> Result<Money, StoreError> {
    u64::try_from(cents)
        .map(Money::from_cents)
        .map_err(|_| invalid(column, cents))
}

/// `LIMIT NULL` means no limit in `PostgreSQL`.
pub(crate) fn limit_to_db(limit: Option<usize>) -> Option<i64> {
    limit.map(|limit| i64::try_from(limit).unwrap_or(i64::MAX))
}

/// `ILIKE` pattern matching `term` anywhere, with backslash, `%` and `_` taken literally.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn parsed<T>(row: &PgRow, name: &str, parse: fn(&str) -> Option<T>) -> Result<T, StoreError> {
    let raw: String = column(row, name)?;
    parse(&raw).ok_or_else(|| invalid(name, raw))
}

fn count(row: &PgRow, name: &str) -> Result<u32, StoreError> {
    count_from_db(column(row, name)?, name)
}

fn money(row: &PgRow, name: &str) -> Result<Money, StoreError> {
    money_from_db(column(row, name)?, name)
}

// ═══════════════════════════════════════════════════════════════════════
// Records
// ═══════════════════════════════════════════════════════════════════════

pub(crate) fn event_from_row(row: &PgRow) -> Result<Event, StoreError> {
    Ok(Event {
        id: EventId::from_uuid(column(row, "id")?),
        title: column(row, "title")?,
        description: column(row, "description")?,
        date: column(row, "date")?,
        location: column(row, "location")?,
        image_url: column(row, "image_url")?,
        ticket_price: money(row, "ticket_price_cents")?,
        total_tickets: count(row, "total_tickets")?,
        sold_tickets: count(row, "sold_tickets")?,
        raffle_limit: count(row, "raffle_limit")?,
        status: parsed(row, "status", EventStatus::parse)?,
        published: column(row, "published")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

pub(crate) fn ticket_from_row(row: &PgRow) -> Result<Ticket, StoreError> {
    Ok(Ticket {
        id: TicketId::from_uuid(column(row, "id")?),
        event_id: EventId::from_uuid(column(row, "event_id")?),
        buyer: Buyer {
            member_id: MemberId::from_uuid(column(row, "buyer_member_id")?),
            email: column(row, "buyer_email")?,
            full_name: column(row, "buyer_full_name")?,
        },
        quantity: count(row, "quantity")?,
        unit_price: money(row, "unit_price_cents")?,
        total_price: money(row, "total_price_cents")?,
        payment_method: parsed(row, "payment_method", PaymentMethod::parse)?,
        payment_status: parsed(row, "payment_status", PaymentStatus::parse)?,
        purchase_order: count(row, "purchase_order")?,
        eligible_for_raffle: column(row, "eligible_for_raffle")?,
        ticket_code: TicketCode::new(column::<String>(row, "ticket_code")?),
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

pub(crate) fn raffle_from_row(row: &PgRow) -> Result<Raffle, StoreError> {
    let winner_ticket: Option<Uuid> = column(row, "winner_ticket_id")?;
    let winner = match winner_ticket {
        Some(ticket_id) => {
            let member_id: Option<Uuid> = column(row, "winner_member_id")?;
            let email: Option<String> = column(row, "winner_email")?;
            let full_name: Option<String> = column(row, "winner_full_name")?;
            let (Some(member_id), Some(email), Some(full_name)) = (member_id, email, full_name)
            else {
                return Err(invalid("winner", ticket_id));
            };
            Some(RaffleWinner {
                ticket_id: TicketId::from_uuid(ticket_id),
                buyer: Buyer {
                    member_id: MemberId::from_uuid(member_id),
                    email,
                    full_name,
                },
            })
        },
        None => None,
    };

    Ok(Raffle {
        id: RaffleId::from_uuid(column(row, "id")?),
        event_id: EventId::from_uuid(column(row, "event_id")?),
        prize: column(row, "prize")?,
        prize_image_url: column(row, "prize_image_url")?,
        status: parsed(row, "status", RaffleStatus::parse)?,
        winner,
        draw_date: column::<Option<DateTime<Utc>>>(row, "draw_date")?,
        created_at: column(row, "created_at")?,
    })
}

pub(crate) fn news_from_row(row: &PgRow) -> Result<News, StoreError> {
    Ok(News {
        id: NewsId::from_uuid(column(row, "id")?),
        title: column(row, "title")?,
        summary: column(row, "summary")?,
        content: column(row, "content")?,
        image_url: column(row, "image_url")?,
        category: parsed(row, "category", NewsCategory::parse)?,
        featured: column(row, "featured")?,
        published: column(row, "published")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

pub(crate) fn photo_from_row(row: &PgRow) -> Result<Photo, StoreError> {
    Ok(Photo {
        id: PhotoId::from_uuid(column(row, "id")?),
        title: column(row, "title")?,
        image_url: column(row, "image_url")?,
        album: column(row, "album")?,
        published: column(row, "published")?,
        created_at: column(row, "created_at")?,
    })
}

/// Decode every row with `decode`, failing on the first bad row.
pub(crate) fn decode_all<T>(
    rows: &[PgRow],
    decode: fn(&PgRow) -> Result<T, StoreError>,
) -> Result<Vec<T>, StoreError> {
    rows.iter().map(decode).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ana"), "%ana%");
        assert_eq!(like_pattern("50%_off"), r"%50\%\_off%");
        assert_eq!(like_pattern(r"a\b"), r"%a\\b%");
    }

    #[test]
    fn counts_outside_u32_are_rejected() {
        assert_eq!(count_from_db(42, "quantity"), Ok(42));
        assert!(matches!(
            count_from_db(-1, "quantity"),
            Err(StoreError::Serialization(_))
        ));
        assert!(count_from_db(i64::from(u32::MAX) + 1, "quantity").is_err());
    }

    #[test]
    fn money_beyond_bigint_is_rejected() {
        assert_eq!(money_to_db(Money::from_cents(5_000)), Ok(5_000));
        assert!(money_to_db(Money::from_cents(u64::MAX)).is_err());
        assert!(money_from_db(-5, "unit_price_cents").is_err());
    }

    #[test]
    fn missing_limit_means_unbounded() {
        assert_eq!(limit_to_db(None), None);
        assert_eq!(limit_to_db(Some(50)), Some(50));
    }

    #[test]
    fn column_lists_name_every_field() {
        assert_eq!(event_columns!().split(", ").count(), 14);
        assert_eq!(ticket_columns!().split(", ").count(), 15);
        assert_eq!(raffle_columns!().split(", ").count(), 11);
        assert_eq!(news_columns!().split(", ").count(), 10);
        assert_eq!(photo_columns!().split(", ").count(), 6);
    }
}
