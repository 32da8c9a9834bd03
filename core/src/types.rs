//! Domain types for the fan club backend.
//!
//! Identifiers, money, and the catalog records (events, tickets, raffles, news, photos).
//! Records are plain owned data; every mutation goes through the ledger or the catalog
//! service, which enforce the invariants documented on each type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            #[doc = concat!("Creates a new random `", stringify!($name), "`")]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[doc = concat!("Create a `", stringify!($name), "` from a `Uuid`")]
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get the inner UUID
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Unique identifier for an event
    EventId
);
define_id!(
    /// Unique identifier for a ticket
    TicketId
);
define_id!(
    /// Unique identifier for a raffle
    RaffleId
);
define_id!(
    /// Unique identifier for a news article
    NewsId
);
define_id!(
    /// Unique identifier for a gallery photo
    PhotoId
);
define_id!(
    /// Unique identifier for a fan club member
    MemberId
);

// ============================================================================
// Money Value Object (cents-based to avoid floating point errors)
// ============================================================================

/// Represents money in cents to avoid floating-point arithmetic errors
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(u64);

impl Money {
    /// Zero amount
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` value from cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Creates a `Money` value from whole currency units, `None` on overflow
    #[must_use]
    pub const fn checked_from_units(units: u64) -> Option<Self> {
        match units.checked_mul(100) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    /// Returns the amount in cents
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Checks if the amount is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds two money amounts with overflow checking
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }

    /// Adds two money amounts, clamping at the maximum representable value
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Multiplies money by a quantity with overflow checking
    #[must_use]
    pub const fn checked_multiply(self, quantity: u32) -> Option<Self> {
        match self.0.checked_mul(quantity as u64) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R$ {}.{:02}", self.0 / 100, self.0 % 100)
    }
}

// ============================================================================
// Events
// ============================================================================

/// Raffle limit applied when an event is created without one ("first 100 buyers").
pub const DEFAULT_RAFFLE_LIMIT: u32 = 100;

/// Event lifecycle status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Sales are open
    Active,
    /// Event has been closed (sales over or event held)
    Closed,
    /// Event was cancelled
    Cancelled,
}

impl EventStatus {
    /// Database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Closed => "closed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse from the database string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "closed" => Some(Self::Closed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an event cannot take purchases right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotPurchasableReason {
    /// The event status is `closed`
    Closed,
    /// The event status is `cancelled`
    Cancelled,
    /// The scheduled date has passed
    AlreadyHappened,
}

impl fmt::Display for NotPurchasableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => f.write_str("event is closed"),
            Self::Cancelled => f.write_str("event was cancelled"),
            Self::AlreadyHappened => f.write_str("event date has passed"),
        }
    }
}

/// The administrator-editable part of an event.
///
/// Capacity and the sold counter are deliberately absent: capacity is fixed at creation
/// and the counter is owned by the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    /// Event title
    pub title: String,
    /// Long description
    pub description: String,
    /// Scheduled date and time
    pub date: DateTime<Utc>,
    /// Venue / meeting point
    pub location: String,
    /// Cover image URL (from the media store)
    pub image_url: Option<String>,
    /// Price of one seat
    pub ticket_price: Money,
    /// Number of earliest purchases eligible for the raffle
    pub raffle_limit: u32,
    /// Lifecycle status
    pub status: EventStatus,
    /// Whether the event is listed publicly
    pub published: bool,
}

/// A fan club event with a fixed seat capacity.
///
/// Invariant: `sold_tickets <= total_tickets`, and `sold_tickets` never decreases.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event ID
    pub id: EventId,
    /// Event title
    pub title: String,
    /// Long description
    pub description: String,
    /// Scheduled date and time
    pub date: DateTime<Utc>,
    /// Venue / meeting point
    pub location: String,
    /// Cover image URL
    pub image_url: Option<String>,
    /// Price of one seat
    pub ticket_price: Money,
    /// Capacity, fixed at creation
    pub total_tickets: u32,
    /// Seats sold so far
    pub sold_tickets: u32,
    /// Number of earliest purchases eligible for the raffle
    pub raffle_limit: u32,
    /// Lifecycle status
    pub status: EventStatus,
    /// Whether the event is listed publicly
    pub published: bool,
    /// When created
    pub created_at: DateTime<Utc>,
    /// When last updated
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Creates a new event with nothing sold.
    #[must_use]
    pub fn new(id: EventId, details: EventDetails, total_tickets: u32, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: details.title,
            description: details.description,
            date: details.date,
            location: details.location,
            image_url: details.image_url,
            ticket_price: details.ticket_price,
            total_tickets,
            sold_tickets: 0,
            raffle_limit: details.raffle_limit,
            status: details.status,
            published: details.published,
            created_at: now,
            updated_at: now,
        }
    }

    /// The editable part of this event.
    #[must_use]
    pub fn details(&self) -> EventDetails {
        EventDetails {
            title: self.title.clone(),
            description: self.description.clone(),
            date: self.date,
            location: self.location.clone(),
            image_url: self.image_url.clone(),
            ticket_price: self.ticket_price,
            raffle_limit: self.raffle_limit,
            status: self.status,
            published: self.published,
        }
    }

    /// Replace the editable part, leaving capacity and the sold counter untouched.
    pub fn apply_details(&mut self, details: EventDetails, now: DateTime<Utc>) {
        self.title = details.title;
        self.description = details.description;
        self.date = details.date;
        self.location = details.location;
        self.image_url = details.image_url;
        self.ticket_price = details.ticket_price;
        self.raffle_limit = details.raffle_limit;
        self.status = details.status;
        self.published = details.published;
        self.updated_at = now;
    }

    /// Seats still available.
    #[must_use]
    pub const fn available_tickets(&self) -> u32 {
        self.total_tickets.saturating_sub(self.sold_tickets)
    }

    /// Raffle-eligible positions not yet taken.
    #[must_use]
    pub const fn raffle_spots_left(&self) -> u32 {
        self.raffle_limit.saturating_sub(self.sold_tickets)
    }

    /// Whether the scheduled date is in the past.
    #[must_use]
    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.date <= now
    }

    /// Check that the event accepts purchases at `now`.
    ///
    /// # Errors
    ///
    /// Returns the reason the event is not purchasable.
    pub fn check_purchasable(&self, now: DateTime<Utc>) -> Result<(), NotPurchasableReason> {
        match self.status {
            EventStatus::Closed => Err(NotPurchasableReason::Closed),
            EventStatus::Cancelled => Err(NotPurchasableReason::Cancelled),
            EventStatus::Active if self.is_past(now) => Err(NotPurchasableReason::AlreadyHappened),
            EventStatus::Active => Ok(()),
        }
    }
}

// ============================================================================
// Tickets
// ============================================================================

/// How a ticket was paid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Instant bank transfer
    InstantTransfer,
    /// Credit or debit card
    Card,
}

impl PaymentMethod {
    /// Database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InstantTransfer => "instant_transfer",
            Self::Card => "card",
        }
    }

    /// Parse from the database string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "instant_transfer" => Some(Self::InstantTransfer),
            "card" => Some(Self::Card),
            _ => None,
        }
    }
}

/// Payment state of a ticket
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Payment confirmed
    Paid,
    /// Awaiting confirmation
    Pending,
    /// Cancelled by an administrator
    Cancelled,
}

impl PaymentStatus {
    /// Database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Pending => "pending",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse from the database string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "paid" => Some(Self::Paid),
            "pending" => Some(Self::Pending),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Allowed administrative transitions. `Cancelled` is terminal.
    #[must_use]
    pub const fn can_transition_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::Paid) | (Self::Pending | Self::Paid, Self::Cancelled)
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-presentable ticket code, unique for the lifetime of the system.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketCode(String);

impl TicketCode {
    /// Wrap an already generated code.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// The code as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The identity stamped on a ticket at purchase time.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Buyer {
    /// Member ID
    pub member_id: MemberId,
    /// Email at purchase time
    pub email: String,
    /// Display name at purchase time
    pub full_name: String,
}

/// A purchase of one or more seats for an event.
///
/// Immutable after creation except for `payment_status`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Ticket ID
    pub id: TicketId,
    /// Owning event (weak reference)
    pub event_id: EventId,
    /// Who bought it
    pub buyer: Buyer,
    /// Seats in this purchase
    pub quantity: u32,
    /// Price of one seat at purchase time
    pub unit_price: Money,
    /// `unit_price * quantity`
    pub total_price: Money,
    /// How it was paid
    pub payment_method: PaymentMethod,
    /// Payment state
    pub payment_status: PaymentStatus,
    /// 1-indexed position of the first seat in the event's sale sequence
    pub purchase_order: u32,
    /// Whether the ticket takes part in the event's raffle
    pub eligible_for_raffle: bool,
    /// Unique presentable code
    pub ticket_code: TicketCode,
    /// When purchased
    pub created_at: DateTime<Utc>,
    /// When last updated
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Sale-sequence positions covered by this ticket: `[purchase_order, purchase_order + quantity)`.
    #[must_use]
    pub const fn seat_range(&self) -> Range<u32> {
        self.purchase_order..self.purchase_order.saturating_add(self.quantity)
    }

    /// Whether this ticket counts in a raffle draw.
    #[must_use]
    pub fn qualifies_for_draw(&self) -> bool {
        self.eligible_for_raffle && self.payment_status == PaymentStatus::Paid
    }
}

// ============================================================================
// Raffles
// ============================================================================

/// Raffle lifecycle status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaffleStatus {
    /// Not drawn yet
    Pending,
    /// Winner drawn; winner and draw date are frozen
    Completed,
}

impl RaffleStatus {
    /// Database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    /// Parse from the database string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// The ticket (and its buyer) picked by a draw.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaffleWinner {
    /// Winning ticket
    pub ticket_id: TicketId,
    /// Buyer of the winning ticket
    pub buyer: Buyer,
}

/// A prize draw among the first buyers of an event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Raffle {
    /// Raffle ID
    pub id: RaffleId,
    /// Event whose tickets take part
    pub event_id: EventId,
    /// Prize description
    pub prize: String,
    /// Prize image URL
    pub prize_image_url: Option<String>,
    /// Lifecycle status
    pub status: RaffleStatus,
    /// Set only on completion
    pub winner: Option<RaffleWinner>,
    /// Set only on completion
    pub draw_date: Option<DateTime<Utc>>,
    /// When created
    pub created_at: DateTime<Utc>,
}

impl Raffle {
    /// Creates a pending raffle.
    #[must_use]
    pub const fn new(
        id: RaffleId,
        event_id: EventId,
        prize: String,
        prize_image_url: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            event_id,
            prize,
            prize_image_url,
            status: RaffleStatus::Pending,
            winner: None,
            draw_date: None,
            created_at: now,
        }
    }

    /// Whether the draw has happened.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == RaffleStatus::Completed
    }
}

// ============================================================================
// News & Gallery
// ============================================================================

/// News article category
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsCategory {
    /// Match reports
    Match,
    /// Player signings
    Signing,
    /// Behind the scenes
    BehindTheScenes,
    /// Fan club news
    FanClub,
    /// Anything else
    #[default]
    General,
}

impl NewsCategory {
    /// Database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Match => "match",
            Self::Signing => "signing",
            Self::BehindTheScenes => "behind_the_scenes",
            Self::FanClub => "fan_club",
            Self::General => "general",
        }
    }

    /// Parse from the database string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "match" => Some(Self::Match),
            "signing" => Some(Self::Signing),
            "behind_the_scenes" => Some(Self::BehindTheScenes),
            "fan_club" => Some(Self::FanClub),
            "general" => Some(Self::General),
            _ => None,
        }
    }
}

/// A news article
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct News {
    /// Article ID
    pub id: NewsId,
    /// Headline
    pub title: String,
    /// Short summary
    pub summary: String,
    /// Body
    pub content: String,
    /// Header image URL
    pub image_url: Option<String>,
    /// Category
    pub category: NewsCategory,
    /// Shown prominently on the home page
    pub featured: bool,
    /// Publicly visible
    pub published: bool,
    /// When created
    pub created_at: DateTime<Utc>,
    /// When last updated
    pub updated_at: DateTime<Utc>,
}

/// A gallery photo
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    /// Photo ID
    pub id: PhotoId,
    /// Caption
    pub title: String,
    /// Image URL (from the media store)
    pub image_url: String,
    /// Album name
    pub album: Option<String>,
    /// Publicly visible
    pub published: bool,
    /// When created
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 15, hour, 0, 0).single().unwrap_or_default()
    }

    fn details() -> EventDetails {
        EventDetails {
            title: "Watch party".to_string(),
            description: String::new(),
            date: at(16),
            location: "Bar do Zé".to_string(),
            image_url: None,
            ticket_price: Money::from_cents(5_000),
            raffle_limit: 100,
            status: EventStatus::Active,
            published: true,
        }
    }

    #[test]
    fn money_display_uses_two_decimals() {
        assert_eq!(Money::from_cents(35_005).to_string(), "R$ 350.05");
        assert_eq!(Money::ZERO.to_string(), "R$ 0.00");
    }

    #[test]
    fn money_multiply_detects_overflow() {
        assert_eq!(
            Money::from_cents(5_000).checked_multiply(3),
            Some(Money::from_cents(15_000))
        );
        assert_eq!(Money::from_cents(u64::MAX).checked_multiply(2), None);
    }

    #[test]
    fn purchasable_only_when_active_and_upcoming() {
        let mut event = Event::new(EventId::new(), details(), 100, at(8));
        assert_eq!(event.check_purchasable(at(10)), Ok(()));
        assert_eq!(
            event.check_purchasable(at(16)),
            Err(NotPurchasableReason::AlreadyHappened)
        );

        event.status = EventStatus::Closed;
        assert_eq!(event.check_purchasable(at(10)), Err(NotPurchasableReason::Closed));

        event.status = EventStatus::Cancelled;
        assert_eq!(event.check_purchasable(at(10)), Err(NotPurchasableReason::Cancelled));
    }

    #[test]
    fn apply_details_keeps_capacity_and_counter() {
        let mut event = Event::new(EventId::new(), details(), 50, at(8));
        event.sold_tickets = 12;

        let mut changed = details();
        changed.title = "Caravan".to_string();
        changed.raffle_limit = 10;
        event.apply_details(changed, at(9));

        assert_eq!(event.title, "Caravan");
        assert_eq!(event.total_tickets, 50);
        assert_eq!(event.sold_tickets, 12);
        assert_eq!(event.raffle_limit, 10);
        assert_eq!(event.updated_at, at(9));
    }

    #[test]
    fn payment_status_transitions() {
        use PaymentStatus::{Cancelled, Paid, Pending};

        assert!(Pending.can_transition_to(Paid));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Paid.can_transition_to(Cancelled));
        assert!(!Paid.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Paid));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Paid.can_transition_to(Paid));
    }

    #[test]
    fn status_strings_round_trip_through_parse() {
        for status in [EventStatus::Active, EventStatus::Closed, EventStatus::Cancelled] {
            assert_eq!(EventStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(PaymentMethod::parse("pix"), None);
        assert_eq!(NewsCategory::parse("fan_club"), Some(NewsCategory::FanClub));
    }
}
