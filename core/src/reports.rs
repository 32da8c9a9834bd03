//! Sales reports over paid tickets.
//!
//! Reports are computed in memory from a ticket listing and the event catalog. Only
//! `paid` tickets created within the requested period count.

use crate::error::{LedgerError, Result};
use crate::types::{Event, EventId, Money, PaymentMethod, PaymentStatus, Ticket};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Longest per-day breakdown, in days.
pub const MAX_DAILY_BREAKDOWN: u32 = 30;

/// Period used when a report request does not name one.
pub const DEFAULT_PERIOD_DAYS: u32 = 30;

/// Longest period a report may cover, in days.
pub const MAX_PERIOD_DAYS: u32 = 3_650;

/// What to report on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportQuery {
    /// Look-back window in days, ending now
    #[serde(default = "default_period_days")]
    pub period_days: u32,
    /// Restrict to one event
    #[serde(default)]
    pub event_id: Option<EventId>,
}

const fn default_period_days() -> u32 {
    DEFAULT_PERIOD_DAYS
}

impl Default for ReportQuery {
    fn default() -> Self {
        Self {
            period_days: DEFAULT_PERIOD_DAYS,
            event_id: None,
        }
    }
}

impl ReportQuery {
    /// Check that the period is between one day and [`MAX_PERIOD_DAYS`].
    ///
    /// # Errors
    ///
    /// [`LedgerError::Validation`] otherwise.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_PERIOD_DAYS).contains(&self.period_days) {
            return Err(LedgerError::Validation(format!(
                "period_days must be between 1 and {MAX_PERIOD_DAYS}"
            )));
        }
        Ok(())
    }

    /// Start of the reporting window, saturating at the earliest representable instant.
    #[must_use]
    pub fn period_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        Duration::try_days(i64::from(self.period_days))
            .and_then(|period| now.checked_sub_signed(period))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Sales on one calendar day (UTC).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySales {
    /// Day
    pub date: NaiveDate,
    /// Seats sold
    pub seats: u64,
    /// Revenue
    pub revenue: Money,
}

/// Sales of one event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSales {
    /// Event ID
    pub event_id: EventId,
    /// Event title
    pub title: String,
    /// Seats sold in the period
    pub seats: u64,
    /// Revenue in the period
    pub revenue: Money,
    /// Event capacity
    pub capacity: u32,
}

/// Sales by payment method.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethodSales {
    /// Payment method
    pub method: PaymentMethod,
    /// Number of purchases
    pub transactions: u64,
    /// Revenue
    pub revenue: Money,
}

/// Aggregated sales figures for a period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesReport {
    /// Start of the window
    pub period_start: DateTime<Utc>,
    /// End of the window
    pub period_end: DateTime<Utc>,
    /// Total revenue
    pub total_revenue: Money,
    /// Seats sold (sum of quantities)
    pub seats_sold: u64,
    /// Number of purchases
    pub transactions: u64,
    /// Revenue per purchase, rounded down to the cent
    pub average_transaction: Money,
    /// One entry per day for the last `min(period_days, 30)` days, oldest first
    pub daily: Vec<DailySales>,
    /// Events with sales in the period, highest revenue first
    pub by_event: Vec<EventSales>,
    /// One entry per payment method
    pub by_payment_method: Vec<PaymentMethodSales>,
}

impl SalesReport {
    /// Compile a report.
    ///
    /// `tickets` may contain anything; filtering by status, period and event happens here.
    /// Tickets of events missing from `events` still count in the totals.
    #[must_use]
    pub fn compile(
        tickets: &[Ticket],
        events: &[Event],
        query: &ReportQuery,
        now: DateTime<Utc>,
    ) -> Self {
        let period_start = query.period_start(now);
        let sales: Vec<&Ticket> = tickets
            .iter()
            .filter(|t| t.payment_status == PaymentStatus::Paid)
            .filter(|t| t.created_at >= period_start && t.created_at <= now)
            .filter(|t| query.event_id.is_none_or(|id| t.event_id == id))
            .collect();

        let total_revenue = sum_revenue(sales.iter().copied());
        let seats_sold = sum_seats(sales.iter().copied());
        let transactions = sales.len() as u64;
        let average_transaction = total_revenue
            .cents()
            .checked_div(transactions)
            .map_or(Money::ZERO, Money::from_cents);

        Self {
            period_start,
            period_end: now,
            total_revenue,
            seats_sold,
            transactions,
            average_transaction,
            daily: daily_breakdown(&sales, query.period_days, now),
            by_event: event_breakdown(&sales, events),
            by_payment_method: payment_breakdown(&sales),
        }
    }
}

fn sum_revenue<'a>(tickets: impl Iterator<Item = &'a Ticket>) -> Money {
    tickets.fold(Money::ZERO, |acc, t| acc.saturating_add(t.total_price))
}

fn sum_seats<'a>(tickets: impl Iterator<Item = &'a Ticket>) -> u64 {
    tickets.map(|t| u64::from(t.quantity)).sum()
}

fn daily_breakdown(sales: &[&Ticket], period_days: u32, now: DateTime<Utc>) -> Vec<DailySales> {
    let days = period_days.min(MAX_DAILY_BREAKDOWN);
    let today = now.date_naive();

    let mut by_day: BTreeMap<NaiveDate, DailySales> = (0..days)
        .rev()
        .map(|offset| today - Duration::days(i64::from(offset)))
        .map(|date| {
            (
                date,
                DailySales {
                    date,
                    seats: 0,
                    revenue: Money::ZERO,
                },
            )
        })
        .collect();

    for ticket in sales {
        if let Some(day) = by_day.get_mut(&ticket.created_at.date_naive()) {
            day.seats += u64::from(ticket.quantity);
            day.revenue = day.revenue.saturating_add(ticket.total_price);
        }
    }

    by_day.into_values().collect()
}

fn event_breakdown(sales: &[&Ticket], events: &[Event]) -> Vec<EventSales> {
    let mut rows: Vec<EventSales> = events
        .iter()
        .map(|event| {
            let of_event: Vec<&Ticket> =
                sales.iter().copied().filter(|t| t.event_id == event.id).collect();
            EventSales {
                event_id: event.id,
                title: event.title.clone(),
                seats: sum_seats(of_event.iter().copied()),
                revenue: sum_revenue(of_event.iter().copied()),
                capacity: event.total_tickets,
            }
        })
        .filter(|row| row.seats > 0)
        .collect();

    rows.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    rows
}

fn payment_breakdown(sales: &[&Ticket]) -> Vec<PaymentMethodSales> {
    [PaymentMethod::InstantTransfer, PaymentMethod::Card]
        .into_iter()
        .map(|method| {
            let of_method: Vec<&Ticket> = sales
                .iter()
                .copied()
                .filter(|t| t.payment_method == method)
                .collect();
            PaymentMethodSales {
                method,
                transactions: of_method.len() as u64,
                revenue: sum_revenue(of_method.iter().copied()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Buyer, EventDetails, EventStatus, MemberId, TicketCode, TicketId};
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 31, 18, 0, 0).single().unwrap_or_default()
    }

    fn event(title: &str) -> Event {
        Event::new(
            EventId::new(),
            EventDetails {
                title: title.to_string(),
                description: String::new(),
                date: now() + Duration::days(10),
                location: "Stadium".to_string(),
                image_url: None,
                ticket_price: Money::from_cents(5_000),
                raffle_limit: 100,
                status: EventStatus::Active,
                published: true,
            },
            200,
            now() - Duration::days(90),
        )
    }

    fn ticket(
        event_id: EventId,
        quantity: u32,
        cents: u64,
        method: PaymentMethod,
        status: PaymentStatus,
        days_ago: i64,
    ) -> Ticket {
        let created_at = now() - Duration::days(days_ago);
        Ticket {
            id: TicketId::new(),
            event_id,
            buyer: Buyer {
                member_id: MemberId::new(),
                email: "fan@example.com".to_string(),
                full_name: "Fan".to_string(),
            },
            quantity,
            unit_price: Money::from_cents(cents),
            total_price: Money::from_cents(cents * u64::from(quantity)),
            payment_method: method,
            payment_status: status,
            purchase_order: 1,
            eligible_for_raffle: true,
            ticket_code: TicketCode::new("FC-TEST"),
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn totals_count_only_paid_tickets_in_period() {
        let derby = event("Derby");
        let tickets = vec![
            ticket(derby.id, 2, 5_000, PaymentMethod::Card, PaymentStatus::Paid, 1),
            ticket(derby.id, 1, 5_000, PaymentMethod::InstantTransfer, PaymentStatus::Paid, 3),
            ticket(derby.id, 4, 5_000, PaymentMethod::Card, PaymentStatus::Pending, 1),
            ticket(derby.id, 1, 5_000, PaymentMethod::Card, PaymentStatus::Cancelled, 1),
            ticket(derby.id, 1, 5_000, PaymentMethod::Card, PaymentStatus::Paid, 45),
        ];

        let report =
            SalesReport::compile(&tickets, &[derby], &ReportQuery::default(), now());

        assert_eq!(report.transactions, 2);
        assert_eq!(report.seats_sold, 3);
        assert_eq!(report.total_revenue, Money::from_cents(15_000));
        assert_eq!(report.average_transaction, Money::from_cents(7_500));
    }

    #[test]
    fn daily_breakdown_is_capped_and_ordered() {
        let derby = event("Derby");
        let tickets = vec![
            ticket(derby.id, 2, 1_000, PaymentMethod::Card, PaymentStatus::Paid, 0),
            ticket(derby.id, 1, 1_000, PaymentMethod::Card, PaymentStatus::Paid, 2),
        ];
        let query = ReportQuery {
            period_days: 90,
            event_id: None,
        };

        let report = SalesReport::compile(&tickets, &[derby], &query, now());

        assert_eq!(report.daily.len(), 30);
        assert!(report.daily.windows(2).all(|w| w[0].date < w[1].date));
        let last = report.daily.last().map(|d| (d.date, d.seats));
        assert_eq!(last, Some((now().date_naive(), 2)));
        assert_eq!(report.daily[27].seats, 1);
    }

    #[test]
    fn events_without_sales_are_omitted_and_sorted_by_revenue() {
        let derby = event("Derby");
        let final_match = event("Final");
        let empty = event("Friendly");
        let tickets = vec![
            ticket(derby.id, 1, 5_000, PaymentMethod::Card, PaymentStatus::Paid, 1),
            ticket(final_match.id, 3, 5_000, PaymentMethod::Card, PaymentStatus::Paid, 1),
        ];

        let report = SalesReport::compile(
            &tickets,
            &[derby.clone(), final_match.clone(), empty],
            &ReportQuery::default(),
            now(),
        );

        let order: Vec<EventId> = report.by_event.iter().map(|e| e.event_id).collect();
        assert_eq!(order, vec![final_match.id, derby.id]);
        assert_eq!(report.by_event[0].capacity, 200);
    }

    #[test]
    fn event_filter_restricts_every_figure() {
        let derby = event("Derby");
        let other = event("Other");
        let tickets = vec![
            ticket(derby.id, 1, 5_000, PaymentMethod::Card, PaymentStatus::Paid, 1),
            ticket(other.id, 1, 9_000, PaymentMethod::Card, PaymentStatus::Paid, 1),
        ];
        let query = ReportQuery {
            period_days: 7,
            event_id: Some(derby.id),
        };

        let report = SalesReport::compile(&tickets, &[derby, other], &query, now());

        assert_eq!(report.total_revenue, Money::from_cents(5_000));
        assert_eq!(report.by_event.len(), 1);
    }

    #[test]
    fn period_outside_bounds_is_rejected() {
        let query = |period_days| ReportQuery {
            period_days,
            event_id: None,
        };

        assert!(query(1).validate().is_ok());
        assert!(query(MAX_PERIOD_DAYS).validate().is_ok());
        assert!(matches!(query(0).validate(), Err(LedgerError::Validation(_))));
        assert!(matches!(
            query(200_000_000).validate(),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn oversized_period_saturates_instead_of_overflowing() {
        let query = ReportQuery {
            period_days: 200_000_000,
            event_id: None,
        };

        assert_eq!(query.period_start(now()), DateTime::<Utc>::MIN_UTC);

        let report = SalesReport::compile(&[], &[], &query, now());
        assert_eq!(report.period_start, DateTime::<Utc>::MIN_UTC);
        assert_eq!(report.daily.len(), 30);
    }

    #[test]
    fn empty_report_has_zero_average() {
        let report = SalesReport::compile(&[], &[], &ReportQuery::default(), now());
        assert_eq!(report.average_transaction, Money::ZERO);
        assert_eq!(report.by_payment_method.len(), 2);
        assert!(report.by_event.is_empty());
    }

    proptest! {
        #[test]
        fn breakdowns_add_up_to_totals(
            sales in prop::collection::vec((1u32..5, 100u64..10_000, any::<bool>(), 0i64..60), 0..40)
        ) {
            let derby = event("Derby");
            let tickets: Vec<Ticket> = sales
                .iter()
                .map(|&(quantity, cents, card, days_ago)| {
                    let method = if card { PaymentMethod::Card } else { PaymentMethod::InstantTransfer };
                    ticket(derby.id, quantity, cents, method, PaymentStatus::Paid, days_ago)
                })
                .collect();

            let report = SalesReport::compile(&tickets, &[derby], &ReportQuery::default(), now());

            let by_method: u64 = report.by_payment_method.iter().map(|m| m.revenue.cents()).sum();
            let by_method_count: u64 = report.by_payment_method.iter().map(|m| m.transactions).sum();
            let by_event: u64 = report.by_event.iter().map(|e| e.seats).sum();
            prop_assert_eq!(by_method, report.total_revenue.cents());
            prop_assert_eq!(by_method_count, report.transactions);
            prop_assert_eq!(by_event, report.seats_sold);
        }
    }
}
