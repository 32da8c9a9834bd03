//! Inventory & Raffle Ledger.
//!
//! Owns the per-event sold counter: assigns each purchase its position in the event's
//! sale sequence, derives raffle eligibility from that position, and commits the new
//! counter together with the ticket. Also runs raffle draws.
//!
//! # Concurrency
//!
//! Two layers protect the read-compute-write sequence of a purchase:
//!
//! 1. Within a process, a per-event async mutex serializes purchases of the same event,
//!    so they never race each other for the counter.
//! 2. Across processes sharing one store, [`CatalogStore::commit_purchase`] is a
//!    compare-and-swap on the counter. A lost swap re-reads the event and retries under
//!    the [`RetryPolicy`](crate::retry::RetryPolicy); exhaustion surfaces as
//!    [`LedgerError::TransientFailure`].
//!
//! Purchases of different events never wait on each other.
//!
//! [`CatalogStore::commit_purchase`]: crate::store::CatalogStore::commit_purchase

use crate::environment::LedgerEnvironment;
use crate::error::{LedgerError, Result, StoreError};
use crate::identity::Identity;
use crate::metrics;
use crate::retry::retry_with_predicate;
use crate::store::TicketQuery;
use crate::types::{
    EventId, PaymentMethod, PaymentStatus, Raffle, RaffleId, RaffleWinner, Ticket, TicketId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Fresh ticket codes tried per commit before a collision is reported.
const MAX_CODE_ATTEMPTS: usize = 3;

/// Whether a purchase at `purchase_order` takes part in the raffle.
///
/// Only the first `raffle_limit` positions of the sale sequence qualify. A multi-seat
/// purchase is one entry, judged by the position of its first seat.
#[must_use]
pub const fn is_raffle_eligible(purchase_order: u32, raffle_limit: u32) -> bool {
    purchase_order <= raffle_limit
}

/// A member's request to buy seats.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PurchaseRequest {
    /// Event to buy seats for
    pub event_id: EventId,
    /// Seats requested, at least one
    pub quantity: u32,
    /// How the buyer pays
    pub payment_method: PaymentMethod,
}

type EventMutex = Arc<tokio::sync::Mutex<()>>;

/// Per-event async mutexes, created on first use and dropped once nobody holds or waits
/// for them.
#[derive(Default)]
struct EventLocks {
    locks: Mutex<HashMap<EventId, EventMutex>>,
}

impl EventLocks {
    // The map mutex is only ever held for a lookup, never across an await.
    fn map(&self) -> MutexGuard<'_, HashMap<EventId, EventMutex>> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_for(&self, event_id: EventId) -> EventMutex {
        Arc::clone(self.map().entry(event_id).or_default())
    }

    /// Wait for exclusive access to `event_id`.
    async fn acquire(&self, event_id: EventId) -> EventLockGuard<'_> {
        let guard = self.lock_for(event_id).lock_owned().await;
        EventLockGuard {
            locks: self,
            event_id,
            guard: Some(guard),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.map().len()
    }
}

/// Exclusive access to one event. Dropping it releases the mutex and prunes the map
/// entry if no other purchase holds a handle to it.
struct EventLockGuard<'a> {
    locks: &'a EventLocks,
    event_id: EventId,
    guard: Option<tokio::sync::OwnedMutexGuard<()>>,
}

impl Drop for EventLockGuard<'_> {
    fn drop(&mut self) {
        let mut map = self.locks.map();
        drop(self.guard.take());
        // Handles are only cloned under the map mutex, so a count of one is stable here.
        if map
            .get(&self.event_id)
            .is_some_and(|mutex| Arc::strong_count(mutex) == 1)
        {
            map.remove(&self.event_id);
        }
    }
}

/// The Inventory & Raffle Ledger.
pub struct Ledger {
    env: LedgerEnvironment,
    locks: EventLocks,
}

impl Ledger {
    /// Creates a ledger over `env`.
    #[must_use]
    pub fn new(env: LedgerEnvironment) -> Self {
        Self {
            env,
            locks: EventLocks::default(),
        }
    }

    /// The environment this ledger runs in.
    #[must_use]
    pub const fn environment(&self) -> &LedgerEnvironment {
        &self.env
    }

    /// Buy `request.quantity` seats of an event for `buyer`.
    ///
    /// On success the event's sold counter has grown by exactly `quantity` and the
    /// returned ticket is persisted. On failure nothing was written.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidQuantity`] if `quantity` is zero.
    /// - [`LedgerError::NotFound`] if the event does not exist or is unpublished.
    /// - [`LedgerError::EventNotPurchasable`] if the event is not active or already happened.
    /// - [`LedgerError::CapacityExceeded`] if fewer than `quantity` seats are left.
    /// - [`LedgerError::TransientFailure`] if concurrent writers kept winning the commit.
    /// - [`LedgerError::Store`] on storage failure.
    #[tracing::instrument(
        skip(self, buyer),
        fields(event_id = %request.event_id, quantity = request.quantity, buyer = %buyer.member_id)
    )]
    pub async fn purchase(&self, buyer: &Identity, request: PurchaseRequest) -> Result<Ticket> {
        if request.quantity == 0 {
            metrics::record_purchase_rejected("invalid_quantity");
            return Err(LedgerError::InvalidQuantity);
        }

        let started = Instant::now();
        let _guard = self.locks.acquire(request.event_id).await;

        let result = retry_with_predicate(
            &self.env.retry,
            || self.try_purchase(buyer, &request),
            LedgerError::is_retryable,
        )
        .await;

        match result {
            Ok(ticket) => {
                tracing::info!(
                    ticket_id = %ticket.id,
                    ticket_code = %ticket.ticket_code,
                    purchase_order = ticket.purchase_order,
                    eligible_for_raffle = ticket.eligible_for_raffle,
                    "Purchase committed"
                );
                metrics::record_purchase_committed(
                    ticket.quantity,
                    ticket.total_price.cents(),
                    started.elapsed().as_secs_f64(),
                );
                Ok(ticket)
            },
            Err(LedgerError::ConcurrentUpdateConflict) => {
                let attempts = self.env.retry.max_retries + 1;
                tracing::warn!(attempts, "Purchase abandoned after repeated conflicts");
                metrics::record_purchase_rejected("transient_failure");
                Err(LedgerError::TransientFailure { attempts })
            },
            Err(err) => {
                tracing::info!(error = %err, "Purchase rejected");
                metrics::record_purchase_rejected(purchase_outcome(&err));
                Err(err)
            },
        }
    }

    /// One read-compute-write round of a purchase.
    async fn try_purchase(&self, buyer: &Identity, request: &PurchaseRequest) -> Result<Ticket> {
        let event = self.env.store.get_event(request.event_id).await?;
        if !event.published {
            return Err(LedgerError::not_found("event", event.id));
        }
        let now = self.env.clock.now();

        event
            .check_purchasable(now)
            .map_err(|reason| LedgerError::EventNotPurchasable {
                event_id: event.id,
                reason,
            })?;

        let available = event.available_tickets();
        if request.quantity > available {
            return Err(LedgerError::CapacityExceeded {
                requested: request.quantity,
                available,
            });
        }

        let prior_sold = event.sold_tickets;
        let purchase_order = prior_sold + 1;
        let total_price = event
            .ticket_price
            .checked_multiply(request.quantity)
            .ok_or_else(|| LedgerError::Validation("total price overflows".to_string()))?;

        let mut code_attempts = 0;
        loop {
            code_attempts += 1;
            let ticket = Ticket {
                id: TicketId::new(),
                event_id: event.id,
                buyer: buyer.as_buyer(),
                quantity: request.quantity,
                unit_price: event.ticket_price,
                total_price,
                payment_method: request.payment_method,
                payment_status: PaymentStatus::Paid,
                purchase_order,
                eligible_for_raffle: is_raffle_eligible(purchase_order, event.raffle_limit),
                ticket_code: self.env.codes.generate(now),
                created_at: now,
                updated_at: now,
            };

            match self.env.store.commit_purchase(prior_sold, ticket.clone()).await {
                Ok(new_sold) => {
                    tracing::debug!(prior_sold, new_sold, "Sold counter advanced");
                    return Ok(ticket);
                },
                Err(StoreError::Duplicate { .. }) if code_attempts < MAX_CODE_ATTEMPTS => {
                    tracing::warn!(
                        ticket_code = %ticket.ticket_code,
                        "Ticket code collision, regenerating"
                    );
                },
                Err(StoreError::Conflict { .. }) => {
                    tracing::debug!(prior_sold, "Sold counter moved concurrently, re-reading");
                    metrics::record_purchase_conflict();
                    return Err(LedgerError::ConcurrentUpdateConflict);
                },
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Draw the winner of a pending raffle.
    ///
    /// Picks uniformly among the paid, raffle-eligible tickets of the raffle's event. The
    /// winner and draw date are frozen once this succeeds.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Forbidden`] unless `actor` is an admin.
    /// - [`LedgerError::NotFound`] if the raffle does not exist.
    /// - [`LedgerError::AlreadyDrawn`] if the raffle is completed, including when a
    ///   concurrent draw completed it first.
    /// - [`LedgerError::NoEligibleParticipants`] if the pool is empty; the raffle stays pending.
    #[tracing::instrument(skip(self, actor), fields(actor = %actor.member_id))]
    pub async fn draw_winner(&self, actor: &Identity, raffle_id: RaffleId) -> Result<Raffle> {
        actor.require_admin()?;

        let raffle = self.env.store.get_raffle(raffle_id).await?;
        if raffle.is_completed() {
            tracing::info!("Draw rejected, raffle already completed");
            return Err(LedgerError::AlreadyDrawn);
        }

        let mut pool = self.participant_pool(&raffle).await?;
        if pool.is_empty() {
            tracing::info!(event_id = %raffle.event_id, "Draw rejected, no eligible participants");
            return Err(LedgerError::NoEligibleParticipants);
        }

        let participants = pool.len();
        let index = self.env.selector.select(participants).min(participants - 1);
        let winning = pool.swap_remove(index);
        let winner = RaffleWinner {
            ticket_id: winning.id,
            buyer: winning.buyer,
        };

        let draw_date = self.env.clock.now();
        match self
            .env
            .store
            .complete_raffle(raffle_id, winner, draw_date)
            .await
        {
            Ok(completed) => {
                tracing::info!(
                    participants,
                    ticket_id = %winning.id,
                    purchase_order = winning.purchase_order,
                    "Raffle drawn"
                );
                metrics::record_raffle_drawn(participants);
                Ok(completed)
            },
            Err(StoreError::Conflict { .. }) => {
                tracing::info!("Raffle completed by a concurrent draw");
                Err(LedgerError::AlreadyDrawn)
            },
            Err(err) => Err(err.into()),
        }
    }

    /// The tickets a draw of `raffle_id` would pick from, in purchase order.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Forbidden`] unless `actor` is an admin.
    /// - [`LedgerError::NotFound`] if the raffle does not exist.
    pub async fn raffle_participants(
        &self,
        actor: &Identity,
        raffle_id: RaffleId,
    ) -> Result<Vec<Ticket>> {
        actor.require_admin()?;
        let raffle = self.env.store.get_raffle(raffle_id).await?;
        self.participant_pool(&raffle).await
    }

    async fn participant_pool(&self, raffle: &Raffle) -> Result<Vec<Ticket>> {
        let mut pool = self
            .env
            .store
            .list_tickets(TicketQuery::raffle_pool(raffle.event_id))
            .await?;
        pool.retain(Ticket::qualifies_for_draw);
        pool.sort_by_key(|ticket| ticket.purchase_order);
        Ok(pool)
    }
}

fn purchase_outcome(err: &LedgerError) -> &'static str {
    match err {
        LedgerError::CapacityExceeded { .. } => "capacity_exceeded",
        LedgerError::EventNotPurchasable { .. } => "not_purchasable",
        LedgerError::NotFound { .. } => "not_found",
        _ => "error",
    }
}
