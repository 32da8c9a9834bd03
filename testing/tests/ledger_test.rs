//! Purchase accounting tests for the ledger against the in-memory store.

#![allow(clippy::expect_used, clippy::unwrap_used)] // Test code can use unwrap/expect

use chrono::Duration;
use fanclub_core::{
    Buyer, EventId, EventStatus, LedgerError, Money, NotPurchasableReason, PaymentMethod,
    PaymentStatus, Ticket, TicketCode, TicketId,
};
use fanclub_testing::{
    EventBuilder, ScriptedTicketCodes, ScriptedWinnerSelector, TestBackend, fast_retry,
    init_test_tracing, member, purchase_of, test_time,
};
use proptest::prelude::*;

#[tokio::test]
async fn first_purchase_takes_position_one() {
    init_test_tracing();
    let backend = TestBackend::new();
    let event_id = backend.seed(EventBuilder::new().capacity(10).price_cents(5_000).build());
    let ana = member("ana");

    let ticket = backend
        .ledger
        .purchase(&ana, purchase_of(event_id, 2))
        .await
        .unwrap();

    assert_eq!(ticket.purchase_order, 1);
    assert_eq!(ticket.seat_range(), 1..3);
    assert!(ticket.eligible_for_raffle);
    assert_eq!(ticket.payment_status, PaymentStatus::Paid);
    assert_eq!(ticket.unit_price, Money::from_cents(5_000));
    assert_eq!(ticket.total_price, Money::from_cents(10_000));
    assert_eq!(ticket.buyer, ana.as_buyer());
    assert_eq!(ticket.ticket_code.as_str(), "FC-TEST-000001");
    assert_eq!(ticket.created_at, test_time());

    let event = backend.store.event(event_id).unwrap();
    assert_eq!(event.sold_tickets, 2);
    assert_eq!(backend.store.tickets_of(event_id), vec![ticket]);
}

#[tokio::test]
async fn purchase_order_follows_prior_sold_count() {
    let backend = TestBackend::new();
    let event_id = backend.seed(EventBuilder::new().capacity(20).build());

    let first = backend.ledger.purchase(&member("a"), purchase_of(event_id, 3)).await.unwrap();
    let second = backend.ledger.purchase(&member("b"), purchase_of(event_id, 1)).await.unwrap();
    let third = backend.ledger.purchase(&member("c"), purchase_of(event_id, 4)).await.unwrap();

    assert_eq!(first.purchase_order, 1);
    assert_eq!(second.purchase_order, 4);
    assert_eq!(third.purchase_order, 5);
    assert_eq!(backend.store.event(event_id).unwrap().sold_tickets, 8);
}

#[tokio::test]
async fn eligibility_ends_at_raffle_limit() {
    let backend = TestBackend::new();
    let event_id = backend.seed(
        EventBuilder::new()
            .capacity(200)
            .raffle_limit(100)
            .sold(99)
            .build(),
    );

    let hundredth = backend.ledger.purchase(&member("a"), purchase_of(event_id, 1)).await.unwrap();
    let hundred_first = backend.ledger.purchase(&member("b"), purchase_of(event_id, 1)).await.unwrap();

    assert_eq!(hundredth.purchase_order, 100);
    assert!(hundredth.eligible_for_raffle);
    assert_eq!(hundred_first.purchase_order, 101);
    assert!(!hundred_first.eligible_for_raffle);
}

#[tokio::test]
async fn multi_seat_purchase_is_eligible_by_its_first_seat() {
    let backend = TestBackend::new();
    let event_id = backend.seed(EventBuilder::new().raffle_limit(10).sold(9).build());

    let ticket = backend.ledger.purchase(&member("a"), purchase_of(event_id, 5)).await.unwrap();

    assert_eq!(ticket.purchase_order, 10);
    assert!(ticket.eligible_for_raffle);
}

#[tokio::test]
async fn capacity_rejection_changes_nothing() {
    let backend = TestBackend::new();
    let event_id = backend.seed(EventBuilder::new().capacity(50).sold(49).build());

    let result = backend.ledger.purchase(&member("a"), purchase_of(event_id, 2)).await;

    assert_eq!(
        result,
        Err(LedgerError::CapacityExceeded {
            requested: 2,
            available: 1
        })
    );
    assert_eq!(backend.store.event(event_id).unwrap().sold_tickets, 49);
    assert_eq!(backend.store.ticket_count(), 0);
}

#[tokio::test]
async fn last_seat_can_be_bought() {
    let backend = TestBackend::new();
    let event_id = backend.seed(EventBuilder::new().capacity(50).sold(49).build());

    let ticket = backend.ledger.purchase(&member("a"), purchase_of(event_id, 1)).await.unwrap();

    assert_eq!(ticket.purchase_order, 50);
    assert_eq!(backend.store.event(event_id).unwrap().sold_tickets, 50);
}

#[tokio::test]
async fn zero_quantity_is_rejected() {
    let backend = TestBackend::new();
    let event_id = backend.seed(EventBuilder::new().build());

    let result = backend.ledger.purchase(&member("a"), purchase_of(event_id, 0)).await;

    assert_eq!(result, Err(LedgerError::InvalidQuantity));
    assert_eq!(backend.store.commit_attempts(), 0);
}

#[tokio::test]
async fn unknown_event_is_not_found() {
    let backend = TestBackend::new();
    let missing = EventId::new();

    let result = backend.ledger.purchase(&member("a"), purchase_of(missing, 1)).await;

    assert_eq!(result, Err(LedgerError::not_found("event", missing)));
}

#[tokio::test]
async fn unpublished_event_is_not_found() {
    let backend = TestBackend::new();
    let hidden = backend.seed(EventBuilder::new().unpublished().build());

    let result = backend.ledger.purchase(&member("a"), purchase_of(hidden, 1)).await;

    assert_eq!(result, Err(LedgerError::not_found("event", hidden)));
    assert_eq!(backend.store.event(hidden).unwrap().sold_tickets, 0);
    assert_eq!(backend.store.commit_attempts(), 0);
}

#[tokio::test]
async fn closed_cancelled_and_past_events_are_not_purchasable() {
    let backend = TestBackend::new();
    let cases = [
        (
            EventBuilder::new().status(EventStatus::Closed).build(),
            NotPurchasableReason::Closed,
        ),
        (
            EventBuilder::new().status(EventStatus::Cancelled).build(),
            NotPurchasableReason::Cancelled,
        ),
        (
            EventBuilder::new().date(test_time() - Duration::hours(1)).build(),
            NotPurchasableReason::AlreadyHappened,
        ),
    ];

    for (event, reason) in cases {
        let event_id = backend.seed(event);
        let result = backend.ledger.purchase(&member("a"), purchase_of(event_id, 1)).await;

        assert_eq!(
            result,
            Err(LedgerError::EventNotPurchasable { event_id, reason })
        );
        assert_eq!(backend.store.event(event_id).unwrap().sold_tickets, 0);
    }
    assert_eq!(backend.store.ticket_count(), 0);
}

#[tokio::test]
async fn lost_commits_are_retried_transparently() {
    let backend = TestBackend::new();
    let event_id = backend.seed(EventBuilder::new().build());
    backend.store.inject_conflicts(2);

    let ticket = backend.ledger.purchase(&member("a"), purchase_of(event_id, 1)).await.unwrap();

    assert_eq!(ticket.purchase_order, 1);
    assert_eq!(backend.store.commit_attempts(), 3);
    assert_eq!(backend.store.event(event_id).unwrap().sold_tickets, 1);
}

#[tokio::test]
async fn persistent_conflicts_surface_as_transient_failure() {
    let backend = TestBackend::new();
    let event_id = backend.seed(EventBuilder::new().build());
    backend.store.inject_conflicts(100);

    let result = backend.ledger.purchase(&member("a"), purchase_of(event_id, 1)).await;

    assert_eq!(result, Err(LedgerError::TransientFailure { attempts: 4 }));
    assert_eq!(backend.store.commit_attempts(), 4);
    assert_eq!(backend.store.event(event_id).unwrap().sold_tickets, 0);
    assert_eq!(backend.store.ticket_count(), 0);
}

#[tokio::test]
async fn sale_by_another_instance_moves_purchase_order() {
    let backend = TestBackend::new();
    let event_id = backend.seed(EventBuilder::new().capacity(10).build());
    backend.store.interleave_sales(vec![3]);

    let ticket = backend.ledger.purchase(&member("a"), purchase_of(event_id, 2)).await.unwrap();

    assert_eq!(ticket.purchase_order, 4);
    assert_eq!(backend.store.event(event_id).unwrap().sold_tickets, 5);
}

#[tokio::test]
async fn sale_by_another_instance_can_exhaust_capacity() {
    let backend = TestBackend::new();
    let event_id = backend.seed(EventBuilder::new().capacity(5).build());
    backend.store.interleave_sales(vec![4]);

    let result = backend.ledger.purchase(&member("a"), purchase_of(event_id, 2)).await;

    assert_eq!(
        result,
        Err(LedgerError::CapacityExceeded {
            requested: 2,
            available: 1
        })
    );
    assert_eq!(backend.store.event(event_id).unwrap().sold_tickets, 4);
}

#[tokio::test]
async fn colliding_ticket_code_is_regenerated() {
    let backend = TestBackend::with_parts(
        ScriptedTicketCodes::new().queue(["FC-TAKEN"]),
        ScriptedWinnerSelector::new(0),
        fast_retry(),
    );
    let event_id = backend.seed(EventBuilder::new().build());
    backend.store.seed_ticket(Ticket {
        id: TicketId::new(),
        event_id: EventId::new(),
        buyer: Buyer {
            member_id: member("old").member_id,
            email: "old@fans.example".to_string(),
            full_name: "old".to_string(),
        },
        quantity: 1,
        unit_price: Money::from_cents(1_000),
        total_price: Money::from_cents(1_000),
        payment_method: PaymentMethod::InstantTransfer,
        payment_status: PaymentStatus::Paid,
        purchase_order: 1,
        eligible_for_raffle: true,
        ticket_code: TicketCode::new("FC-TAKEN"),
        created_at: test_time(),
        updated_at: test_time(),
    });

    let ticket = backend.ledger.purchase(&member("a"), purchase_of(event_id, 1)).await.unwrap();

    assert_ne!(ticket.ticket_code.as_str(), "FC-TAKEN");
    assert_eq!(backend.codes.generated(), 2);
    assert_eq!(backend.store.event(event_id).unwrap().sold_tickets, 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn sequential_purchases_keep_the_books_straight(
        capacity in 1u32..40,
        raffle_limit in 1u32..40,
        quantities in prop::collection::vec(1u32..6, 1..30),
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        rt.block_on(async {
            let backend = TestBackend::new();
            let event_id = backend.seed(
                EventBuilder::new().capacity(capacity).raffle_limit(raffle_limit).build(),
            );

            let mut committed = 0u32;
            for quantity in quantities {
                match backend.ledger.purchase(&member("fan"), purchase_of(event_id, quantity)).await {
                    Ok(ticket) => {
                        prop_assert_eq!(ticket.purchase_order, committed + 1);
                        prop_assert_eq!(
                            ticket.eligible_for_raffle,
                            ticket.purchase_order <= raffle_limit
                        );
                        committed += quantity;
                    },
                    Err(LedgerError::CapacityExceeded { requested, available }) => {
                        prop_assert_eq!(requested, quantity);
                        prop_assert_eq!(available, capacity - committed);
                        prop_assert!(quantity > available);
                    },
                    Err(other) => prop_assert!(false, "unexpected error: {other}"),
                }
            }

            let event = backend.store.event(event_id).unwrap();
            prop_assert_eq!(event.sold_tickets, committed);
            prop_assert!(event.sold_tickets <= event.total_tickets);

            let tickets = backend.store.tickets_of(event_id);
            let total: u32 = tickets.iter().map(|t| t.quantity).sum();
            prop_assert_eq!(total, committed);
            for pair in tickets.windows(2) {
                prop_assert_eq!(pair[0].seat_range().end, pair[1].purchase_order);
            }
            Ok(())
        })?;
    }
}
