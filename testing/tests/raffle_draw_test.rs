//! Raffle draw tests: pool selection, draw idempotence and authorization.

#![allow(clippy::expect_used, clippy::unwrap_used)] // Test code can use unwrap/expect

use fanclub_core::{LedgerError, PaymentStatus, RaffleId, RaffleStatus, Ticket};
use fanclub_testing::{
    EventBuilder, ScriptedTicketCodes, ScriptedWinnerSelector, TestBackend, admin, fast_retry,
    member, purchase_of, test_time,
};
use std::sync::Arc;

/// Sell `buyers` single seats of a fresh event with the given raffle limit.
async fn event_with_sales(
    backend: &TestBackend,
    raffle_limit: u32,
    buyers: &[&str],
) -> (RaffleId, Vec<Ticket>) {
    let event_id = backend.seed(EventBuilder::new().raffle_limit(raffle_limit).build());
    let mut tickets = Vec::new();
    for name in buyers {
        tickets.push(
            backend
                .ledger
                .purchase(&member(name), purchase_of(event_id, 1))
                .await
                .unwrap(),
        );
    }
    (backend.seed_raffle(event_id), tickets)
}

#[tokio::test]
async fn draw_picks_a_paid_eligible_ticket_and_freezes_the_result() {
    let backend = TestBackend::new();
    let (raffle_id, tickets) = event_with_sales(&backend, 2, &["ana", "bia", "caio"]).await;

    let raffle = backend.ledger.draw_winner(&admin(), raffle_id).await.unwrap();

    assert_eq!(raffle.status, RaffleStatus::Completed);
    assert_eq!(raffle.draw_date, Some(test_time()));
    let winner = raffle.winner.clone().unwrap();
    assert_eq!(winner.ticket_id, tickets[0].id);
    assert_eq!(winner.buyer, tickets[0].buyer);
    assert_eq!(backend.selector.pool_sizes(), vec![2]);
    assert_eq!(backend.store.raffle(raffle_id), Some(raffle));
}

#[tokio::test]
async fn second_draw_is_rejected_and_changes_nothing() {
    let backend = TestBackend::new();
    let (raffle_id, _) = event_with_sales(&backend, 10, &["ana", "bia"]).await;

    let first = backend.ledger.draw_winner(&admin(), raffle_id).await.unwrap();
    let second = backend.ledger.draw_winner(&admin(), raffle_id).await;

    assert_eq!(second, Err(LedgerError::AlreadyDrawn));
    let stored = backend.store.raffle(raffle_id).unwrap();
    assert_eq!(stored.winner, first.winner);
    assert_eq!(stored.draw_date, first.draw_date);
    assert_eq!(backend.selector.pool_sizes().len(), 1);
}

#[tokio::test]
async fn draw_without_eligible_participants_leaves_raffle_pending() {
    let backend = TestBackend::new();
    let event_id = backend.seed(EventBuilder::new().raffle_limit(1).sold(1).build());
    backend
        .ledger
        .purchase(&member("late"), purchase_of(event_id, 1))
        .await
        .unwrap();
    let raffle_id = backend.seed_raffle(event_id);

    let result = backend.ledger.draw_winner(&admin(), raffle_id).await;

    assert_eq!(result, Err(LedgerError::NoEligibleParticipants));
    let raffle = backend.store.raffle(raffle_id).unwrap();
    assert_eq!(raffle.status, RaffleStatus::Pending);
    assert_eq!(raffle.winner, None);
    assert_eq!(raffle.draw_date, None);
}

#[tokio::test]
async fn draw_with_no_tickets_at_all_is_rejected() {
    let backend = TestBackend::new();
    let (raffle_id, _) = event_with_sales(&backend, 100, &[]).await;

    let result = backend.ledger.draw_winner(&admin(), raffle_id).await;

    assert_eq!(result, Err(LedgerError::NoEligibleParticipants));
}

#[tokio::test]
async fn cancelled_and_pending_tickets_are_excluded() {
    let backend = TestBackend::new();
    let admin = admin();
    let (raffle_id, tickets) = event_with_sales(&backend, 10, &["ana", "bia", "caio"]).await;

    backend
        .catalog
        .change_ticket_status(&admin, tickets[0].id, PaymentStatus::Cancelled)
        .await
        .unwrap();

    let participants = backend.ledger.raffle_participants(&admin, raffle_id).await.unwrap();
    let ids: Vec<_> = participants.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![tickets[1].id, tickets[2].id]);

    let raffle = backend.ledger.draw_winner(&admin, raffle_id).await.unwrap();
    assert_eq!(raffle.winner.unwrap().ticket_id, tickets[1].id);
    assert_eq!(backend.selector.pool_sizes(), vec![2]);
}

#[tokio::test]
async fn out_of_range_selection_is_clamped_to_the_pool() {
    let backend = TestBackend::with_parts(
        ScriptedTicketCodes::new(),
        ScriptedWinnerSelector::new(99),
        fast_retry(),
    );
    let (raffle_id, tickets) = event_with_sales(&backend, 10, &["ana", "bia"]).await;

    let raffle = backend.ledger.draw_winner(&admin(), raffle_id).await.unwrap();

    let winner = raffle.winner.unwrap().ticket_id;
    assert!(tickets.iter().any(|t| t.id == winner));
}

#[tokio::test]
async fn members_cannot_draw_or_inspect_the_pool() {
    let backend = TestBackend::new();
    let (raffle_id, _) = event_with_sales(&backend, 10, &["ana"]).await;
    let ana = member("ana");

    assert_eq!(
        backend.ledger.draw_winner(&ana, raffle_id).await,
        Err(LedgerError::Forbidden { required: "admin" })
    );
    assert_eq!(
        backend.ledger.raffle_participants(&ana, raffle_id).await,
        Err(LedgerError::Forbidden { required: "admin" })
    );
    assert_eq!(
        backend.store.raffle(raffle_id).unwrap().status,
        RaffleStatus::Pending
    );
}

#[tokio::test]
async fn unknown_raffle_is_not_found() {
    let backend = TestBackend::new();
    let missing = RaffleId::new();

    assert_eq!(
        backend.ledger.draw_winner(&admin(), missing).await,
        Err(LedgerError::not_found("raffle", missing))
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_draws_complete_exactly_once() {
    let backend = TestBackend::new();
    let (raffle_id, _) = event_with_sales(&backend, 10, &["ana", "bia", "caio"]).await;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let ledger = Arc::clone(&backend.ledger);
            tokio::spawn(async move { ledger.draw_winner(&admin(), raffle_id).await })
        })
        .collect();
    let results: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("draw task panicked"))
        .collect();

    let completed: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(completed.len(), 1);
    assert!(
        results
            .iter()
            .filter(|r| r.is_err())
            .all(|r| r == &Err(LedgerError::AlreadyDrawn))
    );
    assert_eq!(
        backend.store.raffle(raffle_id).unwrap().winner,
        completed[0].winner
    );
}
