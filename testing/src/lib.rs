//! # Fan Club Testing
//!
//! Testing utilities for the fan club backend.
//!
//! This crate provides:
//! - [`InMemoryCatalogStore`]: a Catalog Store with real atomic conditional updates and
//!   fault injection for the ledger's retry path
//! - Mock implementations of Environment traits (fixed clock, scripted ticket codes,
//!   scripted winner selection, static identity provider)
//! - Fixture builders and a wired-up [`TestBackend`]
//!
//! ## Example
//!
//! ```ignore
//! use fanclub_testing::{EventBuilder, TestBackend, member, purchase_of};
//!
//! #[tokio::test]
//! async fn first_buyer_is_eligible() {
//!     let backend = TestBackend::new();
//!     let event_id = backend.seed(EventBuilder::new().capacity(10).build());
//!
//!     let ticket = backend
//!         .ledger
//!         .purchase(&member("ana"), purchase_of(event_id, 1))
//!         .await
//!         .unwrap();
//!     assert_eq!(ticket.purchase_order, 1);
//!     assert!(ticket.eligible_for_raffle);
//! }
//! ```

pub mod fixtures;
pub mod mocks;
pub mod store;

// Re-export commonly used items
pub use fixtures::{EventBuilder, TestBackend, admin, fast_retry, member, purchase_of};
pub use mocks::{
    FixedClock, ScriptedTicketCodes, ScriptedWinnerSelector, StaticIdentityProvider, test_clock,
    test_time,
};
pub use store::InMemoryCatalogStore;

/// Install a `tracing` subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call installs the subscriber.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fanclub_core=debug".into()),
        )
        .with_test_writer()
        .try_init();
}
