//! # Fan Club Core
//!
//! Domain types and services for the fan club backend: events with a fixed seat
//! capacity, ticket sales, first-buyers raffles, news and a photo gallery.
//!
//! ## Core Concepts
//!
//! - **Ledger**: sells seats race-free, assigns each purchase its position in the
//!   event's sale sequence and derives raffle eligibility from it; draws raffle winners
//! - **Catalog**: administrative CRUD and member-facing listings
//! - **Catalog Store**: persistence with atomic conditional updates
//! - **Identity Provider**: resolves credentials to a request-scoped identity
//! - **Environment**: injected dependencies (clock, store, code generator, winner selector)
//!
//! ## Example
//!
//! ```ignore
//! use fanclub_core::*;
//!
//! let env = LedgerEnvironment::new(store, RetryPolicy::default());
//! let ledger = Ledger::new(env);
//!
//! let ticket = ledger
//!     .purchase(&identity, PurchaseRequest {
//!         event_id,
//!         quantity: 2,
//!         payment_method: PaymentMethod::Card,
//!     })
//!     .await?;
//! assert!(ticket.eligible_for_raffle);
//! ```

pub mod catalog;
pub mod environment;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod metrics;
pub mod reports;
pub mod retry;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use catalog::{Catalog, NewEvent, NewRaffle, NewsDraft, PhotoDraft, RaffleDetails};
pub use environment::{
    Clock, LedgerEnvironment, RandomTicketCodes, RandomWinnerSelector, SystemClock,
    TicketCodeGenerator, WinnerSelector,
};
pub use error::{LedgerError, Result, StoreError};
pub use identity::{Identity, IdentityProvider, Role};
pub use ledger::{Ledger, PurchaseRequest, is_raffle_eligible};
pub use reports::{ReportQuery, SalesReport};
pub use retry::RetryPolicy;
pub use store::{
    CatalogStore, EventQuery, EventTimeframe, NewsQuery, PhotoQuery, PublicListing, StoreFuture,
    TicketQuery,
};
pub use types::*;
