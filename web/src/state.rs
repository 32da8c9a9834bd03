//! Application state shared by all handlers.

use fanclub_core::{Catalog, IdentityProvider, Ledger, LedgerEnvironment};
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// The ledger and the catalog run over the same [`LedgerEnvironment`], so they see one
/// store and one clock.
#[derive(Clone)]
pub struct AppState {
    /// Purchases and raffle draws
    pub ledger: Arc<Ledger>,
    /// Administrative CRUD and member listings
    pub catalog: Catalog,
    /// Resolves bearer tokens to identities
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Build the state over one environment.
    #[must_use]
    pub fn new(env: LedgerEnvironment, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            ledger: Arc::new(Ledger::new(env.clone())),
            catalog: Catalog::new(env),
            identity,
        }
    }

    /// Build the state from an existing ledger and catalog.
    ///
    /// Tests use this to keep a handle on the ledger they assert against.
    #[must_use]
    pub const fn from_parts(
        ledger: Arc<Ledger>,
        catalog: Catalog,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            ledger,
            catalog,
            identity,
        }
    }
}
