//! REST handlers, one module per resource.
//!
//! Handlers only translate HTTP to calls on the [`Ledger`](fanclub_core::Ledger) and the
//! [`Catalog`](fanclub_core::Catalog); authorization happens inside those calls.

pub mod events;
pub mod news;
pub mod photos;
pub mod raffles;
pub mod reports;
pub mod tickets;

use serde::Deserialize;

/// Largest page any listing returns.
pub const MAX_LIMIT: usize = 200;

/// `?limit=` for listings.
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    /// Maximum number of results, [`MAX_LIMIT`] when absent or larger
    pub limit: Option<usize>,
}

impl LimitQuery {
    /// The effective limit.
    #[must_use]
    pub fn capped(&self) -> usize {
        capped(self.limit)
    }
}

pub(crate) fn capped(limit: Option<usize>) -> usize {
    limit.map_or(MAX_LIMIT, |limit| limit.min(MAX_LIMIT))
}
