//! `PostgreSQL` storage for the fan club backend.
//!
//! - [`PostgresCatalogStore`]: the [`CatalogStore`](fanclub_core::CatalogStore) used in
//!   production. The purchase commit and the raffle completion are conditional
//!   `UPDATE ... WHERE` statements, so several server instances can share one database.
//! - [`PostgresIdentityProvider`]: resolves bearer tokens against the `members` table,
//!   which only holds SHA-256 digests of the tokens.
//!
//! # Example
//!
//! ```no_run
//! use fanclub_postgres::PostgresCatalogStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = PostgresCatalogStore::connect("postgres://localhost/fanclub").await?;
//! store.migrate().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod identity;
mod rows;
mod store;

pub use identity::{PostgresIdentityProvider, hash_token};
pub use store::PostgresCatalogStore;
