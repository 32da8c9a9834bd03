//! HTTP API for the fan club backend.
//!
//! A thin Axum shell over [`fanclub_core`]: handlers parse the request, resolve the
//! caller's identity from the bearer token and call the ledger or the catalog, which
//! enforce every business rule and authorization check themselves.
//!
//! # Request Flow
//!
//! 1. **Correlation ID** assigned by [`middleware::correlation_id_layer`]
//! 2. **Identity** resolved by the [`CurrentUser`] / [`MaybeUser`] extractors
//! 3. **Core call** on [`AppState::ledger`] or [`AppState::catalog`]
//! 4. **Errors** mapped to status codes by [`AppError`]
//!
//! # Example
//!
//! ```ignore
//! use fanclub_web::{AppState, build_router};
//!
//! let state = AppState::new(env, identity_provider);
//! let app = build_router(state);
//! axum::serve(listener, app).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod config;
pub mod error;
pub mod extractors;
pub mod health;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::AppError;
pub use extractors::{BearerToken, CorrelationId, CurrentUser, MaybeUser};
pub use middleware::{CORRELATION_ID_HEADER, CorrelationIdExt, correlation_id_layer};
pub use routes::build_router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
