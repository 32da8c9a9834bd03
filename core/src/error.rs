//! Error types for the ledger, the catalog service, and their storage collaborators.

use crate::types::{EventId, NotPurchasableReason, PaymentStatus};
use thiserror::Error;

/// Result type alias for ledger and catalog operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors reported by a [`CatalogStore`](crate::store::CatalogStore) or
/// [`IdentityProvider`](crate::identity::IdentityProvider).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The record does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind (e.g. "event")
        entity: &'static str,
        /// Record ID
        id: String,
    },

    /// A conditional update lost against a concurrent writer; nothing was written.
    #[error("Concurrent update conflict on {entity} {id}")]
    Conflict {
        /// Entity kind
        entity: &'static str,
        /// Record ID
        id: String,
    },

    /// A unique constraint rejected the write; nothing was written.
    #[error("Duplicate {entity} {field}")]
    Duplicate {
        /// Entity kind
        entity: &'static str,
        /// Field that must be unique
        field: &'static str,
    },

    /// Database connection or query error.
    #[error("Database error: {0}")]
    Database(String),

    /// A stored value could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Shorthand for [`StoreError::NotFound`].
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Shorthand for [`StoreError::Conflict`].
    #[must_use]
    pub fn conflict(entity: &'static str, id: impl ToString) -> Self {
        Self::Conflict {
            entity,
            id: id.to_string(),
        }
    }
}

/// Error taxonomy surfaced to callers of the ledger and catalog.
///
/// Every variant is terminal for the triggering request and implies no partial commit.
/// [`LedgerError::ConcurrentUpdateConflict`] is the only retryable case and is normally
/// absorbed by the ledger's retry loop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    // ═══════════════════════════════════════════════════════════
    // Purchase
    // ═══════════════════════════════════════════════════════════

    /// The purchase would push sold seats above capacity.
    #[error("Capacity exceeded: requested {requested}, available {available}")]
    CapacityExceeded {
        /// Seats requested
        requested: u32,
        /// Seats left at the time of the check
        available: u32,
    },

    /// The event is not active or its date has passed.
    #[error("Event {event_id} is not purchasable: {reason}")]
    EventNotPurchasable {
        /// Event ID
        event_id: EventId,
        /// Why
        reason: NotPurchasableReason,
    },

    /// Quantity must be at least one.
    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    // ═══════════════════════════════════════════════════════════
    // Raffle
    // ═══════════════════════════════════════════════════════════

    /// No paid, eligible ticket exists for the raffle's event.
    #[error("No eligible participants for this raffle")]
    NoEligibleParticipants,

    /// The raffle has already been drawn.
    #[error("Raffle has already been drawn")]
    AlreadyDrawn,

    // ═══════════════════════════════════════════════════════════
    // Concurrency
    // ═══════════════════════════════════════════════════════════

    /// A concurrent writer won the conditional update. Retried internally.
    #[error("Concurrent update conflict")]
    ConcurrentUpdateConflict,

    /// Conflicts persisted through every retry.
    #[error("Transient failure after {attempts} attempts, please retry")]
    TransientFailure {
        /// Attempts made
        attempts: usize,
    },

    // ═══════════════════════════════════════════════════════════
    // Access & validation
    // ═══════════════════════════════════════════════════════════

    /// Requested record not found.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind
        entity: &'static str,
        /// Record ID
        id: String,
    },

    /// No identity was presented.
    #[error("Authentication required")]
    Unauthenticated,

    /// The identity lacks the required role.
    #[error("Insufficient permissions: {required}")]
    Forbidden {
        /// Role that was required
        required: &'static str,
    },

    /// Input failed validation.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Payment status change not allowed.
    #[error("Cannot change payment status from {from} to {to}")]
    InvalidStatusTransition {
        /// Current status
        from: PaymentStatus,
        /// Requested status
        to: PaymentStatus,
    },

    // ═══════════════════════════════════════════════════════════
    // Infrastructure
    // ═══════════════════════════════════════════════════════════

    /// Storage failure.
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl LedgerError {
    /// Whether the operation may succeed if retried transparently.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentUpdateConflict)
    }

    /// Shorthand for [`LedgerError::NotFound`].
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => Self::NotFound { entity, id },
            StoreError::Conflict { .. } => Self::ConcurrentUpdateConflict,
            other => Self::Store(other),
        }
    }
}
