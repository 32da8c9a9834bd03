//! Identity provider interface and server-side authorization checks.
//!
//! The ledger never authenticates anyone. It receives an [`Identity`] resolved by the
//! transport layer for each request and only checks the role it carries.

use crate::error::{LedgerError, StoreError};
use crate::types::{Buyer, MemberId};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// Role of an authenticated member.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular fan club member
    Member,
    /// Administrator (catalog management, draws, reports)
    Admin,
}

impl Role {
    /// Database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Admin => "admin",
        }
    }

    /// Parse from the database string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "member" => Some(Self::Member),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// An authenticated caller, scoped to a single request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Member ID
    pub member_id: MemberId,
    /// Email address
    pub email: String,
    /// Display name
    pub full_name: String,
    /// Role
    pub role: Role,
}

impl Identity {
    /// Whether this identity is an administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Require the admin role.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Forbidden`] for non-admins.
    pub fn require_admin(&self) -> Result<(), LedgerError> {
        if self.is_admin() {
            Ok(())
        } else {
            tracing::warn!(member_id = %self.member_id, "Admin operation rejected");
            Err(LedgerError::Forbidden { required: "admin" })
        }
    }

    /// The buyer record stamped on tickets bought by this identity.
    #[must_use]
    pub fn as_buyer(&self) -> Buyer {
        Buyer {
            member_id: self.member_id,
            email: self.email.clone(),
            full_name: self.full_name.clone(),
        }
    }
}

/// Resolves bearer credentials to identities.
///
/// Uses boxed futures so it can be shared as `Arc<dyn IdentityProvider>`.
pub trait IdentityProvider: Send + Sync {
    /// Resolve a bearer token.
    ///
    /// Returns `Ok(None)` for unknown tokens.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the backing store is unreachable.
    fn authenticate(
        &self,
        token: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Identity>, StoreError>> + Send + '_>>;
}
