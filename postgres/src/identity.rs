//! Bearer-token identity provider backed by the `members` table.

use crate::rows::database_error;
use fanclub_core::{Identity, IdentityProvider, MemberId, Role, StoreError};
use sha2::{Digest, Sha256};
use sqlx::Row;
use sqlx::postgres::PgPool;
use std::future::Future;
use std::pin::Pin;
use tracing::debug;
use uuid::Uuid;

/// Lowercase hex SHA-256 digest of an API token, as stored in `members.api_token_hash`.
#[must_use]
pub fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// Resolves API tokens to member identities.
#[derive(Clone, Debug)]
pub struct PostgresIdentityProvider {
    pool: PgPool,
}

impl PostgresIdentityProvider {
    /// Create a provider over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a member with an API token, or rotate the token and profile of an
    /// existing member with the same email.
    ///
    /// Only the token's digest is stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the write fails.
    pub async fn register(&self, identity: &Identity, token: &str) -> Result<(), StoreError> {
        sqlx::query(
            r"
            INSERT INTO members (id, email, full_name, role, api_token_hash)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (email) DO UPDATE
            SET full_name = EXCLUDED.full_name,
                role = EXCLUDED.role,
                api_token_hash = EXCLUDED.api_token_hash
            ",
        )
        .bind(identity.member_id.as_uuid())
        .bind(&identity.email)
        .bind(&identity.full_name)
        .bind(identity.role.as_str())
        .bind(hash_token(token))
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        debug!(member_id = %identity.member_id, role = identity.role.as_str(), "Member registered");
        Ok(())
    }
}

impl IdentityProvider for PostgresIdentityProvider {
    fn authenticate(
        &self,
        token: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Identity>, StoreError>> + Send + '_>> {
        let token_hash = (!token.is_empty()).then(|| hash_token(token));

        Box::pin(async move {
            let Some(token_hash) = token_hash else {
                return Ok(None);
            };

            let row = sqlx::query(
                "SELECT id, email, full_name, role FROM members WHERE api_token_hash = $1",
            )
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

            let Some(row) = row else {
                return Ok(None);
            };

            let decode = |e: sqlx::Error| StoreError::Serialization(e.to_string());
            let role: String = row.try_get("role").map_err(decode)?;
            let role = Role::parse(&role)
                .ok_or_else(|| StoreError::Serialization(format!("invalid role: {role}")))?;

            Ok(Some(Identity {
                member_id: MemberId::from_uuid(row.try_get::<Uuid, _>("id").map_err(decode)?),
                email: row.try_get("email").map_err(decode)?,
                full_name: row.try_get("full_name").map_err(decode)?,
                role,
            }))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_digest_is_lowercase_hex_sha256() {
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(hash_token("secret").len(), 64);
        assert_ne!(hash_token("secret"), hash_token("Secret"));
    }
}
