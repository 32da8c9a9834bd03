//! Custom Axum extractors.
//!
//! - `CorrelationId`: the request's correlation ID
//! - `BearerToken`: the raw token from `Authorization: Bearer <token>`
//! - `CurrentUser`: the authenticated identity (401 otherwise)
//! - `MaybeUser`: the identity when a valid token is presented, `None` otherwise
//! - `ApiJson`, `ApiPath`, `ApiQuery`: Axum's extractors with rejections rendered as
//!   [`AppError`] bodies
//!
//! ```ignore
//! async fn purchase(
//!     State(state): State<AppState>,
//!     CurrentUser(identity): CurrentUser,
//!     Path(id): Path<Uuid>,
//!     Json(body): Json<PurchaseBody>,
//! ) -> Result<(StatusCode, Json<Ticket>), AppError> { ... }
//! ```

use crate::error::AppError;
use crate::middleware::{CORRELATION_ID_HEADER, CorrelationIdExt};
use crate::state::AppState;
use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use fanclub_core::Identity;
use uuid::Uuid;

/// Correlation ID for request tracing.
///
/// Prefers the ID stored by the correlation middleware, then the `X-Correlation-ID`
/// header, and generates a new UUID v4 otherwise.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let correlation_id = parts.extensions.correlation_id().unwrap_or_else(|| {
            parts
                .headers
                .get(CORRELATION_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| Uuid::parse_str(s).ok())
                .unwrap_or_else(Uuid::new_v4)
        });

        Ok(Self(correlation_id))
    }
}

/// Bearer token from the `Authorization` header.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl BearerToken {
    fn from_parts(parts: &Parts) -> Result<Option<Self>, AppError> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(None);
        };

        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or_else(|| {
                AppError::unauthorized("Invalid authorization format. Expected 'Bearer <token>'")
            })?;

        if token.is_empty() {
            return Err(AppError::unauthorized("Empty bearer token"));
        }

        Ok(Some(Self(token.to_string())))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_parts(parts)?
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))
    }
}

async fn resolve(state: &AppState, token: &BearerToken) -> Result<Identity, AppError> {
    let identity = state
        .identity
        .authenticate(&token.0)
        .await
        .map_err(AppError::from)?;

    identity.ok_or_else(|| {
        tracing::debug!("Unknown bearer token");
        AppError::unauthorized("Invalid or expired token")
    })
}

/// The authenticated caller.
///
/// Rejects with 401 when no token is presented or the token is unknown.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = BearerToken::from_request_parts(parts, state).await?;
        let identity = resolve(state, &token).await?;
        Ok(Self(identity))
    }
}

/// The caller if they presented a token, anonymous otherwise.
///
/// A malformed or unknown token is still rejected with 401 rather than silently
/// downgraded to anonymous.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<Identity>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match BearerToken::from_parts(parts)? {
            Some(token) => Ok(Self(Some(resolve(state, &token).await?))),
            None => Ok(Self(None)),
        }
    }
}

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// Query string parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};

    fn parts(request: Request<()>) -> Parts {
        request.into_parts().0
    }

    #[tokio::test]
    async fn test_correlation_id_from_header() {
        let uuid = Uuid::new_v4();
        let mut parts = parts(
            Request::builder()
                .header(CORRELATION_ID_HEADER, uuid.to_string())
                .body(())
                .expect("Valid request"),
        );

        let correlation_id = CorrelationId::from_request_parts(&mut parts, &())
            .await
            .expect("Should extract");

        assert_eq!(correlation_id.0, uuid);
    }

    #[tokio::test]
    async fn test_correlation_id_prefers_middleware_value() {
        let stored = Uuid::new_v4();
        let mut parts = parts(
            Request::builder()
                .header(CORRELATION_ID_HEADER, Uuid::new_v4().to_string())
                .body(())
                .expect("Valid request"),
        );
        parts.extensions.insert(stored);

        let correlation_id = CorrelationId::from_request_parts(&mut parts, &())
            .await
            .expect("Should extract");

        assert_eq!(correlation_id.0, stored);
    }

    #[tokio::test]
    async fn test_bearer_token_extracted() {
        let mut parts = parts(
            Request::builder()
                .header(AUTHORIZATION, "Bearer abc123")
                .body(())
                .expect("Valid request"),
        );

        let token = BearerToken::from_request_parts(&mut parts, &())
            .await
            .expect("Should extract");

        assert_eq!(token.0, "abc123");
    }

    #[tokio::test]
    async fn test_bearer_token_missing_is_unauthorized() {
        let mut parts = parts(Request::builder().body(()).expect("Valid request"));

        let err = BearerToken::from_request_parts(&mut parts, &())
            .await
            .expect_err("Should reject");

        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_bearer_token_wrong_scheme_is_unauthorized() {
        let mut parts = parts(
            Request::builder()
                .header(AUTHORIZATION, "Basic dXNlcjpwYXNz")
                .body(())
                .expect("Valid request"),
        );

        let err = BearerToken::from_request_parts(&mut parts, &())
            .await
            .expect_err("Should reject");

        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_bearer_token_empty_is_unauthorized() {
        let mut parts = parts(
            Request::builder()
                .header(AUTHORIZATION, "Bearer ")
                .body(())
                .expect("Valid request"),
        );

        let err = BearerToken::from_request_parts(&mut parts, &())
            .await
            .expect_err("Should reject");

        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }
}
