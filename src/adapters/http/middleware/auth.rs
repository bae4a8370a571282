//! Authentication middleware and extractors for axum.
//!
//! This module provides:
//! - `auth_middleware` - Layer that resolves Bearer tokens and injects the `Identity`
//! - `RequireAuth` - Extractor that requires a resolved identity
//! - `bearer_token` - Header parsing shared with the WebSocket upgrade
//!
//! # Architecture
//!
//! The middleware delegates to the `IdentityResolver`, so HTTP requests and
//! WebSocket connections are admitted by the same token and account checks.
//!
//! ```text
//! Request → auth_middleware → injects Identity into extensions
//!                                      ↓
//!                              Handler → RequireAuth extractor reads from extensions
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::handlers::messaging::IdentityResolver;
use crate::domain::foundation::Identity;

/// Auth middleware state - wraps the identity resolver.
pub type AuthState = Arc<IdentityResolver>;

/// Extracts the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Authentication middleware that resolves Bearer tokens.
///
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Resolves it through the `IdentityResolver`
/// 3. On success, injects `Identity` into request extensions
/// 4. On missing token, continues without injecting
/// 5. On a refused token, returns 401 Unauthorized
pub async fn auth_middleware(
    State(resolver): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = bearer_token(request.headers()).map(str::to_string);

    match token {
        Some(token) => match resolver.resolve(&token).await {
            Ok(identity) => {
                request.extensions_mut().insert(identity);
                next.run(request).await
            }
            Err(e) => (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({
                    "error": e.to_string(),
                    "code": e.code()
                })),
            )
                .into_response(),
        },
        // Handlers enforce authentication with RequireAuth.
        None => next.run(request).await,
    }
}

/// Extractor that requires authentication.
///
/// If the auth middleware did not inject an `Identity`, returns 401.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub Identity);

impl<S> axum::extract::FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            parts
                .extensions
                .get::<Identity>()
                .cloned()
                .map(RequireAuth)
                .ok_or(AuthRejection::Unauthenticated)
        })
    }
}

/// Rejection type for authentication failures.
#[derive(Debug, Clone)]
pub enum AuthRejection {
    /// No valid authentication token was provided.
    Unauthenticated,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthRejection::Unauthenticated => (StatusCode::UNAUTHORIZED, "Authentication required"),
        };

        (
            status,
            Json(serde_json::json!({
                "error": message,
                "code": "UNAUTHENTICATED"
            })),
        )
            .into_response()
    }
}
