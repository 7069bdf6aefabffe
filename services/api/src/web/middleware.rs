//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use article_quiz_core::ports::PortError;
use std::sync::Arc;
use tracing::{error, warn};

use crate::web::state::AppState;

/// The cookie the identity provider stores its session token in.
pub const SESSION_COOKIE: &str = "__session";

/// Middleware that verifies the identity-provider session and resolves the internal user.
///
/// The token is read from `Authorization: Bearer ...` or the session cookie. If valid,
/// the resolved `User` is inserted into request extensions for handlers to use.
/// If missing or invalid, returns 401 Unauthorized; a failing user store returns 500.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = session_token(req.headers()).ok_or(StatusCode::UNAUTHORIZED)?;

    let verifier = state.identity.as_ref().ok_or_else(|| {
        warn!("Rejecting request: no session-token key is configured");
        StatusCode::UNAUTHORIZED
    })?;

    let identity = verifier
        .verify_session_token(&token)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let user = state
        .users
        .resolve_user(&identity)
        .await
        .map_err(|e| match e {
            PortError::Unauthorized => {
                warn!("No email known for {}, rejecting", identity.external_id);
                StatusCode::UNAUTHORIZED
            }
            other => {
                error!("Failed to resolve user {}: {:?}", identity.external_id, other);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        })?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Extracts the session token from the request headers.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    cookie_header
        .split(';')
        .find_map(|c| c.trim().strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(header::COOKIE, HeaderValue::from_static("__session=def"));
        assert_eq!(session_token(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn session_cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; __session=def; __session_other=x"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("def"));
    }

    #[test]
    fn no_token_is_none() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("__session="));
        assert_eq!(session_token(&headers), None);
    }
}
