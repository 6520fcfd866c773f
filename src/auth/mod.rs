//! Authentication middleware and per-case access guard.
//!
//! Requests authenticate with either a browser session cookie or an API token
//! (bearer or `x-api-key`). The credential used determines the request origin,
//! which handlers consult instead of sniffing cookies: session edits skip the
//! room echo of their own save, machine edits do not. Token comparison is
//! constant-time to mitigate timing attacks.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use subtle::ConstantTimeEq;

use crate::errors::{AppError, ErrorResponse};
use crate::models::{AccessLevel, User};
use crate::AppState;

/// Header name for the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Name of the browser session cookie.
pub const SESSION_COOKIE: &str = "session";

/// How a request authenticated; the typed replacement for cookie sniffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOrigin {
    /// Authenticated browser session
    Browser,
    /// Machine client holding an API token
    Api,
}

/// The authenticated caller, resolved once per request.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user: User,
    pub origin: RequestOrigin,
}

/// Authentication layer for the HTTP API: resolves an [`Identity`] and stores
/// it in request extensions, or rejects with 401.
pub async fn auth_layer(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    match resolve_identity(&state, request.headers()).await {
        Ok(Some(identity)) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Ok(None) => unauthorized_response("Authentication required"),
        Err(err) => err.into_response(),
    }
}

/// Resolve the caller from request headers, if any credential checks out.
///
/// Also used by the collaboration channel, where a missing identity is
/// swallowed rather than rejected.
pub async fn resolve_identity(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<Identity>, AppError> {
    // Browser session cookie first: its presence marks an interactive session.
    if let Some(token) = session_cookie(headers) {
        if let Some(user) = state.repo.user_by_session(&token).await? {
            return Ok(Some(Identity {
                user,
                origin: RequestOrigin::Browser,
            }));
        }
    }

    // Fall back to API tokens (bearer or x-api-key).
    if let Some(provided) = api_token(headers) {
        for user in state.repo.users_with_api_keys().await? {
            let matches = user
                .api_key
                .as_deref()
                .map(|key| constant_time_compare(&provided, key))
                .unwrap_or(false);
            if matches {
                return Ok(Some(Identity {
                    user,
                    origin: RequestOrigin::Api,
                }));
            }
        }
    }

    Ok(None)
}

/// Require `level` access on a case, erroring out otherwise.
pub async fn ensure_access(
    state: &AppState,
    identity: &Identity,
    case_id: i64,
    level: AccessLevel,
) -> Result<(), AppError> {
    let granted = state.repo.access_level(case_id, identity.user.id).await?;

    match granted {
        Some(held) if held.allows(level) => Ok(()),
        _ => {
            tracing::warn!(
                user = %identity.user.login,
                case_id,
                "access denied"
            );
            Err(AppError::Forbidden("Permission denied".to_string()))
        }
    }
}

/// Extract the session token from the Cookie header.
fn session_cookie(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

/// Extract an API token from `x-api-key` or a bearer Authorization header.
fn api_token(headers: &HeaderMap) -> Option<String> {
    if let Some(key) = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) {
        return Some(key.to_string());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Create an unauthorized response.
fn unauthorized_response(message: &str) -> Response {
    let body = ErrorResponse {
        status: "error".to_string(),
        message: message.to_string(),
        data: None,
    };

    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_constant_time_compare_equal() {
        assert!(constant_time_compare("test-key-123", "test-key-123"));
    }

    #[test]
    fn test_constant_time_compare_not_equal() {
        assert!(!constant_time_compare("test-key-123", "test-key-124"));
    }

    #[test]
    fn test_constant_time_compare_different_lengths() {
        assert!(!constant_time_compare("short", "much-longer-key"));
    }

    #[test]
    fn test_session_cookie_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=abc-123; lang=en"),
        );
        assert_eq!(session_cookie(&headers), Some("abc-123".to_string()));
    }

    #[test]
    fn test_session_cookie_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(session_cookie(&headers), None);
        assert_eq!(session_cookie(&HeaderMap::new()), None);
    }

    #[test]
    fn test_api_token_prefers_api_key_header() {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static("key-1"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer key-2"));
        assert_eq!(api_token(&headers), Some("key-1".to_string()));
    }

    #[test]
    fn test_api_token_bearer_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer key-2"));
        assert_eq!(api_token(&headers), Some("key-2".to_string()));
    }
}
