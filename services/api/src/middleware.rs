//! Middleware for JWT token validation and authentication
//!
//! Derives a request-scoped authenticated identity from the bearer header
//! and exposes the guard that protects routes behind it. The derived value
//! travels in the request extensions, never in shared state.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use regex::Regex;
use std::sync::OnceLock;

use crate::{error::ApiError, login::Authenticator, state::AppState};

/// Authenticated user information derived from a verified token
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
}

fn bearer_regex() -> &'static Regex {
    static BEARER_REGEX: OnceLock<Regex> = OnceLock::new();
    BEARER_REGEX
        .get_or_init(|| Regex::new(r"^Bearer\s+(.+)$").expect("Failed to compile bearer regex"))
}

/// Derive the authenticated identity for a request, if any
///
/// Absent header, a header not matching the literal `Bearer <token>` shape,
/// and any token that fails verification all yield `None`. Pure with respect
/// to its input; safe to call on every request regardless of route.
pub fn authenticate<A: Authenticator>(auth: &A, authorization: Option<&str>) -> Option<AuthUser> {
    let header = authorization?;

    let captures = bearer_regex().captures(header)?;
    let token = captures.get(1)?.as_str();

    let claims = auth.verify_token(token)?;

    Some(AuthUser {
        user_id: claims.user_id,
        username: claims.username,
    })
}

/// Guard for protected routes
///
/// Responds 401 without invoking the handler when no identity can be
/// derived; otherwise attaches the identity to the request extensions for
/// read access downstream.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let authorization = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok());

    let user = authenticate(&state.jwt_service, authorization).ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
