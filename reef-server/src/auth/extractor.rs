//! Request identity extractors
//!
//! - [`CurrentUser`]: requires a valid JWT, rejects otherwise. Used by the
//!   order history endpoints.
//! - [`Caller`]: resolves the request identity once: an authenticated user
//!   when a bearer token is present, otherwise an anonymous session handle
//!   from the `X-Session-Id` header. Cart and checkout handlers take a
//!   `Caller` instead of reading any ambient auth state.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;
use shared::AppError;

/// Header carrying the anonymous cart session id.
pub const SESSION_HEADER: &str = "x-session-id";

/// Request identity: authenticated user or anonymous session.
#[derive(Debug, Clone)]
pub enum Caller {
    /// Authenticated via JWT
    User(CurrentUser),
    /// Anonymous; `session` is the caller-provided session id, if any.
    /// A handler that needs to write allocates a fresh session lazily.
    Guest { session: Option<String> },
}

impl Caller {
    /// The session id for an anonymous caller, if one was provided.
    pub fn session_id(&self) -> Option<&str> {
        match self {
            Caller::Guest { session } => session.as_deref(),
            Caller::User(_) => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Caller::User(_))
    }
}

fn validate_bearer(state: &ServerState, parts: &Parts, header: &str) -> Result<CurrentUser, AppError> {
    let token = JwtService::extract_from_header(header)
        .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?;

    match state.get_jwt_service().validate_token(token) {
        Ok(claims) => Ok(CurrentUser::from(claims)),
        Err(e) => {
            tracing::warn!(
                target: "security",
                error = %e,
                uri = %parts.uri,
                "auth_failed"
            );
            match e {
                crate::auth::JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

/// JWT Auth Extractor
///
/// Use this extractor in protected handlers to automatically validate JWT
/// and extract CurrentUser
impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        // Check if already extracted
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let auth_header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let header = match auth_header {
            Some(h) => h,
            None => {
                tracing::warn!(target: "security", uri = %parts.uri, "auth_missing");
                return Err(AppError::unauthorized());
            }
        };

        let user = validate_bearer(state, parts, header)?;

        // Store in extensions for potential reuse
        parts.extensions.insert(user.clone());

        Ok(user)
    }
}

/// Caller extractor: bearer token wins, then the session header.
///
/// A present-but-invalid token is rejected rather than silently downgraded
/// to a guest.
impl FromRequestParts<ServerState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        if let Some(header) = auth_header {
            let user = validate_bearer(state, parts, header)?;
            parts.extensions.insert(user.clone());
            return Ok(Caller::User(user));
        }

        let session = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|h| h.to_str().ok())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        Ok(Caller::Guest { session })
    }
}
