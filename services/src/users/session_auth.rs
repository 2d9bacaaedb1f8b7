//! Session JWT authentication for protected routes.
//!
//! `RequireAuth` reads `Authorization: Bearer <token>`, validates the token with the
//! configured secret and rejects it if its `jti` was revoked by a sign-out.
//!
//! ```rust,ignore
//! async fn handler(auth: RequireAuth) -> impl IntoResponse {
//!     format!("Hello, {}!", auth.email())
//! }
//! ```

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use uuid::Uuid;

use super::revocation_cache::RevocationCache;
use super::tokens::{SessionClaims, verify_session_token};
use crate::config::Config;

/// Authenticated caller, taken from a valid session token.
#[derive(Debug, Clone)]
pub struct RequireAuth {
    user_id: Uuid,
    claims: SessionClaims,
}

impl RequireAuth {
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn email(&self) -> &str {
        &self.claims.email
    }

    pub fn claims(&self) -> &SessionClaims {
        &self.claims
    }

    /// Prefix under which the caller's blobs must live.
    pub fn blob_prefix(&self) -> String {
        cabinet_business::user_prefix(&self.user_id.to_string())
    }
}

/// Rejection for requests without a usable session.
#[derive(Debug, Serialize)]
pub struct SessionAuthError {
    pub error: String,
    pub message: String,
}

impl SessionAuthError {
    fn missing_token() -> Self {
        Self {
            error: "missing_token".to_string(),
            message: "Authorization header with Bearer token is required".to_string(),
        }
    }

    fn invalid_format() -> Self {
        Self {
            error: "invalid_format".to_string(),
            message: "Authorization header must be in format: Bearer <token>".to_string(),
        }
    }

    fn invalid_token(reason: impl Into<String>) -> Self {
        Self {
            error: "invalid_token".to_string(),
            message: reason.into(),
        }
    }

    fn revoked() -> Self {
        Self {
            error: "token_revoked".to_string(),
            message: "Session has been signed out".to_string(),
        }
    }

    fn missing_config() -> Self {
        Self {
            error: "server_error".to_string(),
            message: "Server configuration error".to_string(),
        }
    }
}

impl IntoResponse for SessionAuthError {
    fn into_response(self) -> Response {
        let status = if self.error == "server_error" {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::UNAUTHORIZED
        };
        (status, Json(self)).into_response()
    }
}

/// Extract the Bearer token from the Authorization header.
pub(crate) fn extract_bearer_token(headers: &axum::http::HeaderMap) -> Option<&str> {
    let header_value = headers.get(AUTHORIZATION)?;
    let header_str = header_value.to_str().ok()?;

    let stripped = header_str.strip_prefix("Bearer ")?;
    if stripped.is_empty() {
        return None;
    }
    Some(stripped)
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = SessionAuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let config = parts
            .extensions
            .get::<Config>()
            .ok_or_else(SessionAuthError::missing_config)?;
        let revocations = parts
            .extensions
            .get::<RevocationCache>()
            .ok_or_else(SessionAuthError::missing_config)?;

        let token = extract_bearer_token(&parts.headers).ok_or_else(|| {
            if parts.headers.get(AUTHORIZATION).is_some() {
                SessionAuthError::invalid_format()
            } else {
                SessionAuthError::missing_token()
            }
        })?;

        let claims = verify_session_token(token, config.jwt_secret())
            .map_err(|e| SessionAuthError::invalid_token(e.to_string()))?;

        if revocations.is_revoked(&claims.jti) {
            return Err(SessionAuthError::revoked());
        }

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| SessionAuthError::invalid_token("Invalid token subject"))?;

        Ok(RequireAuth { user_id, claims })
    }
}
