//! Signed tokens issued by the service.
//!
//! All tokens are HS256 JWTs signed with `JWT_SECRET`:
//! - session tokens authenticate API calls and carry a `jti` for revocation,
//! - reset tokens authorize a single password change,
//! - download tokens name a blob path and never expire.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer claim on every token.
pub const ISSUER: &str = "cabinet";

/// Session lifetime: 7 days.
pub const SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Password reset token lifetime: 30 minutes.
pub const RESET_TTL_SECS: i64 = 30 * 60;

const RESET_PURPOSE: &str = "reset";
const DOWNLOAD_PURPOSE: &str = "download";

/// Claims of a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id.
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    /// Unique token id, used for revocation.
    pub jti: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ResetClaims {
    sub: String,
    purpose: String,
    iat: i64,
    exp: i64,
    iss: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DownloadClaims {
    path: String,
    purpose: String,
    iat: i64,
    iss: String,
}

/// Error type for token operations.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Invalid token issuer")]
    InvalidIssuer,

    #[error("Token is not valid for this operation")]
    WrongPurpose,

    #[error("Token validation failed: {0}")]
    Invalid(String),

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match e.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidIssuer => Self::InvalidIssuer,
            _ => Self::Invalid(e.to_string()),
        }
    }
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

fn sign<T: Serialize>(claims: &T, secret: &str) -> Result<String, TokenError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| TokenError::Signing(e.to_string()))
}

fn validation(expires: bool) -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = expires;
    if expires {
        validation.set_required_spec_claims(&["exp", "iss"]);
    } else {
        validation.set_required_spec_claims(&["iss"]);
    }
    validation
}

/// Issues a session token for a signed-in user.
pub fn issue_session_token(
    user_id: &str,
    email: &str,
    secret: &str,
) -> Result<(String, SessionClaims), TokenError> {
    let iat = now_secs();
    let claims = SessionClaims {
        sub: user_id.to_owned(),
        email: email.to_owned(),
        iat,
        exp: iat + SESSION_TTL_SECS,
        iss: ISSUER.to_owned(),
        jti: Uuid::new_v4().to_string(),
    };
    let token = sign(&claims, secret)?;
    Ok((token, claims))
}

pub fn verify_session_token(token: &str, secret: &str) -> Result<SessionClaims, TokenError> {
    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation(true),
    )?;
    Ok(data.claims)
}

/// Issues a short-lived token that allows `user_id` to set a new password.
pub fn issue_reset_token(user_id: &str, secret: &str) -> Result<String, TokenError> {
    let iat = now_secs();
    sign(
        &ResetClaims {
            sub: user_id.to_owned(),
            purpose: RESET_PURPOSE.to_owned(),
            iat,
            exp: iat + RESET_TTL_SECS,
            iss: ISSUER.to_owned(),
        },
        secret,
    )
}

/// Returns the user id a reset token was issued for.
pub fn verify_reset_token(token: &str, secret: &str) -> Result<String, TokenError> {
    let data = decode::<ResetClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation(true),
    )?;
    if data.claims.purpose != RESET_PURPOSE {
        return Err(TokenError::WrongPurpose);
    }
    Ok(data.claims.sub)
}

/// Issues a non-expiring token naming a blob path.
pub fn issue_download_token(path: &str, secret: &str) -> Result<String, TokenError> {
    sign(
        &DownloadClaims {
            path: path.to_owned(),
            purpose: DOWNLOAD_PURPOSE.to_owned(),
            iat: now_secs(),
            iss: ISSUER.to_owned(),
        },
        secret,
    )
}

/// Returns the blob path a download token names.
pub fn verify_download_token(token: &str, secret: &str) -> Result<String, TokenError> {
    let data = decode::<DownloadClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation(false),
    )?;
    if data.claims.purpose != DOWNLOAD_PURPOSE {
        return Err(TokenError::WrongPurpose);
    }
    Ok(data.claims.path)
}
