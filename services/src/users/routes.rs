//! Authentication endpoints under `/auth`.

use axum::{
    Json, Router,
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::password::{MIN_PASSWORD_LEN, PasswordError, hash_password, verify_password};
use super::revocation_cache::RevocationCache;
use super::session_auth::RequireAuth;
use super::storage::{StoredUser, UserStorage, UserStorageError};
use super::tokens::{TokenError, issue_reset_token, issue_session_token, verify_reset_token};
use crate::AppState;
use crate::catalog::CatalogStorage;
use crate::config::Config;
use crate::database::SqlStorage;
use crate::storage::FileStorage;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub token: String,
    pub user_id: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IdentityResponse {
    pub user_id: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetConfirmRequest {
    pub token: String,
    pub new_password: String,
}

/// Error body for `/auth` endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    fn reply(status: StatusCode, error: &str, message: impl Into<String>) -> Response {
        (
            status,
            Json(Self {
                error: error.to_string(),
                message: message.into(),
            }),
        )
            .into_response()
    }
}

impl From<UserStorageError> for (StatusCode, Json<ErrorResponse>) {
    fn from(err: UserStorageError) -> Self {
        let (status, error_type) = match &err {
            UserStorageError::UserAlreadyExists(_) => (StatusCode::CONFLICT, "email_in_use"),
            UserStorageError::UserNotFound(_) => (StatusCode::NOT_FOUND, "user_not_found"),
            UserStorageError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
            UserStorageError::StorageError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "storage_error")
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: error_type.to_string(),
                message: err.to_string(),
            }),
        )
    }
}

impl From<TokenError> for (StatusCode, Json<ErrorResponse>) {
    fn from(err: TokenError) -> Self {
        let (status, error_type) = match &err {
            TokenError::Signing(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            _ => (StatusCode::UNAUTHORIZED, "invalid_token"),
        };

        (
            status,
            Json(ErrorResponse {
                error: error_type.to_string(),
                message: err.to_string(),
            }),
        )
    }
}

impl From<PasswordError> for (StatusCode, Json<ErrorResponse>) {
    fn from(err: PasswordError) -> Self {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "internal_error".to_string(),
                message: err.to_string(),
            }),
        )
    }
}

fn into_response<E>(err: E) -> Response
where
    E: Into<(StatusCode, Json<ErrorResponse>)>,
{
    let (status, json): (StatusCode, Json<ErrorResponse>) = err.into();
    (status, json).into_response()
}

/// Trimmed, lowercased email if it looks like an address.
fn normalize_email(email: &str) -> Option<String> {
    let email = email.trim().to_lowercase();
    let (local, domain) = email.split_once('@')?;
    let valid = !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace);
    valid.then_some(email)
}

fn invalid_credentials() -> Response {
    ErrorResponse::reply(
        StatusCode::UNAUTHORIZED,
        "invalid_credentials",
        "Invalid email or password",
    )
}

fn session_response(user: &StoredUser, config: &Config) -> Result<SessionResponse, Response> {
    let user_id = user.id.to_string();
    let (token, _) =
        issue_session_token(&user_id, &user.email, config.jwt_secret()).map_err(into_response)?;
    Ok(SessionResponse {
        token,
        user_id,
        email: user.email.clone(),
    })
}

/// Creates the router for authentication endpoints.
pub fn auth_routes<S, U, C, F>() -> Router<AppState<S, U, C, F>>
where
    S: SqlStorage,
    U: UserStorage,
    C: CatalogStorage,
    F: FileStorage,
{
    Router::new()
        .route("/sign-up", post(sign_up::<S, U, C, F>))
        .route("/sign-in", post(sign_in::<S, U, C, F>))
        .route("/sign-out", post(sign_out))
        .route("/session", get(session))
        .route("/password-reset", post(password_reset::<S, U, C, F>))
        .route(
            "/password-reset/confirm",
            post(password_reset_confirm::<S, U, C, F>),
        )
}

/// `POST /auth/sign-up`
pub async fn sign_up<S, U, C, F>(
    State(state): State<AppState<S, U, C, F>>,
    Extension(config): Extension<Config>,
    Json(payload): Json<CredentialsRequest>,
) -> Response
where
    U: UserStorage,
{
    let Some(email) = normalize_email(&payload.email) else {
        return ErrorResponse::reply(
            StatusCode::BAD_REQUEST,
            "invalid_input",
            "A valid email address is required",
        );
    };
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return ErrorResponse::reply(
            StatusCode::BAD_REQUEST,
            "invalid_input",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        );
    }

    let password_hash = match hash_password(&payload.password) {
        Ok(hash) => hash,
        Err(e) => {
            error!("Failed to hash password: {}", e);
            return into_response(e);
        }
    };

    let user = match state.user_storage.create_user(&email, &password_hash).await {
        Ok(user) => user,
        Err(e) => {
            if !matches!(e, UserStorageError::UserAlreadyExists(_)) {
                error!("Failed to create user: {}", e);
            }
            return into_response(e);
        }
    };

    info!(user_id = %user.id, "Account created");

    match session_response(&user, &config) {
        Ok(body) => (StatusCode::CREATED, Json(body)).into_response(),
        Err(response) => response,
    }
}

/// `POST /auth/sign-in`
pub async fn sign_in<S, U, C, F>(
    State(state): State<AppState<S, U, C, F>>,
    Extension(config): Extension<Config>,
    Json(payload): Json<CredentialsRequest>,
) -> Response
where
    U: UserStorage,
{
    let Some(email) = normalize_email(&payload.email) else {
        return invalid_credentials();
    };

    let user = match state.user_storage.find_by_email(&email).await {
        Ok(Some(user)) => user,
        Ok(None) => return invalid_credentials(),
        Err(e) => {
            error!("Failed to look up user: {}", e);
            return into_response(e);
        }
    };

    match verify_password(&user.password_hash, &payload.password) {
        Ok(true) => {}
        Ok(false) => {
            warn!(user_id = %user.id, "Sign-in with wrong password");
            return invalid_credentials();
        }
        Err(e) => {
            error!(user_id = %user.id, "Stored password hash is unreadable: {}", e);
            return into_response(e);
        }
    }

    match session_response(&user, &config) {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(response) => response,
    }
}

/// `POST /auth/sign-out`
pub async fn sign_out(
    auth: RequireAuth,
    Extension(revocations): Extension<RevocationCache>,
) -> StatusCode {
    revocations.revoke(auth.claims().jti.clone());
    info!(user_id = %auth.user_id(), "Signed out");
    StatusCode::NO_CONTENT
}

/// `GET /auth/session`
pub async fn session(auth: RequireAuth) -> Json<IdentityResponse> {
    Json(IdentityResponse {
        user_id: auth.user_id().to_string(),
        email: auth.email().to_string(),
    })
}

/// `POST /auth/password-reset`
pub async fn password_reset<S, U, C, F>(
    State(state): State<AppState<S, U, C, F>>,
    Extension(config): Extension<Config>,
    Json(payload): Json<PasswordResetRequest>,
) -> Response
where
    U: UserStorage,
{
    let Some(email) = normalize_email(&payload.email) else {
        return ErrorResponse::reply(
            StatusCode::BAD_REQUEST,
            "invalid_input",
            "A valid email address is required",
        );
    };

    let user = match state.user_storage.find_by_email(&email).await {
        Ok(Some(user)) => user,
        Ok(None) => return into_response(UserStorageError::UserNotFound(email)),
        Err(e) => {
            error!("Failed to look up user: {}", e);
            return into_response(e);
        }
    };

    let token = match issue_reset_token(&user.id.to_string(), config.jwt_secret()) {
        Ok(token) => token,
        Err(e) => return into_response(e),
    };

    if let Err(e) = state.mailer.send_reset(&user.email, &token) {
        error!(user_id = %user.id, "{}", e);
        return ErrorResponse::reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            "mail_error",
            "Could not send the reset email",
        );
    }

    StatusCode::ACCEPTED.into_response()
}

/// `POST /auth/password-reset/confirm`
pub async fn password_reset_confirm<S, U, C, F>(
    State(state): State<AppState<S, U, C, F>>,
    Extension(config): Extension<Config>,
    Json(payload): Json<PasswordResetConfirmRequest>,
) -> Response
where
    U: UserStorage,
{
    let user_id = match verify_reset_token(&payload.token, config.jwt_secret()) {
        Ok(sub) => match Uuid::parse_str(&sub) {
            Ok(id) => id,
            Err(_) => return into_response(TokenError::Invalid("bad subject".to_string())),
        },
        Err(e) => return into_response(e),
    };

    if payload.new_password.chars().count() < MIN_PASSWORD_LEN {
        return ErrorResponse::reply(
            StatusCode::BAD_REQUEST,
            "invalid_input",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        );
    }

    let password_hash = match hash_password(&payload.new_password) {
        Ok(hash) => hash,
        Err(e) => return into_response(e),
    };

    match state.user_storage.update_password(user_id, &password_hash).await {
        Ok(true) => {
            info!(user_id = %user_id, "Password reset completed");
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(false) => into_response(TokenError::Invalid("unknown account".to_string())),
        Err(e) => {
            error!("Failed to update password: {}", e);
            into_response(e)
        }
    }
}
