//! Account management.
//!
//! - Email/password sign-up and sign-in issuing session JWTs
//! - Sign-out by revoking the session's token id
//! - Password reset through signed, short-lived reset tokens
//! - Storage abstraction for account data

pub mod mailer;
pub mod password;
pub mod revocation_cache;
pub mod routes;
pub mod session_auth;
pub mod storage;
pub mod tokens;

pub use mailer::{LogMailer, MailerError, RecordingMailer, ResetMailer};
pub use revocation_cache::RevocationCache;
pub use routes::{
    CredentialsRequest, ErrorResponse, IdentityResponse, PasswordResetConfirmRequest,
    PasswordResetRequest, SessionResponse, auth_routes,
};
pub use session_auth::{RequireAuth, SessionAuthError};
pub use storage::{MockUserStorage, PgUserStorage, StoredUser, UserStorage, UserStorageError};
