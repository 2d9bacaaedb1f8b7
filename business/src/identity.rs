//! Identity provider abstraction.
//!
//! Provider errors are opaque to the user. [`AuthFailure`] is what the UI renders:
//! a fixed message per failure kind, never the provider's own text.

use std::future::Future;

use serde::{Deserialize, Serialize};

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
}

/// External identity provider.
pub trait IdentityProvider: Clone + Send + Sync + 'static {
    /// The session restored from a previous sign-in, if any.
    fn current(&self) -> impl Future<Output = Result<Option<Identity>, AuthError>> + Send;

    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Identity, AuthError>> + Send;

    fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Identity, AuthError>> + Send;

    fn sign_out(&self) -> impl Future<Output = Result<(), AuthError>> + Send;

    fn send_password_reset(&self, email: &str)
    -> impl Future<Output = Result<(), AuthError>> + Send;
}

/// Error type reported by identity providers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email already in use")]
    EmailInUse,

    #[error("Unknown email: {0}")]
    UnknownEmail(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Identity provider error: {0}")]
    Provider(String),
}

/// Which authentication action failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOperation {
    SignIn,
    SignUp,
    SignOut,
    PasswordReset,
}

/// User-facing authentication failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    InvalidCredentials,
    EmailInUse,
    InvalidInput,
    ResetFailed,
    SignOutFailed,
    Unavailable,
}

impl AuthFailure {
    pub fn from_error(operation: AuthOperation, error: &AuthError) -> Self {
        match (operation, error) {
            (AuthOperation::PasswordReset, _) => Self::ResetFailed,
            (AuthOperation::SignOut, _) => Self::SignOutFailed,
            (_, AuthError::InvalidCredentials | AuthError::UnknownEmail(_)) => {
                Self::InvalidCredentials
            }
            (_, AuthError::EmailInUse) => Self::EmailInUse,
            (_, AuthError::InvalidInput(_)) => Self::InvalidInput,
            (_, AuthError::Network(_) | AuthError::Provider(_)) => Self::Unavailable,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::InvalidCredentials => "Incorrect email or password.",
            Self::EmailInUse => "An account with this email already exists.",
            Self::InvalidInput => "Please enter a valid email and a password of at least 6 characters.",
            Self::ResetFailed => "Could not send the password reset email.",
            Self::SignOutFailed => "Could not sign out. Please try again.",
            Self::Unavailable => "Something went wrong. Please try again.",
        }
    }
}

impl std::fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}
