//! User-facing notices.

use crate::identity::AuthFailure;

/// A message to show the user after a failed operation.
///
/// Messages are fixed per variant. Underlying errors go to the log only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    ListFailed,
    UploadFailed { name: String },
    DeleteFailed { name: String },
    Auth(AuthFailure),
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ListFailed => f.write_str("Could not load your files."),
            Self::UploadFailed { name } => write!(f, "Upload failed for {name}."),
            Self::DeleteFailed { name } => write!(f, "Could not delete {name}."),
            Self::Auth(failure) => f.write_str(failure.message()),
        }
    }
}

impl From<AuthFailure> for Notice {
    fn from(failure: AuthFailure) -> Self {
        Self::Auth(failure)
    }
}
