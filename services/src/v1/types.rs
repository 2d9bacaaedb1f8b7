//! Shared types for V1 API endpoints.

use cabinet_business::ManagedFile;
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogStorageError;

/// Generic error response for V1 API.
#[derive(Debug, Serialize, Deserialize)]
pub struct V1ErrorResponse {
    pub error: String,
    pub message: String,
}

impl V1ErrorResponse {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            error: "not_found".to_string(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            error: "bad_request".to_string(),
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self {
            error: "internal_error".to_string(),
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            error: "forbidden".to_string(),
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            error: "conflict".to_string(),
            message: message.into(),
        }
    }
}

impl From<&CatalogStorageError> for V1ErrorResponse {
    fn from(err: &CatalogStorageError) -> Self {
        match err {
            CatalogStorageError::Conflict(_) => Self::conflict(err.to_string()),
            CatalogStorageError::InvalidRecord(_) | CatalogStorageError::StorageError(_) => {
                Self::internal_error("Catalog is unavailable")
            }
        }
    }
}

/// Body of `GET /v1/files`.
#[derive(Debug, Serialize, Deserialize)]
pub struct V1FilesListResponse {
    pub files: Vec<ManagedFile>,
}

/// Body of `POST /v1/files`.
///
/// `category` stays a string so an unknown bucket is a 400 rather than a decode failure.
#[derive(Debug, Deserialize)]
pub struct V1FileCreateRequest {
    pub name: String,
    pub category: String,
    pub size: u64,
    pub url: String,
    pub user_id: String,
    pub storage_path: String,
}

/// Body of `POST /v1/blob-urls`.
#[derive(Debug, Deserialize)]
pub struct V1BlobUrlRequest {
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct V1BlobUrlResponse {
    pub url: String,
}
