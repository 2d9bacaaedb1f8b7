//! File records and upload inputs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::category::{FileCategory, classify};

/// A stored file as recorded in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedFile {
    /// Identifier assigned by the catalog.
    pub id: String,
    /// Original file name, not unique.
    pub name: String,
    pub category: FileCategory,
    /// Size in bytes.
    pub size: u64,
    /// Download address resolved at upload time.
    pub url: String,
    /// Owner of the record.
    pub user_id: String,
    /// Location of the blob in the object store. Never shown to the user.
    pub storage_path: String,
}

impl ManagedFile {
    /// Returns a human-readable size string.
    pub fn size_display(&self) -> String {
        if self.size < 1024 {
            format!("{} B", self.size)
        } else if self.size < 1024 * 1024 {
            format!("{:.1} KB", self.size as f64 / 1024.0)
        } else if self.size < 1024 * 1024 * 1024 {
            format!("{:.1} MB", self.size as f64 / (1024.0 * 1024.0))
        } else {
            format!("{:.2} GB", self.size as f64 / (1024.0 * 1024.0 * 1024.0))
        }
    }
}

/// A catalog record before the catalog assigns its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFileRecord {
    pub name: String,
    pub category: FileCategory,
    pub size: u64,
    pub url: String,
    pub user_id: String,
    pub storage_path: String,
}

impl NewFileRecord {
    pub fn with_id(self, id: impl Into<String>) -> ManagedFile {
        ManagedFile {
            id: id.into(),
            name: self.name,
            category: self.category,
            size: self.size,
            url: self.url,
            user_id: self.user_id,
            storage_path: self.storage_path,
        }
    }
}

/// A local file handed to the orchestrator for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn category(&self) -> FileCategory {
        classify(&self.content_type)
    }
}

/// Builds the object-store location for a new upload.
///
/// The random prefix keeps concurrently uploaded files with the same name apart.
pub fn storage_path(user_id: &str, random_id: &str, original_name: &str) -> String {
    format!("files/{user_id}/{random_id}-{original_name}")
}

/// Fresh random identifier for [`storage_path`].
pub fn random_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Prefix under which all of a user's blobs live.
pub fn user_prefix(user_id: &str) -> String {
    format!("files/{user_id}/")
}
