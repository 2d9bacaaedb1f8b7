//! Catalog record types.

use cabinet_business::{FileCategory, ManagedFile};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A stored file-metadata record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub category: FileCategory,
    pub size: u64,
    pub url: String,
    pub storage_path: String,
    pub created_at: DateTime<Utc>,
}

impl From<FileRecord> for ManagedFile {
    fn from(record: FileRecord) -> Self {
        Self {
            id: record.id.to_string(),
            name: record.name,
            category: record.category,
            size: record.size,
            url: record.url,
            user_id: record.user_id.to_string(),
            storage_path: record.storage_path,
        }
    }
}

/// Input for a new record. The id and timestamp are assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInsert {
    pub user_id: Uuid,
    pub name: String,
    pub category: FileCategory,
    pub size: u64,
    pub url: String,
    pub storage_path: String,
}

impl FileInsert {
    pub fn into_record(self, id: Uuid, created_at: DateTime<Utc>) -> FileRecord {
        FileRecord {
            id,
            user_id: self.user_id,
            name: self.name,
            category: self.category,
            size: self.size,
            url: self.url,
            storage_path: self.storage_path,
            created_at,
        }
    }
}

/// Error type for catalog storage operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogStorageError {
    #[error("A record already exists for storage path: {0}")]
    Conflict(String),

    #[error("Stored record is invalid: {0}")]
    InvalidRecord(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}
