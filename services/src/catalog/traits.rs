//! Catalog storage trait.

use super::types::{CatalogStorageError, FileInsert, FileRecord};
use std::future::Future;
use uuid::Uuid;

/// Persistence for file-metadata records.
pub trait CatalogStorage: Clone + Send + Sync + 'static {
    /// Records owned by `user_id`, ordered by name.
    fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = Result<Vec<FileRecord>, CatalogStorageError>> + Send;

    /// Stores a new record. Fails with `Conflict` if the storage path is already recorded.
    fn insert(
        &self,
        input: FileInsert,
    ) -> impl Future<Output = Result<FileRecord, CatalogStorageError>> + Send;

    /// Removes the record if it belongs to `user_id`. Returns whether a record was removed.
    fn delete_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = Result<bool, CatalogStorageError>> + Send;
}
