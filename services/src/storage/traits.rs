//! Storage trait definitions.

use super::types::{FileStorageError, StoredObject};
use std::future::Future;

/// Object storage for uploaded file contents.
pub trait FileStorage: Clone + Send + Sync + 'static {
    /// Writes `content` at `path`, replacing any existing object.
    fn put(
        &self,
        path: &str,
        content: Vec<u8>,
        content_type: &str,
    ) -> impl Future<Output = Result<(), FileStorageError>> + Send;

    fn get(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<StoredObject, FileStorageError>> + Send;

    /// Removes the object. Returns whether it existed.
    fn delete(&self, path: &str) -> impl Future<Output = Result<bool, FileStorageError>> + Send;

    fn exists(&self, path: &str) -> impl Future<Output = Result<bool, FileStorageError>> + Send;

    /// Connectivity check for the health endpoint.
    fn is_reachable(&self) -> impl Future<Output = bool> + Send;
}
