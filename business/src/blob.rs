//! Blob store client trait.

use std::future::Future;

/// Object storage for raw file bytes.
///
/// Paths are built with [`storage_path`](crate::file::storage_path).
pub trait BlobStore: Clone + Send + Sync + 'static {
    fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> impl Future<Output = Result<(), BlobError>> + Send;

    /// Resolvable download address for the object at `path`.
    fn download_url(&self, path: &str) -> impl Future<Output = Result<String, BlobError>> + Send;

    /// Removes the object. Missing objects are treated as success.
    fn delete(&self, path: &str) -> impl Future<Output = Result<(), BlobError>> + Send;
}

/// Error type for blob store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlobError {
    #[error("Not signed in")]
    Unauthorized,

    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Blob store rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid blob store response: {0}")]
    Decode(String),

    #[error("Blob store unavailable: {0}")]
    Unavailable(String),
}
