//! File catalog client trait.

use std::future::Future;

use crate::file::{ManagedFile, NewFileRecord};

/// Per-user collection of file-metadata records.
///
/// Implementations: [`MemoryCatalog`](crate::memory::MemoryCatalog) for tests and
/// [`RemoteCatalog`](crate::remote::RemoteCatalog) for the service.
pub trait FileCatalog: Clone + Send + Sync + 'static {
    /// Records owned by `user_id`. Ordering is not guaranteed.
    fn list(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<ManagedFile>, CatalogError>> + Send;

    /// Stores a new record and returns it with its assigned identifier.
    fn create(
        &self,
        record: NewFileRecord,
    ) -> impl Future<Output = Result<ManagedFile, CatalogError>> + Send;

    /// Removes a record. Unknown identifiers are treated as success.
    fn delete(&self, id: &str) -> impl Future<Output = Result<(), CatalogError>> + Send;
}

/// Error type for catalog operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Not signed in")]
    Unauthorized,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Catalog rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid catalog response: {0}")]
    Decode(String),

    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}
