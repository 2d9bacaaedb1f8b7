//! Client-side file manager logic.
//!
//! The orchestration here talks to three collaborators through traits:
//! [`IdentityProvider`], [`FileCatalog`] and [`BlobStore`]. The [`remote`] module
//! implements them against `cabinet-services`, and [`memory`] provides in-process
//! versions for tests.

pub mod blob;
pub mod catalog;
pub mod category;
mod config;
pub mod file;
pub mod identity;
pub mod manager;
pub mod memory;
pub mod notice;
pub mod remote;
pub mod session;

pub use blob::{BlobError, BlobStore};
pub use catalog::{CatalogError, FileCatalog};
pub use category::{CategoryBuckets, FileCategory, UnknownCategory, classify};
pub use config::{BusinessConfig, DEFAULT_API_URL};
pub use file::{ManagedFile, NewFileRecord, UploadFile, random_id, storage_path, user_prefix};
pub use identity::{AuthError, AuthFailure, AuthOperation, Identity, IdentityProvider};
pub use manager::{
    DeleteOutcome, DeletePrompt, FileManager, ListStatus, ManagerSnapshot, UploadError,
    UploadReport,
};
pub use notice::Notice;
pub use remote::{ApiClient, RemoteBlobStore, RemoteCatalog, RemoteIdentity};
pub use session::{AuthSession, SessionState, Subscription};
