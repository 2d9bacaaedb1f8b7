//! Blob storage backed by OpenDAL.
//!
//! [`CFFileStorage`] talks to Cloudflare R2 through the S3 service. Without credentials it
//! falls back to [`MockFileStorage`], which keeps objects in memory.

mod cloudflare;
mod mock;
mod traits;
mod types;

pub use cloudflare::{CFDiskConfig, CFFileStorage};
pub use mock::MockFileStorage;
pub use traits::FileStorage;
pub use types::{FileStorageError, OCTET_STREAM, StoredObject};
