//! Cloudflare R2 storage implementation.

use opendal::{ErrorKind, Operator};

use super::mock::MockFileStorage;
use super::traits::FileStorage;
use super::types::{FileStorageError, OCTET_STREAM, StoredObject};
use crate::config::R2Credentials;

/// Configuration for Cloudflare R2.
#[derive(Clone)]
pub struct CFDiskConfig {
    pub account_id: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
}

impl From<&R2Credentials> for CFDiskConfig {
    fn from(credentials: &R2Credentials) -> Self {
        Self {
            account_id: credentials.account_id.clone(),
            access_key_id: credentials.access_key_id.clone(),
            secret_access_key: credentials.secret_access_key.clone(),
            bucket: credentials.bucket.clone(),
        }
    }
}

#[derive(Clone)]
enum Backend {
    R2(Operator),
    Memory(MockFileStorage),
}

/// Cloudflare R2 file storage.
#[derive(Clone)]
pub struct CFFileStorage {
    backend: Backend,
}

impl CFFileStorage {
    pub fn new_for_test() -> Self {
        Self {
            backend: Backend::Memory(MockFileStorage::new()),
        }
    }

    pub fn new(config: CFDiskConfig) -> Result<Self, FileStorageError> {
        let builder = opendal::services::S3::default()
            .bucket(&config.bucket)
            .region("auto")
            .access_key_id(&config.access_key_id)
            .secret_access_key(&config.secret_access_key)
            .endpoint(&format!(
                "https://{}.r2.cloudflarestorage.com",
                config.account_id
            ));

        let operator = Operator::new(builder)
            .map(|op| op.finish())
            .map_err(|e| FileStorageError::ConnectionError(e.to_string()))?;

        Ok(Self {
            backend: Backend::R2(operator),
        })
    }

    /// R2 storage when credentials are configured, in-memory storage otherwise.
    pub fn from_credentials(credentials: Option<&R2Credentials>) -> Result<Self, FileStorageError> {
        match credentials {
            Some(credentials) => Self::new(credentials.into()),
            None => {
                tracing::warn!("No R2 credentials configured, blobs are kept in memory");
                Ok(Self::new_for_test())
            }
        }
    }
}

impl Default for CFFileStorage {
    fn default() -> Self {
        Self::new_for_test()
    }
}

fn storage_error(path: &str, error: opendal::Error) -> FileStorageError {
    if error.kind() == ErrorKind::NotFound {
        FileStorageError::NotFound(path.to_owned())
    } else {
        FileStorageError::StorageError(error.to_string())
    }
}

impl FileStorage for CFFileStorage {
    async fn put(
        &self,
        path: &str,
        content: Vec<u8>,
        content_type: &str,
    ) -> Result<(), FileStorageError> {
        match &self.backend {
            Backend::Memory(mock) => mock.put(path, content, content_type).await,
            Backend::R2(op) => op
                .write_with(path, content)
                .content_type(content_type)
                .await
                .map(|_| ())
                .map_err(|e| storage_error(path, e)),
        }
    }

    async fn get(&self, path: &str) -> Result<StoredObject, FileStorageError> {
        match &self.backend {
            Backend::Memory(mock) => mock.get(path).await,
            Backend::R2(op) => {
                let metadata = op.stat(path).await.map_err(|e| storage_error(path, e))?;
                let content = op
                    .read(path)
                    .await
                    .map_err(|e| storage_error(path, e))?
                    .to_vec();

                Ok(StoredObject {
                    content,
                    content_type: metadata.content_type().unwrap_or(OCTET_STREAM).to_owned(),
                })
            }
        }
    }

    async fn delete(&self, path: &str) -> Result<bool, FileStorageError> {
        match &self.backend {
            Backend::Memory(mock) => mock.delete(path).await,
            Backend::R2(op) => {
                let exists = op.exists(path).await.map_err(|e| storage_error(path, e))?;
                if exists {
                    op.delete(path).await.map_err(|e| storage_error(path, e))?;
                }
                Ok(exists)
            }
        }
    }

    async fn exists(&self, path: &str) -> Result<bool, FileStorageError> {
        match &self.backend {
            Backend::Memory(mock) => mock.exists(path).await,
            Backend::R2(op) => op.exists(path).await.map_err(|e| storage_error(path, e)),
        }
    }

    async fn is_reachable(&self) -> bool {
        match &self.backend {
            Backend::Memory(_) => true,
            Backend::R2(op) => op.check().await.is_ok(),
        }
    }
}
