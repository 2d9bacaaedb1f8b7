//! In-memory file storage.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::traits::FileStorage;
use super::types::{FileStorageError, StoredObject};

/// In-memory implementation of `FileStorage` for tests and local runs.
#[derive(Clone, Default)]
pub struct MockFileStorage {
    files: Arc<RwLock<HashMap<String, StoredObject>>>,
}

impl MockFileStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<_> = self
            .files
            .read()
            .expect("lock poisoned")
            .keys()
            .cloned()
            .collect();
        paths.sort();
        paths
    }
}

impl FileStorage for MockFileStorage {
    async fn put(
        &self,
        path: &str,
        content: Vec<u8>,
        content_type: &str,
    ) -> Result<(), FileStorageError> {
        self.files.write().expect("lock poisoned").insert(
            path.to_owned(),
            StoredObject {
                content,
                content_type: content_type.to_owned(),
            },
        );
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<StoredObject, FileStorageError> {
        self.files
            .read()
            .expect("lock poisoned")
            .get(path)
            .cloned()
            .ok_or_else(|| FileStorageError::NotFound(path.to_owned()))
    }

    async fn delete(&self, path: &str) -> Result<bool, FileStorageError> {
        Ok(self
            .files
            .write()
            .expect("lock poisoned")
            .remove(path)
            .is_some())
    }

    async fn exists(&self, path: &str) -> Result<bool, FileStorageError> {
        Ok(self.files.read().expect("lock poisoned").contains_key(path))
    }

    async fn is_reachable(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_and_get() {
        let storage = MockFileStorage::new();
        storage
            .put("files/u/1-a.png", vec![1, 2], "image/png")
            .await
            .unwrap();

        let object = storage.get("files/u/1-a.png").await.unwrap();
        assert_eq!(object.content, vec![1, 2]);
        assert_eq!(object.content_type, "image/png");
        assert_eq!(storage.paths(), vec!["files/u/1-a.png".to_owned()]);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let storage = MockFileStorage::new();
        assert!(matches!(
            storage.get("nope").await,
            Err(FileStorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_reports_existence() {
        let storage = MockFileStorage::new();
        storage.put("a", vec![], "text/plain").await.unwrap();

        assert!(storage.delete("a").await.unwrap());
        assert!(!storage.delete("a").await.unwrap());
        assert!(!storage.exists("a").await.unwrap());
        assert!(storage.is_empty());
    }
}
