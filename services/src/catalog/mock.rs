//! In-memory catalog storage.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use uuid::Uuid;

use super::traits::CatalogStorage;
use super::types::{CatalogStorageError, FileInsert, FileRecord};

/// In-memory implementation of `CatalogStorage` for testing.
#[derive(Clone, Default)]
pub struct MockCatalogStorage {
    records: Arc<RwLock<HashMap<Uuid, FileRecord>>>,
}

impl MockCatalogStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: Uuid) -> Option<FileRecord> {
        self.records.read().expect("lock poisoned").get(&id).cloned()
    }
}

impl CatalogStorage for MockCatalogStorage {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<FileRecord>, CatalogStorageError> {
        let records = self.records.read().expect("lock poisoned");
        let mut owned: Vec<_> = records
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(owned)
    }

    async fn insert(&self, input: FileInsert) -> Result<FileRecord, CatalogStorageError> {
        let mut records = self.records.write().expect("lock poisoned");
        if records
            .values()
            .any(|r| r.storage_path == input.storage_path)
        {
            return Err(CatalogStorageError::Conflict(input.storage_path));
        }

        let record = input.into_record(Uuid::new_v4(), Utc::now());
        records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn delete_for_user(&self, id: Uuid, user_id: Uuid) -> Result<bool, CatalogStorageError> {
        let mut records = self.records.write().expect("lock poisoned");
        match records.get(&id) {
            Some(record) if record.user_id == user_id => {
                records.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
