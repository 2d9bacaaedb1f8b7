//! File catalog storage.
//!
//! One record per uploaded file, always scoped to its owner.

mod mock;
mod postgres;
mod traits;
mod types;

pub use mock::MockCatalogStorage;
pub use postgres::PgCatalogStorage;
pub use traits::CatalogStorage;
pub use types::{CatalogStorageError, FileInsert, FileRecord};

#[cfg(test)]
mod tests {
    use super::*;
    use cabinet_business::FileCategory;
    use uuid::Uuid;

    async fn insert_named<S: CatalogStorage>(
        storage: &S,
        user_id: Uuid,
        name: &str,
    ) -> Result<FileRecord, CatalogStorageError> {
        storage
            .insert(FileInsert {
                user_id,
                name: name.to_owned(),
                category: FileCategory::Other,
                size: 1,
                url: format!("http://localhost/v1/download/{name}"),
                storage_path: format!("files/{user_id}/x-{name}"),
            })
            .await
    }

    #[tokio::test]
    async fn test_generic_trait_usage() {
        let storage = MockCatalogStorage::new();
        let user_id = Uuid::new_v4();
        let record = insert_named(&storage, user_id, "a.bin").await.unwrap();
        assert_eq!(record.user_id, user_id);
        assert_eq!(storage.list_for_user(user_id).await.unwrap(), vec![record]);
    }
}
