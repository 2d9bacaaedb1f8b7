//! PostgreSQL catalog storage.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::traits::CatalogStorage;
use super::types::{CatalogStorageError, FileInsert, FileRecord};
use crate::database::PgStorage;

#[derive(sqlx::FromRow)]
struct FileRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    category: String,
    size: i64,
    url: String,
    storage_path: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<FileRow> for FileRecord {
    type Error = CatalogStorageError;

    fn try_from(row: FileRow) -> Result<Self, Self::Error> {
        let category = row
            .category
            .parse()
            .map_err(|e| CatalogStorageError::InvalidRecord(format!("{}: {e}", row.id)))?;
        let size = u64::try_from(row.size).map_err(|_| {
            CatalogStorageError::InvalidRecord(format!("{}: negative size", row.id))
        })?;

        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            category,
            size,
            url: row.url,
            storage_path: row.storage_path,
            created_at: row.created_at,
        })
    }
}

/// PostgreSQL implementation of `CatalogStorage`.
#[derive(Clone)]
pub struct PgCatalogStorage {
    storage: PgStorage,
}

impl PgCatalogStorage {
    pub fn new(storage: PgStorage) -> Self {
        Self { storage }
    }
}

fn storage_error(e: sqlx::Error) -> CatalogStorageError {
    CatalogStorageError::StorageError(e.to_string())
}

impl CatalogStorage for PgCatalogStorage {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<FileRecord>, CatalogStorageError> {
        let rows = sqlx::query_as::<_, FileRow>(
            r#"
            SELECT id, user_id, name, category, size, url, storage_path, created_at
            FROM files
            WHERE user_id = $1
            ORDER BY name, id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.storage.pool)
        .await
        .map_err(storage_error)?;

        rows.into_iter().map(FileRecord::try_from).collect()
    }

    async fn insert(&self, input: FileInsert) -> Result<FileRecord, CatalogStorageError> {
        let size = i64::try_from(input.size)
            .map_err(|_| CatalogStorageError::InvalidRecord("size out of range".to_owned()))?;

        let row = sqlx::query_as::<_, FileRow>(
            r#"
            INSERT INTO files (id, user_id, name, category, size, url, storage_path)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (storage_path) DO NOTHING
            RETURNING id, user_id, name, category, size, url, storage_path, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.user_id)
        .bind(&input.name)
        .bind(input.category.as_str())
        .bind(size)
        .bind(&input.url)
        .bind(&input.storage_path)
        .fetch_optional(&self.storage.pool)
        .await
        .map_err(storage_error)?;

        match row {
            Some(row) => FileRecord::try_from(row),
            None => Err(CatalogStorageError::Conflict(input.storage_path)),
        }
    }

    async fn delete_for_user(&self, id: Uuid, user_id: Uuid) -> Result<bool, CatalogStorageError> {
        let result = sqlx::query(
            r#"
            DELETE FROM files WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.storage.pool)
        .await
        .map_err(storage_error)?;

        Ok(result.rows_affected() > 0)
    }
}
