//! User storage trait and implementations.
//!
//! - `UserStorage`: email/password accounts
//! - `PgUserStorage`: PostgreSQL implementation on top of `PgStorage`
//! - `MockUserStorage`: in-memory implementation for tests

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::PgStorage;

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUser {
    pub id: Uuid,
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl StoredUser {
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            password_hash: password_hash.into(),
            created_at: Utc::now(),
        }
    }
}

/// Error type for user storage operations.
#[derive(Debug, thiserror::Error)]
pub enum UserStorageError {
    #[error("User already exists: {0}")]
    UserAlreadyExists(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Account persistence.
pub trait UserStorage: Clone + Send + Sync + 'static {
    /// Creates an account. Fails with `UserAlreadyExists` if the email is taken.
    fn create_user(
        &self,
        email: &str,
        password_hash: &str,
    ) -> impl Future<Output = Result<StoredUser, UserStorageError>> + Send;

    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<StoredUser>, UserStorageError>> + Send;

    fn get_user(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<StoredUser>, UserStorageError>> + Send;

    /// Replaces the password hash. Returns `false` if the user does not exist.
    fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> impl Future<Output = Result<bool, UserStorageError>> + Send;
}

/// In-memory implementation of `UserStorage`.
#[derive(Clone, Default)]
pub struct MockUserStorage {
    users: Arc<RwLock<HashMap<Uuid, StoredUser>>>,
}

impl MockUserStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn with_user(self, user: StoredUser) -> Self {
        self.users
            .write()
            .expect("lock poisoned")
            .insert(user.id, user);
        self
    }
}

impl UserStorage for MockUserStorage {
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<StoredUser, UserStorageError> {
        if email.is_empty() {
            return Err(UserStorageError::InvalidInput(
                "Email cannot be empty".to_owned(),
            ));
        }

        let mut users = self.users.write().expect("lock poisoned");
        if users.values().any(|u| u.email == email) {
            return Err(UserStorageError::UserAlreadyExists(email.to_owned()));
        }

        let user = StoredUser::new(email, password_hash);
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>, UserStorageError> {
        let users = self.users.read().expect("lock poisoned");
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<StoredUser>, UserStorageError> {
        Ok(self.users.read().expect("lock poisoned").get(&id).cloned())
    }

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, UserStorageError> {
        let mut users = self.users.write().expect("lock poisoned");
        match users.get_mut(&id) {
            Some(user) => {
                user.password_hash = password_hash.to_owned();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for StoredUser {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

/// PostgreSQL implementation of `UserStorage`.
#[derive(Clone)]
pub struct PgUserStorage {
    storage: PgStorage,
}

impl PgUserStorage {
    pub fn new(storage: PgStorage) -> Self {
        Self { storage }
    }
}

fn storage_error(e: sqlx::Error) -> UserStorageError {
    UserStorageError::StorageError(e.to_string())
}

impl UserStorage for PgUserStorage {
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<StoredUser, UserStorageError> {
        if email.is_empty() {
            return Err(UserStorageError::InvalidInput(
                "Email cannot be empty".to_owned(),
            ));
        }

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email, password_hash)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, email, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .fetch_optional(&self.storage.pool)
        .await
        .map_err(storage_error)?;

        row.map(StoredUser::from)
            .ok_or_else(|| UserStorageError::UserAlreadyExists(email.to_owned()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>, UserStorageError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, created_at FROM users WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.storage.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.map(StoredUser::from))
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<StoredUser>, UserStorageError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, created_at FROM users WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.storage.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.map(StoredUser::from))
    }

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, UserStorageError> {
        let result = sqlx::query(
            r#"
            UPDATE users SET password_hash = $2 WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.storage.pool)
        .await
        .map_err(storage_error)?;

        Ok(result.rows_affected() > 0)
    }
}
