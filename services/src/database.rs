use sqlx::postgres::{PgPool, PgPoolOptions};
use std::future::Future;

use crate::config::Config;

/// Initialize a PostgreSQL connection pool and apply pending migrations.
pub async fn create_pool(config: &Config) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new().connect(config.database_url()).await?;

    tracing::info!("Database connection pool established");

    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::info!("Database migrations applied");

    Ok(pool)
}

/// Connectivity check for the relational store.
pub trait SqlStorage: Clone + Send + Sync + 'static {
    fn is_connected(&self) -> impl Future<Output = bool> + Send;
}

/// Shared PostgreSQL handle used by the user and catalog storages.
#[derive(Clone)]
pub struct PgStorage {
    pub pool: PgPool,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SqlStorage for PgStorage {
    async fn is_connected(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

/// Always-connected storage for tests.
#[derive(Clone, Debug)]
pub struct MockSqlStorage {
    pub is_connected: bool,
}

impl Default for MockSqlStorage {
    fn default() -> Self {
        Self { is_connected: true }
    }
}

impl SqlStorage for MockSqlStorage {
    async fn is_connected(&self) -> bool {
        self.is_connected
    }
}
