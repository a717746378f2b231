use anyhow::Result;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::sync::Arc;
use tracing::info;

/// RemoteConnection manages the per-user relational store
#[derive(Clone)]
pub struct RemoteConnection {
    pool: Arc<SqlitePool>,
}

impl RemoteConnection {
    /// Create a new database connection
    pub async fn new(url: &str) -> Result<Self> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?;
            info!("Created remote database at {}", url);
        }

        let pool = SqlitePool::connect(url).await?;
        Self::setup_schema(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Open a fresh database file inside `dir`
    #[cfg(test)]
    pub async fn init_test(dir: &std::path::Path) -> Result<Self> {
        let file = dir.join(format!("remote_{}.db", uuid::Uuid::new_v4()));
        Self::new(&format!("sqlite://{}", file.display())).await
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS expenses (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                client_id TEXT,
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                date TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Uploaded records remember the id they had on the device
        sqlx::query(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_expenses_user_client
            ON expenses (user_id, client_id);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS categories (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                icon TEXT NOT NULL,
                color TEXT NOT NULL,
                order_index INTEGER,
                is_default BOOLEAN NOT NULL DEFAULT 0,
                UNIQUE (user_id, name COLLATE NOCASE)
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Get the underlying SQLite pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
