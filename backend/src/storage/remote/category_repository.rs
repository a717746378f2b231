//! # Remote Category Repository
//!
//! Categories in the relational store, scoped to one signed-in user. Names are
//! unique per user, compared without regard to case.

use anyhow::Result;
use async_trait::async_trait;
use shared::Category;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::connection::RemoteConnection;
use crate::storage::traits::CategoryStorage;

#[derive(Clone)]
pub struct RemoteCategoryRepository {
    connection: RemoteConnection,
    user_id: String,
}

impl RemoteCategoryRepository {
    pub fn new(connection: RemoteConnection, user_id: &str) -> Self {
        Self {
            connection,
            user_id: user_id.to_string(),
        }
    }

    fn category_from_row(row: &SqliteRow) -> Category {
        Category {
            id: Some(row.get("id")),
            name: row.get("name"),
            color: row.get("color"),
            icon: row.get("icon"),
            order_index: row.get("order_index"),
            is_default: row.get("is_default"),
        }
    }

    async fn insert_category(&self, category: &Category) -> Result<Category> {
        let mut stored = category.clone();
        stored.id = Some(Uuid::new_v4().to_string());

        sqlx::query(
            r#"
            INSERT INTO categories (id, user_id, name, icon, color, order_index, is_default)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&stored.id)
        .bind(&self.user_id)
        .bind(&stored.name)
        .bind(&stored.icon)
        .bind(&stored.color)
        .bind(stored.order_index)
        .bind(stored.is_default)
        .execute(self.connection.pool())
        .await?;

        Ok(stored)
    }

    /// Insert defaults one by one, numbering them in sequence; failures are skipped
    async fn insert_defaults(&self, defaults: &[Category]) -> Vec<Category> {
        let mut stored = Vec::with_capacity(defaults.len());
        for (index, category) in defaults.iter().enumerate() {
            let mut seeded = category.clone();
            seeded.order_index = Some(index as i64);
            match self.insert_category(&seeded).await {
                Ok(category) => stored.push(category),
                Err(e) => warn!("Failed to seed category '{}': {}", category.name, e),
            }
        }
        stored
    }
}

#[async_trait]
impl CategoryStorage for RemoteCategoryRepository {
    fn backend_name(&self) -> &'static str {
        "remote"
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, icon, color, order_index, is_default
            FROM categories
            WHERE user_id = ?
            "#,
        )
        .bind(&self.user_id)
        .fetch_all(self.connection.pool())
        .await?;

        let categories: Vec<Category> = rows.iter().map(Self::category_from_row).collect();
        debug!("Loaded {} remote categories for {}", categories.len(), self.user_id);
        Ok(categories)
    }

    async fn seed_categories(&self, defaults: &[Category]) -> Result<Vec<Category>> {
        let stored = self.insert_defaults(defaults).await;
        info!(
            "Seeded {} of {} default categories for {}",
            stored.len(),
            defaults.len(),
            self.user_id
        );
        Ok(stored)
    }

    async fn add_category(&self, category: &Category) -> Result<Category> {
        let stored = self.insert_category(category).await?;
        info!("Stored remote category '{}' for {}", stored.name, self.user_id);
        Ok(stored)
    }

    async fn delete_category(&self, category: &Category) -> Result<bool> {
        let Some(ref id) = category.id else {
            warn!("Cannot delete remote category '{}' without an id", category.name);
            return Ok(false);
        };

        let result = sqlx::query("DELETE FROM categories WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(&self.user_id)
            .execute(self.connection.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn save_category_order(&self, categories: &[Category]) -> Result<()> {
        let mut tx = self.connection.pool().begin().await?;

        for category in categories {
            let id = category
                .id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            sqlx::query(
                r#"
                INSERT INTO categories (id, user_id, name, icon, color, order_index, is_default)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    icon = excluded.icon,
                    color = excluded.color,
                    order_index = excluded.order_index,
                    is_default = excluded.is_default
                WHERE categories.user_id = excluded.user_id
                "#,
            )
            .bind(id)
            .bind(&self.user_id)
            .bind(&category.name)
            .bind(&category.icon)
            .bind(&category.color)
            .bind(category.order_index)
            .bind(category.is_default)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!("Saved order of {} categories for {}", categories.len(), self.user_id);
        Ok(())
    }

    async fn set_default_category(&self, category: &Category) -> Result<()> {
        let Some(ref id) = category.id else {
            warn!(
                "Cannot mark remote category '{}' as default without an id",
                category.name
            );
            return Ok(());
        };

        // Single statement so there is never more than one default
        sqlx::query(
            r#"
            UPDATE categories
            SET is_default = CASE WHEN id = ? THEN 1 ELSE 0 END
            WHERE user_id = ?
            "#,
        )
        .bind(id)
        .bind(&self.user_id)
        .execute(self.connection.pool())
        .await?;
        Ok(())
    }

    async fn reset_categories(&self, defaults: &[Category]) -> Result<Vec<Category>> {
        sqlx::query("DELETE FROM categories WHERE user_id = ?")
            .bind(&self.user_id)
            .execute(self.connection.pool())
            .await?;

        let stored = self.insert_defaults(defaults).await;
        info!(
            "Reset remote categories for {} to {} defaults",
            self.user_id,
            stored.len()
        );
        Ok(stored)
    }
}
