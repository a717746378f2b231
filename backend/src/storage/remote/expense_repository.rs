//! # Remote Expense Repository
//!
//! Expenses in the relational store, scoped to one signed-in user. Rows carry
//! an optional `client_id`: the id a record had on the device before it was
//! uploaded, which lets repeated uploads be recognised.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use shared::{Expense, ExpenseUpdate, NewExpense};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, info};
use uuid::Uuid;

use super::connection::RemoteConnection;
use crate::storage::traits::ExpenseStorage;

#[derive(Clone)]
pub struct RemoteExpenseRepository {
    connection: RemoteConnection,
    user_id: String,
}

impl RemoteExpenseRepository {
    pub fn new(connection: RemoteConnection, user_id: &str) -> Self {
        Self {
            connection,
            user_id: user_id.to_string(),
        }
    }

    fn expense_from_row(row: &SqliteRow) -> Expense {
        Expense {
            id: row.get("id"),
            amount: row.get("amount"),
            category: row.get("category"),
            date: row.get("date"),
            description: row.get("description"),
            created_at: row.get("created_at"),
        }
    }
}

#[async_trait]
impl ExpenseStorage for RemoteExpenseRepository {
    fn backend_name(&self) -> &'static str {
        "remote"
    }

    async fn list_expenses(&self) -> Result<Vec<Expense>> {
        let rows = sqlx::query(
            r#"
            SELECT id, amount, category, date, description, created_at
            FROM expenses
            WHERE user_id = ?
            ORDER BY date DESC, created_at DESC
            "#,
        )
        .bind(&self.user_id)
        .fetch_all(self.connection.pool())
        .await?;

        let expenses: Vec<Expense> = rows.iter().map(Self::expense_from_row).collect();
        debug!("Loaded {} remote expenses for {}", expenses.len(), self.user_id);
        Ok(expenses)
    }

    async fn add_expense(&self, new_expense: &NewExpense) -> Result<Expense> {
        let expense = Expense::from_new(
            new_expense,
            Uuid::new_v4().to_string(),
            Utc::now().to_rfc3339(),
        );

        sqlx::query(
            r#"
            INSERT INTO expenses (id, user_id, client_id, amount, category, date, description, created_at)
            VALUES (?, ?, NULL, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&expense.id)
        .bind(&self.user_id)
        .bind(expense.amount)
        .bind(&expense.category)
        .bind(&expense.date)
        .bind(&expense.description)
        .bind(&expense.created_at)
        .execute(self.connection.pool())
        .await?;

        info!("Stored remote expense {} for {}", expense.id, self.user_id);
        Ok(expense)
    }

    async fn update_expense(&self, id: &str, update: &ExpenseUpdate) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE expenses
            SET amount = COALESCE(?, amount),
                category = COALESCE(?, category),
                date = COALESCE(?, date),
                description = COALESCE(?, description)
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(update.amount)
        .bind(&update.category)
        .bind(&update.date)
        .bind(&update.description)
        .bind(id)
        .bind(&self.user_id)
        .execute(self.connection.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_expense(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(&self.user_id)
            .execute(self.connection.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear_expenses(&self) -> Result<()> {
        let result = sqlx::query("DELETE FROM expenses WHERE user_id = ?")
            .bind(&self.user_id)
            .execute(self.connection.pool())
            .await?;
        info!(
            "Cleared {} remote expenses for {}",
            result.rows_affected(),
            self.user_id
        );
        Ok(())
    }

    async fn replace_expenses(&self, expenses: &[Expense]) -> Result<()> {
        let mut tx = self.connection.pool().begin().await?;

        sqlx::query("DELETE FROM expenses WHERE user_id = ?")
            .bind(&self.user_id)
            .execute(&mut *tx)
            .await?;

        for expense in expenses {
            sqlx::query(
                r#"
                INSERT INTO expenses (id, user_id, client_id, amount, category, date, description, created_at)
                VALUES (?, ?, NULL, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&expense.id)
            .bind(&self.user_id)
            .bind(expense.amount)
            .bind(&expense.category)
            .bind(&expense.date)
            .bind(&expense.description)
            .bind(&expense.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!(
            "Replaced remote expenses for {} with {} records",
            self.user_id,
            expenses.len()
        );
        Ok(())
    }

    async fn import_expense(&self, expense: &Expense) -> Result<bool> {
        // Skip records already uploaded, and records that came from this store
        let result = sqlx::query(
            r#"
            INSERT INTO expenses (id, user_id, client_id, amount, category, date, description, created_at)
            SELECT ?, ?, ?, ?, ?, ?, ?, ?
            WHERE NOT EXISTS (
                SELECT 1 FROM expenses WHERE user_id = ? AND (id = ? OR client_id = ?)
            )
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&self.user_id)
        .bind(&expense.id)
        .bind(expense.amount)
        .bind(&expense.category)
        .bind(&expense.date)
        .bind(&expense.description)
        .bind(Utc::now().to_rfc3339())
        .bind(&self.user_id)
        .bind(&expense.id)
        .bind(&expense.id)
        .execute(self.connection.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
