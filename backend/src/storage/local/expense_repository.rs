//! # Local Expense Repository
//!
//! The on-device expense collection lives in one JSON document,
//! `expense-tracker-data.json`, holding an array of expenses in display order
//! (newest insertions first). Every mutation rewrites the whole document.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use shared::{Expense, ExpenseUpdate, NewExpense};
use tracing::{debug, info};
use uuid::Uuid;

use super::connection::{LocalConnection, EXPENSES_KEY};
use crate::storage::traits::ExpenseStorage;

#[derive(Clone)]
pub struct ExpenseRepository {
    connection: LocalConnection,
}

impl ExpenseRepository {
    pub fn new(connection: LocalConnection) -> Self {
        Self { connection }
    }

    fn read_all(&self) -> Result<Vec<Expense>> {
        Ok(self
            .connection
            .read_document::<Vec<Expense>>(EXPENSES_KEY)?
            .unwrap_or_default())
    }

    fn write_all(&self, expenses: &[Expense]) -> Result<()> {
        self.connection.write_document(EXPENSES_KEY, expenses)
    }
}

#[async_trait]
impl ExpenseStorage for ExpenseRepository {
    fn backend_name(&self) -> &'static str {
        "local"
    }

    async fn list_expenses(&self) -> Result<Vec<Expense>> {
        let expenses = self.read_all()?;
        debug!("Loaded {} local expenses", expenses.len());
        Ok(expenses)
    }

    async fn add_expense(&self, new_expense: &NewExpense) -> Result<Expense> {
        let expense = Expense::from_new(
            new_expense,
            Uuid::new_v4().to_string(),
            Utc::now().to_rfc3339(),
        );

        let mut expenses = self.read_all()?;
        expenses.insert(0, expense.clone());
        self.write_all(&expenses)?;

        info!("Stored local expense {}", expense.id);
        Ok(expense)
    }

    async fn update_expense(&self, id: &str, update: &ExpenseUpdate) -> Result<bool> {
        let mut expenses = self.read_all()?;
        let Some(expense) = expenses.iter_mut().find(|e| e.id == id) else {
            return Ok(false);
        };
        update.apply_to(expense);
        self.write_all(&expenses)?;
        Ok(true)
    }

    async fn delete_expense(&self, id: &str) -> Result<bool> {
        let mut expenses = self.read_all()?;
        let before = expenses.len();
        expenses.retain(|e| e.id != id);
        if expenses.len() == before {
            return Ok(false);
        }
        self.write_all(&expenses)?;
        Ok(true)
    }

    async fn clear_expenses(&self) -> Result<()> {
        self.write_all(&[])?;
        info!("Cleared local expenses");
        Ok(())
    }

    async fn replace_expenses(&self, expenses: &[Expense]) -> Result<()> {
        self.write_all(expenses)?;
        info!("Replaced local expenses with {} records", expenses.len());
        Ok(())
    }

    async fn import_expense(&self, expense: &Expense) -> Result<bool> {
        let mut expenses = self.read_all()?;
        if expenses.iter().any(|e| e.id == expense.id) {
            return Ok(false);
        }
        expenses.insert(0, expense.clone());
        self.write_all(&expenses)?;
        Ok(true)
    }
}
