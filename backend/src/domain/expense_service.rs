//! # Expense Repository
//!
//! Owns the in-memory expense collection of the active session and keeps it in
//! step with the storage backend chosen for the session. Mutations hit the
//! backend first; memory changes only after the backend succeeds.

use shared::{Expense, ExpenseUpdate, ExportDocument, NewExpense};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::errors::DomainResult;
use super::export_service::ExportService;
use crate::storage::ExpenseStorage;

pub struct ExpenseService {
    storage: Arc<dyn ExpenseStorage>,
    /// Local backend, target of snapshot imports whatever the mode
    snapshot_store: Arc<dyn ExpenseStorage>,
    export_service: ExportService,
    expenses: Vec<Expense>,
}

impl ExpenseService {
    pub fn new(storage: Arc<dyn ExpenseStorage>, snapshot_store: Arc<dyn ExpenseStorage>) -> Self {
        Self {
            storage,
            snapshot_store,
            export_service: ExportService::new(),
            expenses: Vec::new(),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.storage.backend_name()
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// Reload from the backend; a failure is logged and leaves an empty collection
    pub async fn load(&mut self) -> &[Expense] {
        match self.storage.list_expenses().await {
            Ok(expenses) => {
                info!(
                    "Loaded {} expenses from {} storage",
                    expenses.len(),
                    self.storage.backend_name()
                );
                self.expenses = expenses;
            }
            Err(e) => {
                error!(
                    "Failed to load expenses from {} storage: {:#}",
                    self.storage.backend_name(),
                    e
                );
                self.expenses = Vec::new();
            }
        }
        &self.expenses
    }

    pub async fn add_expense(&mut self, new_expense: &NewExpense) -> DomainResult<Expense> {
        let expense = self.storage.add_expense(new_expense).await?;
        self.expenses.insert(0, expense.clone());
        info!("Added expense {} ({} {})", expense.id, expense.amount, expense.category);
        Ok(expense)
    }

    /// Update an expense; `None` when the id is not in the collection
    pub async fn update_expense(
        &mut self,
        id: &str,
        update: &ExpenseUpdate,
    ) -> DomainResult<Option<Expense>> {
        let Some(position) = self.expenses.iter().position(|e| e.id == id) else {
            warn!("Ignoring update of unknown expense {}", id);
            return Ok(None);
        };

        if !self.storage.update_expense(id, update).await? {
            warn!(
                "Expense {} was not found in {} storage, leaving it unchanged",
                id,
                self.storage.backend_name()
            );
            return Ok(None);
        }

        let expense = &mut self.expenses[position];
        update.apply_to(expense);
        Ok(Some(expense.clone()))
    }

    /// Delete an expense; returns whether it was in the collection
    pub async fn delete_expense(&mut self, id: &str) -> DomainResult<bool> {
        self.storage.delete_expense(id).await?;

        let before = self.expenses.len();
        self.expenses.retain(|e| e.id != id);
        let removed = self.expenses.len() != before;
        if removed {
            info!("Deleted expense {}", id);
        }
        Ok(removed)
    }

    pub async fn clear_all(&mut self) -> DomainResult<()> {
        self.storage.clear_expenses().await?;
        self.expenses.clear();
        info!("Cleared all expenses from {} storage", self.storage.backend_name());
        Ok(())
    }

    pub fn export_snapshot(&self) -> DomainResult<ExportDocument> {
        self.export_service.export(&self.expenses)
    }

    /// Replace the local snapshot and the collection with an imported document
    pub async fn import_snapshot(&mut self, document: &str) -> DomainResult<usize> {
        let expenses = self.export_service.parse(document)?;
        self.snapshot_store.replace_expenses(&expenses).await?;

        let count = expenses.len();
        self.expenses = expenses;
        info!("Imported {} expenses", count);
        Ok(count)
    }

    /// Adopt a collection written to the backend by someone else, e.g. a sync
    pub fn replace_in_memory(&mut self, expenses: Vec<Expense>) {
        self.expenses = expenses;
    }
}
