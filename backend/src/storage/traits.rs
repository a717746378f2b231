//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow the local and
//! remote backends to be used interchangeably by the domain layer.
//!
//! Every repository handed out by [`super::StorageBackends`] is already scoped
//! to its owner (the device for local storage, a user id for remote storage),
//! so none of these methods take an owner argument.

use anyhow::Result;
use async_trait::async_trait;
use shared::{Category, Expense, ExpenseUpdate, NewExpense, StorageMode};

/// Trait defining the interface for expense storage operations
///
/// Implemented by the local document store and the remote relational store.
#[async_trait]
pub trait ExpenseStorage: Send + Sync {
    /// Short backend name used in log lines
    fn backend_name(&self) -> &'static str;

    /// List every expense of the owner
    /// Remote storage returns them ordered by date descending, local storage in stored order
    async fn list_expenses(&self) -> Result<Vec<Expense>>;

    /// Store a new expense, assigning its id and creation timestamp
    async fn add_expense(&self, expense: &NewExpense) -> Result<Expense>;

    /// Update the mutable fields of an expense
    /// Returns true if the expense was found and updated
    async fn update_expense(&self, id: &str, update: &ExpenseUpdate) -> Result<bool>;

    /// Delete a single expense
    /// Returns true if the expense was found and deleted
    async fn delete_expense(&self, id: &str) -> Result<bool>;

    /// Delete every expense of the owner
    async fn clear_expenses(&self) -> Result<()>;

    /// Replace the whole collection with the given records, keeping their ids
    async fn replace_expenses(&self, expenses: &[Expense]) -> Result<()>;

    /// Store a record copied from the other backend, keyed by its original id
    /// Returns false when a record with the same key is already present
    async fn import_expense(&self, expense: &Expense) -> Result<bool>;
}

/// Trait defining the interface for category storage operations
#[async_trait]
pub trait CategoryStorage: Send + Sync {
    fn backend_name(&self) -> &'static str;

    /// List every category of the owner (unsorted)
    async fn list_categories(&self) -> Result<Vec<Category>>;

    /// Seed an empty owner with the given categories and return what was stored
    async fn seed_categories(&self, defaults: &[Category]) -> Result<Vec<Category>>;

    /// Store a new category and return it with its assigned id
    async fn add_category(&self, category: &Category) -> Result<Category>;

    /// Delete a category, matched by id or, for id-less records, by name
    /// Returns true if something was deleted
    async fn delete_category(&self, category: &Category) -> Result<bool>;

    /// Persist the full category set with its rewritten order indices
    async fn save_category_order(&self, categories: &[Category]) -> Result<()>;

    /// Make `category` the only default of the owner
    async fn set_default_category(&self, category: &Category) -> Result<()>;

    /// Drop every category of the owner and store the given set instead
    async fn reset_categories(&self, defaults: &[Category]) -> Result<Vec<Category>>;
}

/// Trait defining the interface for persisted user preferences
pub trait PreferenceStorage: Send + Sync {
    /// Read the saved storage mode, if any
    fn load_storage_mode(&self) -> Result<Option<StorageMode>>;

    /// Persist the storage mode
    fn save_storage_mode(&self, mode: StorageMode) -> Result<()>;
}
