/// Test utilities: temporary data directories and storage doubles
///
/// The temporary directory is removed when the environment is dropped, even if
/// the test panics.
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{Category, Expense, ExpenseUpdate, NewExpense, StorageMode};
use std::collections::HashSet;
use std::sync::Mutex;
use tempfile::TempDir;

use super::traits::{CategoryStorage, ExpenseStorage, PreferenceStorage};
use super::{LocalConnection, RemoteConnection, StorageBackends};

/// Test environment with a local data directory and, optionally, a remote store
pub struct TestEnvironment {
    pub local: LocalConnection,
    pub remote: Option<RemoteConnection>,
    /// Base directory path for manual inspection if needed
    pub base_path: std::path::PathBuf,
    _temp_dir: TempDir, // Keep alive to prevent cleanup
}

impl TestEnvironment {
    /// Local storage only, as when no remote store is configured
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let local = LocalConnection::new(temp_dir.path().join("data"))?;
        Ok(Self {
            local,
            remote: None,
            base_path: temp_dir.path().to_path_buf(),
            _temp_dir: temp_dir,
        })
    }

    /// Local storage plus a fresh remote database
    pub async fn with_remote() -> Result<Self> {
        let mut env = Self::new()?;
        env.remote = Some(RemoteConnection::init_test(&env.base_path).await?);
        Ok(env)
    }

    pub fn backends(&self) -> StorageBackends {
        StorageBackends::new(self.local.clone(), self.remote.clone())
    }
}

pub fn sample_expense(id: &str, amount: f64, category: &str, date: &str) -> Expense {
    Expense {
        id: id.to_string(),
        amount,
        category: category.to_string(),
        date: date.to_string(),
        description: format!("{} expense", category),
        created_at: format!("{}T12:00:00+00:00", date),
    }
}

pub fn new_expense(amount: f64, category: &str, date: &str) -> NewExpense {
    NewExpense {
        amount,
        category: category.to_string(),
        date: date.to_string(),
        description: format!("{} expense", category),
    }
}

/// Expense storage whose every operation fails
pub struct FailingExpenseStorage;

#[async_trait]
impl ExpenseStorage for FailingExpenseStorage {
    fn backend_name(&self) -> &'static str {
        "failing"
    }

    async fn list_expenses(&self) -> Result<Vec<Expense>> {
        Err(anyhow!("storage offline"))
    }

    async fn add_expense(&self, _expense: &NewExpense) -> Result<Expense> {
        Err(anyhow!("storage offline"))
    }

    async fn update_expense(&self, _id: &str, _update: &ExpenseUpdate) -> Result<bool> {
        Err(anyhow!("storage offline"))
    }

    async fn delete_expense(&self, _id: &str) -> Result<bool> {
        Err(anyhow!("storage offline"))
    }

    async fn clear_expenses(&self) -> Result<()> {
        Err(anyhow!("storage offline"))
    }

    async fn replace_expenses(&self, _expenses: &[Expense]) -> Result<()> {
        Err(anyhow!("storage offline"))
    }

    async fn import_expense(&self, _expense: &Expense) -> Result<bool> {
        Err(anyhow!("storage offline"))
    }
}

/// In-memory expense storage that rejects imports of selected ids
#[derive(Default)]
pub struct FlakyExpenseStorage {
    pub stored: Mutex<Vec<Expense>>,
    pub reject_ids: HashSet<String>,
}

impl FlakyExpenseStorage {
    pub fn rejecting(ids: &[&str]) -> Self {
        Self {
            stored: Mutex::new(Vec::new()),
            reject_ids: ids.iter().map(|id| id.to_string()).collect(),
        }
    }

    pub fn stored(&self) -> Vec<Expense> {
        self.stored.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExpenseStorage for FlakyExpenseStorage {
    fn backend_name(&self) -> &'static str {
        "flaky"
    }

    async fn list_expenses(&self) -> Result<Vec<Expense>> {
        Ok(self.stored())
    }

    async fn add_expense(&self, expense: &NewExpense) -> Result<Expense> {
        let stored = Expense::from_new(
            expense,
            format!("flaky-{}", self.stored.lock().unwrap().len()),
            "2024-01-01T00:00:00+00:00".to_string(),
        );
        self.stored.lock().unwrap().insert(0, stored.clone());
        Ok(stored)
    }

    async fn update_expense(&self, id: &str, update: &ExpenseUpdate) -> Result<bool> {
        let mut stored = self.stored.lock().unwrap();
        match stored.iter_mut().find(|e| e.id == id) {
            Some(expense) => {
                update.apply_to(expense);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_expense(&self, id: &str) -> Result<bool> {
        let mut stored = self.stored.lock().unwrap();
        let before = stored.len();
        stored.retain(|e| e.id != id);
        Ok(stored.len() != before)
    }

    async fn clear_expenses(&self) -> Result<()> {
        self.stored.lock().unwrap().clear();
        Ok(())
    }

    async fn replace_expenses(&self, expenses: &[Expense]) -> Result<()> {
        *self.stored.lock().unwrap() = expenses.to_vec();
        Ok(())
    }

    async fn import_expense(&self, expense: &Expense) -> Result<bool> {
        if self.reject_ids.contains(&expense.id) {
            return Err(anyhow!("rejected {}", expense.id));
        }
        let mut stored = self.stored.lock().unwrap();
        if stored.iter().any(|e| e.id == expense.id) {
            return Ok(false);
        }
        stored.push(expense.clone());
        Ok(true)
    }
}

/// Category storage whose every operation fails
pub struct FailingCategoryStorage;

#[async_trait]
impl CategoryStorage for FailingCategoryStorage {
    fn backend_name(&self) -> &'static str {
        "failing"
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        Err(anyhow!("storage offline"))
    }

    async fn seed_categories(&self, _defaults: &[Category]) -> Result<Vec<Category>> {
        Err(anyhow!("storage offline"))
    }

    async fn add_category(&self, _category: &Category) -> Result<Category> {
        Err(anyhow!("storage offline"))
    }

    async fn delete_category(&self, _category: &Category) -> Result<bool> {
        Err(anyhow!("storage offline"))
    }

    async fn save_category_order(&self, _categories: &[Category]) -> Result<()> {
        Err(anyhow!("storage offline"))
    }

    async fn set_default_category(&self, _category: &Category) -> Result<()> {
        Err(anyhow!("storage offline"))
    }

    async fn reset_categories(&self, _defaults: &[Category]) -> Result<Vec<Category>> {
        Err(anyhow!("storage offline"))
    }
}

/// Preference storage kept in memory, optionally failing on save
#[derive(Default)]
pub struct MemoryPreferenceStorage {
    pub mode: Mutex<Option<StorageMode>>,
    pub fail_saves: bool,
}

impl MemoryPreferenceStorage {
    pub fn with_mode(mode: Option<StorageMode>) -> Self {
        Self {
            mode: Mutex::new(mode),
            fail_saves: false,
        }
    }

    pub fn saved(&self) -> Option<StorageMode> {
        *self.mode.lock().unwrap()
    }
}

impl PreferenceStorage for MemoryPreferenceStorage {
    fn load_storage_mode(&self) -> Result<Option<StorageMode>> {
        Ok(self.saved())
    }

    fn save_storage_mode(&self, mode: StorageMode) -> Result<()> {
        if self.fail_saves {
            return Err(anyhow!("preferences are read-only"));
        }
        *self.mode.lock().unwrap() = Some(mode);
        Ok(())
    }
}
