//! # Local Category Repository
//!
//! Categories are kept in `expense-tracker-categories.json` as an array in
//! display order. A device that has never customised its categories has no
//! document at all; it reads as the compiled-in default set, and the first
//! mutation writes the full list.

use anyhow::Result;
use async_trait::async_trait;
use shared::{default_categories, Category};
use tracing::{debug, info};
use uuid::Uuid;

use super::connection::{LocalConnection, CATEGORIES_KEY};
use crate::storage::traits::CategoryStorage;

#[derive(Clone)]
pub struct CategoryRepository {
    connection: LocalConnection,
}

impl CategoryRepository {
    pub fn new(connection: LocalConnection) -> Self {
        Self { connection }
    }

    fn read_all(&self) -> Result<Vec<Category>> {
        match self.connection.read_document::<Vec<Category>>(CATEGORIES_KEY)? {
            Some(categories) if !categories.is_empty() => Ok(categories),
            _ => Ok(default_categories()),
        }
    }

    fn write_all(&self, categories: &[Category]) -> Result<()> {
        self.connection.write_document(CATEGORIES_KEY, categories)
    }
}

#[async_trait]
impl CategoryStorage for CategoryRepository {
    fn backend_name(&self) -> &'static str {
        "local"
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let categories = self.read_all()?;
        debug!("Loaded {} local categories", categories.len());
        Ok(categories)
    }

    async fn seed_categories(&self, defaults: &[Category]) -> Result<Vec<Category>> {
        // Defaults are implied by the missing document; nothing to persist yet
        Ok(defaults.to_vec())
    }

    async fn add_category(&self, category: &Category) -> Result<Category> {
        let mut stored = category.clone();
        stored.id = Some(Uuid::new_v4().to_string());

        let mut categories = self.read_all()?;
        categories.push(stored.clone());
        self.write_all(&categories)?;
        info!("Stored local category '{}' ({:?})", stored.name, stored.id);
        Ok(stored)
    }

    async fn delete_category(&self, category: &Category) -> Result<bool> {
        let mut categories = self.read_all()?;
        let before = categories.len();
        categories.retain(|c| !c.same_record(category));
        if categories.len() == before {
            return Ok(false);
        }
        self.write_all(&categories)?;
        Ok(true)
    }

    async fn save_category_order(&self, categories: &[Category]) -> Result<()> {
        self.write_all(categories)
    }

    async fn set_default_category(&self, category: &Category) -> Result<()> {
        let mut categories = self.read_all()?;
        for existing in categories.iter_mut() {
            existing.is_default = existing.same_record(category);
        }
        self.write_all(&categories)
    }

    async fn reset_categories(&self, defaults: &[Category]) -> Result<Vec<Category>> {
        self.write_all(defaults)?;
        info!("Reset local categories to {} defaults", defaults.len());
        Ok(defaults.to_vec())
    }
}
