//! # Category Repository
//!
//! Owns the in-memory category list of the active session. The list is kept
//! sorted by `order_index`; names are unique ignoring case, and at most one
//! category is the default.
//!
//! Reordering and switching the default are optimistic: memory changes first
//! and stays changed even if the backend write fails.

use shared::{default_categories, Category, CategoryStyle, NewCategory};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::errors::{DomainError, DomainResult};
use crate::storage::CategoryStorage;

pub struct CategoryService {
    storage: Arc<dyn CategoryStorage>,
    categories: Vec<Category>,
}

impl CategoryService {
    pub fn new(storage: Arc<dyn CategoryStorage>) -> Self {
        Self {
            storage,
            categories: Vec::new(),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.storage.backend_name()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Load the owner's categories, seeding the defaults on first use
    pub async fn load(&mut self) -> &[Category] {
        let loaded = match self.storage.list_categories().await {
            Ok(categories) if categories.is_empty() => {
                info!("No categories yet, seeding defaults");
                self.storage.seed_categories(&default_categories()).await
            }
            other => other,
        };

        self.categories = match loaded {
            Ok(categories) if !categories.is_empty() => categories,
            Ok(_) => default_categories(),
            Err(e) => {
                error!(
                    "Failed to load categories from {} storage: {:#}",
                    self.storage.backend_name(),
                    e
                );
                default_categories()
            }
        };
        sort_by_order(&mut self.categories);
        &self.categories
    }

    pub async fn add(&mut self, new_category: &NewCategory) -> DomainResult<Category> {
        let name = new_category.name.trim();
        if self.categories.iter().any(|c| c.has_name_like(name)) {
            return Err(DomainError::DuplicateCategory(name.to_string()));
        }

        let mut category = Category::new(name, &new_category.color, &new_category.icon);
        category.order_index = Some(self.categories.len() as i64);

        let stored = self.storage.add_category(&category).await?;
        self.categories.push(stored.clone());
        info!("Added category '{}'", stored.name);
        Ok(stored)
    }

    /// Delete by id or exact name; the default is not handed to another category
    pub async fn delete(&mut self, key: &str) -> DomainResult<Category> {
        let target = self
            .find(key)
            .cloned()
            .ok_or_else(|| DomainError::CategoryNotFound(key.to_string()))?;

        if !self.storage.delete_category(&target).await? {
            warn!(
                "Category '{}' was not present in {} storage",
                target.name,
                self.storage.backend_name()
            );
        }

        self.categories.retain(|c| !c.same_record(&target));
        info!("Deleted category '{}'", target.name);
        Ok(target)
    }

    /// Adopt `ordered` as the new order, renumbering from 0
    pub async fn reorder(&mut self, ordered: Vec<Category>) -> DomainResult<&[Category]> {
        self.categories = ordered
            .into_iter()
            .enumerate()
            .map(|(index, mut category)| {
                category.order_index = Some(index as i64);
                category
            })
            .collect();

        if let Err(e) = self.storage.save_category_order(&self.categories).await {
            error!("Failed to persist category order: {:#}", e);
            return Err(e.into());
        }
        Ok(&self.categories)
    }

    /// Resolve keys (ids or names) against the current list and reorder
    ///
    /// Categories missing from `keys` keep their relative order after the listed ones.
    pub async fn reorder_by_keys(&mut self, keys: &[String]) -> DomainResult<&[Category]> {
        let mut remaining = self.categories.clone();
        let mut ordered = Vec::with_capacity(remaining.len());

        for key in keys {
            let position = remaining
                .iter()
                .position(|c| c.id.as_deref() == Some(key.as_str()))
                .or_else(|| remaining.iter().position(|c| c.name == *key))
                .ok_or_else(|| DomainError::CategoryNotFound(key.clone()))?;
            ordered.push(remaining.remove(position));
        }
        ordered.extend(remaining);

        self.reorder(ordered).await
    }

    pub async fn set_default(&mut self, key: &str) -> DomainResult<Category> {
        let target = self
            .find(key)
            .cloned()
            .ok_or_else(|| DomainError::CategoryNotFound(key.to_string()))?;

        for category in self.categories.iter_mut() {
            category.is_default = category.same_record(&target);
        }

        if let Err(e) = self.storage.set_default_category(&target).await {
            error!("Failed to persist default category '{}': {:#}", target.name, e);
            return Err(e.into());
        }

        info!("Default category is now '{}'", target.name);
        Ok(Category {
            is_default: true,
            ..target
        })
    }

    pub async fn reset_to_defaults(&mut self) -> DomainResult<&[Category]> {
        let mut stored = self.storage.reset_categories(&default_categories()).await?;
        sort_by_order(&mut stored);
        self.categories = stored;
        info!("Categories reset to defaults");
        Ok(&self.categories)
    }

    pub fn default_category(&self) -> Option<&Category> {
        self.categories.iter().find(|c| c.is_default)
    }

    /// Find by id, then by exact name
    pub fn find(&self, key: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|c| c.id.as_deref() == Some(key))
            .or_else(|| self.categories.iter().find(|c| c.name == key))
    }

    /// Icon and color for an expense's category name, with a fallback for unknown names
    pub fn style_for(&self, name: &str) -> CategoryStyle {
        self.categories
            .iter()
            .find(|c| c.name == name)
            .map(Category::style)
            .unwrap_or_else(CategoryStyle::fallback)
    }
}

fn sort_by_order(categories: &mut [Category]) {
    categories.sort_by_key(|c| c.order_index.unwrap_or(0));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_utils::{FailingCategoryStorage, TestEnvironment};
    use crate::storage::BackendTarget;

    fn names(categories: &[Category]) -> Vec<&str> {
        categories.iter().map(|c| c.name.as_str()).collect()
    }

    fn pets() -> NewCategory {
        NewCategory {
            name: "Pets".to_string(),
            color: "#123456".to_string(),
            icon: "🐶".to_string(),
        }
    }

    async fn local_service(env: &TestEnvironment) -> CategoryService {
        let storage = env.backends().category_storage(&BackendTarget::Local);
        let mut service = CategoryService::new(storage);
        service.load().await;
        service
    }

    async fn remote_service(env: &TestEnvironment, user_id: &str) -> CategoryService {
        let target = BackendTarget::Remote {
            user_id: user_id.to_string(),
        };
        let mut service = CategoryService::new(env.backends().category_storage(&target));
        service.load().await;
        service
    }

    #[tokio::test]
    async fn test_first_load_uses_defaults() {
        let env = TestEnvironment::new().unwrap();
        let service = local_service(&env).await;
        assert_eq!(names(service.categories()), names(&default_categories()));
    }

    #[tokio::test]
    async fn test_remote_first_load_seeds_with_ids() {
        let env = TestEnvironment::with_remote().await.unwrap();
        let service = remote_service(&env, "user-1").await;

        assert_eq!(names(service.categories()), names(&default_categories()));
        assert!(service.categories().iter().all(|c| c.id.is_some()));

        // Seeding happens once
        let again = remote_service(&env, "user-1").await;
        assert_eq!(again.categories().len(), 8);
    }

    #[tokio::test]
    async fn test_failed_load_shows_defaults() {
        let mut service = CategoryService::new(Arc::new(FailingCategoryStorage));
        assert_eq!(names(service.load().await), names(&default_categories()));
    }

    #[tokio::test]
    async fn test_add_appends_with_next_index() {
        let env = TestEnvironment::new().unwrap();
        let mut service = local_service(&env).await;

        let added = service.add(&pets()).await.unwrap();
        assert_eq!(added.order_index, Some(8));
        assert_eq!(service.categories().last().unwrap().name, "Pets");

        let reloaded = local_service(&env).await;
        assert_eq!(reloaded.categories().len(), 9);
    }

    #[tokio::test]
    async fn test_local_add_generates_id_that_survives_reload() {
        let env = TestEnvironment::new().unwrap();
        let mut service = local_service(&env).await;

        let added = service.add(&pets()).await.unwrap();
        let id = added.id.clone().expect("local add assigns an id");
        assert_eq!(service.categories().last().unwrap().id.as_deref(), Some(id.as_str()));

        let mut reloaded = local_service(&env).await;
        let pets = reloaded.find(&id).cloned().unwrap();
        assert_eq!(pets.name, "Pets");

        let default = reloaded.set_default(&id).await.unwrap();
        assert_eq!(default.id.as_deref(), Some(id.as_str()));

        let deleted = reloaded.delete(&id).await.unwrap();
        assert_eq!(deleted.name, "Pets");
        assert!(local_service(&env).await.find("Pets").is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected_without_change() {
        let env = TestEnvironment::new().unwrap();
        let mut service = local_service(&env).await;
        let before = service.categories().to_vec();

        let duplicate = NewCategory {
            name: "food".to_string(),
            color: "#000000".to_string(),
            icon: "x".to_string(),
        };
        let result = service.add(&duplicate).await;

        assert!(matches!(result, Err(DomainError::DuplicateCategory(_))));
        assert_eq!(service.categories(), before.as_slice());
    }

    #[tokio::test]
    async fn test_delete_resolves_id_then_name() {
        let env = TestEnvironment::with_remote().await.unwrap();
        let mut service = remote_service(&env, "user-1").await;
        let transport_id = service.find("Transport").unwrap().id.clone().unwrap();

        service.delete(&transport_id).await.unwrap();
        service.delete("Food").await.unwrap();
        assert!(matches!(
            service.delete("Food").await,
            Err(DomainError::CategoryNotFound(_))
        ));

        let reloaded = remote_service(&env, "user-1").await;
        assert_eq!(reloaded.categories().len(), 6);
        assert!(reloaded.find("Transport").is_none());
    }

    #[tokio::test]
    async fn test_deleting_default_leaves_none() {
        let env = TestEnvironment::new().unwrap();
        let mut service = local_service(&env).await;

        service.set_default("Food").await.unwrap();
        service.delete("Food").await.unwrap();

        assert!(service.default_category().is_none());
        assert!(service.find("Food").is_none());
        assert!(local_service(&env).await.default_category().is_none());
    }

    #[tokio::test]
    async fn test_reorder_rewrites_indices() {
        let env = TestEnvironment::new().unwrap();
        let mut service = local_service(&env).await;
        let a = Category::new("A", "#000001", "a");
        let b = Category::new("B", "#000002", "b");
        let c = Category::new("C", "#000003", "c");

        let reordered = service.reorder(vec![c, a, b]).await.unwrap();
        let indexed: Vec<(&str, Option<i64>)> = reordered
            .iter()
            .map(|c| (c.name.as_str(), c.order_index))
            .collect();
        assert_eq!(indexed, vec![("C", Some(0)), ("A", Some(1)), ("B", Some(2))]);

        let reloaded = local_service(&env).await;
        assert_eq!(names(reloaded.categories()), vec!["C", "A", "B"]);
    }

    #[tokio::test]
    async fn test_reorder_by_keys_on_remote() {
        let env = TestEnvironment::with_remote().await.unwrap();
        let mut service = remote_service(&env, "user-1").await;
        let other_id = service.find("Other").unwrap().id.clone().unwrap();

        service
            .reorder_by_keys(&[other_id, "Bills".to_string()])
            .await
            .unwrap();
        assert_eq!(names(&service.categories()[..3]), vec!["Other", "Bills", "Food"]);

        let reloaded = remote_service(&env, "user-1").await;
        assert_eq!(names(&reloaded.categories()[..3]), vec!["Other", "Bills", "Food"]);
        let indices: Vec<i64> = reloaded
            .categories()
            .iter()
            .map(|c| c.order_index.unwrap())
            .collect();
        assert_eq!(indices, (0..8).collect::<Vec<i64>>());

        assert!(matches!(
            service.reorder_by_keys(&["Nope".to_string()]).await,
            Err(DomainError::CategoryNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_reorder_is_optimistic() {
        let mut service = CategoryService::new(Arc::new(FailingCategoryStorage));
        service.load().await;
        let mut reversed = service.categories().to_vec();
        reversed.reverse();

        assert!(service.reorder(reversed).await.is_err());
        assert_eq!(service.categories()[0].name, "Other");
        assert_eq!(service.categories()[0].order_index, Some(0));
    }

    #[tokio::test]
    async fn test_set_default_switches_exclusively() {
        let env = TestEnvironment::with_remote().await.unwrap();
        let mut service = remote_service(&env, "user-1").await;

        service.set_default("Food").await.unwrap();
        service.set_default("Health").await.unwrap();
        assert_eq!(service.default_category().unwrap().name, "Health");
        assert_eq!(service.categories().iter().filter(|c| c.is_default).count(), 1);

        let reloaded = remote_service(&env, "user-1").await;
        let defaults: Vec<&str> = reloaded
            .categories()
            .iter()
            .filter(|c| c.is_default)
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(defaults, vec!["Health"]);
    }

    #[tokio::test]
    async fn test_set_default_is_optimistic() {
        let mut service = CategoryService::new(Arc::new(FailingCategoryStorage));
        service.load().await;

        assert!(service.set_default("Bills").await.is_err());
        assert_eq!(service.default_category().unwrap().name, "Bills");
        assert!(matches!(
            service.set_default("Nope").await,
            Err(DomainError::CategoryNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_reset_restores_defaults() {
        let env = TestEnvironment::with_remote().await.unwrap();
        let mut service = remote_service(&env, "user-1").await;
        service.add(&pets()).await.unwrap();
        service.delete("Food").await.unwrap();

        service.reset_to_defaults().await.unwrap();
        assert_eq!(names(service.categories()), names(&default_categories()));

        let reloaded = remote_service(&env, "user-1").await;
        assert_eq!(names(reloaded.categories()), names(&default_categories()));
    }

    #[tokio::test]
    async fn test_style_for_falls_back() {
        let env = TestEnvironment::new().unwrap();
        let service = local_service(&env).await;

        assert_eq!(service.style_for("Food").icon, "🍔");
        assert_eq!(service.style_for("Gone"), CategoryStyle::fallback());
    }
}
