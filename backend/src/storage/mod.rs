//! # Storage Layer
//!
//! Two persistence targets sit behind the traits in [`traits`]:
//!
//! - [`local`]: JSON documents in the data directory, always available
//! - [`remote`]: a per-user relational store, available only when configured
//!
//! [`StorageBackends`] owns both connections and hands out trait objects for
//! whichever target the current storage mode and session resolve to.

pub mod local;
pub mod remote;
pub mod traits;

#[cfg(test)]
pub mod test_utils;

use std::sync::Arc;

use shared::StorageMode;

pub use local::LocalConnection;
pub use remote::RemoteConnection;
pub use traits::{CategoryStorage, ExpenseStorage, PreferenceStorage};

/// The persistence target selected for the current session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendTarget {
    Local,
    Remote { user_id: String },
}

impl BackendTarget {
    pub fn is_remote(&self) -> bool {
        matches!(self, BackendTarget::Remote { .. })
    }
}

/// Both storage connections; the remote one is absent when not configured
#[derive(Clone)]
pub struct StorageBackends {
    local: LocalConnection,
    remote: Option<RemoteConnection>,
}

impl StorageBackends {
    pub fn new(local: LocalConnection, remote: Option<RemoteConnection>) -> Self {
        Self { local, remote }
    }

    pub fn remote_available(&self) -> bool {
        self.remote.is_some()
    }

    /// Pick the target: remote only in remote mode with a signed-in user and a configured store
    pub fn resolve(&self, mode: StorageMode, user_id: Option<&str>) -> BackendTarget {
        match (mode, user_id) {
            (StorageMode::Remote, Some(user_id)) if self.remote.is_some() => BackendTarget::Remote {
                user_id: user_id.to_string(),
            },
            _ => BackendTarget::Local,
        }
    }

    pub fn expense_storage(&self, target: &BackendTarget) -> Arc<dyn ExpenseStorage> {
        match target {
            BackendTarget::Remote { user_id } => match self.remote_expense_storage(user_id) {
                Some(storage) => storage,
                None => self.local_expense_storage(),
            },
            BackendTarget::Local => self.local_expense_storage(),
        }
    }

    pub fn category_storage(&self, target: &BackendTarget) -> Arc<dyn CategoryStorage> {
        match (target, &self.remote) {
            (BackendTarget::Remote { user_id }, Some(remote)) => Arc::new(
                remote::RemoteCategoryRepository::new(remote.clone(), user_id),
            ),
            _ => Arc::new(local::CategoryRepository::new(self.local.clone())),
        }
    }

    pub fn local_expense_storage(&self) -> Arc<dyn ExpenseStorage> {
        Arc::new(local::ExpenseRepository::new(self.local.clone()))
    }

    /// Expense storage of `user_id` in the remote store, if one is configured
    pub fn remote_expense_storage(&self, user_id: &str) -> Option<Arc<dyn ExpenseStorage>> {
        self.remote.as_ref().map(|remote| {
            Arc::new(remote::RemoteExpenseRepository::new(remote.clone(), user_id))
                as Arc<dyn ExpenseStorage>
        })
    }

    pub fn preference_storage(&self) -> Arc<dyn PreferenceStorage> {
        Arc::new(local::PreferenceRepository::new(self.local.clone()))
    }
}
