//! # Session
//!
//! Holds the signed-in user and the storage mode, and keeps the expense and
//! category repositories bound to the backend those two resolve to. Any change
//! of user or mode rebinds both repositories and reloads them.

use shared::{SessionResponse, StorageMode, SyncReport};
use tracing::info;

use super::category_service::CategoryService;
use super::errors::DomainResult;
use super::expense_service::ExpenseService;
use super::storage_mode::StorageModeSelector;
use super::sync_service::SyncService;
use crate::storage::{BackendTarget, StorageBackends};

pub struct ExpenseSession {
    backends: StorageBackends,
    mode_selector: StorageModeSelector,
    user_id: Option<String>,
    target: BackendTarget,
    expense_service: ExpenseService,
    category_service: CategoryService,
    sync_service: SyncService,
}

impl ExpenseSession {
    /// Open a signed-out session with the saved storage mode and load its data
    pub async fn open(backends: StorageBackends) -> Self {
        let mode_selector =
            StorageModeSelector::new(backends.preference_storage(), backends.remote_available());
        let target = backends.resolve(mode_selector.mode(), None);

        let mut session = Self {
            expense_service: ExpenseService::new(
                backends.expense_storage(&target),
                backends.local_expense_storage(),
            ),
            category_service: CategoryService::new(backends.category_storage(&target)),
            sync_service: SyncService::new(backends.clone()),
            backends,
            mode_selector,
            user_id: None,
            target,
        };
        session.reload().await;
        session
    }

    pub fn storage_mode(&self) -> StorageMode {
        self.mode_selector.mode()
    }

    pub fn remote_available(&self) -> bool {
        self.mode_selector.remote_available()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn target(&self) -> &BackendTarget {
        &self.target
    }

    pub fn describe(&self) -> SessionResponse {
        SessionResponse {
            user_id: self.user_id.clone(),
            storage_mode: self.storage_mode(),
            remote_available: self.remote_available(),
            using_remote: self.target.is_remote(),
        }
    }

    /// Change the storage mode; returns false when the mode was refused
    pub async fn set_storage_mode(&mut self, mode: StorageMode) -> bool {
        let previous = self.storage_mode();
        if !self.mode_selector.set_mode(mode) {
            return false;
        }
        if previous != mode {
            info!("Storage mode changed from {} to {}", previous, mode);
            self.rebind().await;
        }
        true
    }

    /// Accept the user identifier supplied by the auth collaborator
    pub async fn sign_in(&mut self, user_id: &str) {
        if self.user_id.as_deref() == Some(user_id) {
            return;
        }
        info!("User {} signed in", user_id);
        self.user_id = Some(user_id.to_string());
        self.rebind().await;
    }

    pub async fn sign_out(&mut self) {
        if let Some(user_id) = self.user_id.take() {
            info!("User {} signed out", user_id);
            self.rebind().await;
        }
    }

    /// Point both repositories at the backend for the current mode and user, then reload
    async fn rebind(&mut self) {
        self.target = self
            .backends
            .resolve(self.mode_selector.mode(), self.user_id.as_deref());
        self.expense_service = ExpenseService::new(
            self.backends.expense_storage(&self.target),
            self.backends.local_expense_storage(),
        );
        self.category_service = CategoryService::new(self.backends.category_storage(&self.target));
        info!(
            "Repositories bound to {} storage",
            self.expense_service.backend_name()
        );
        self.reload().await;
    }

    pub async fn reload(&mut self) {
        self.expense_service.load().await;
        self.category_service.load().await;
    }

    pub fn expenses(&self) -> &ExpenseService {
        &self.expense_service
    }

    pub fn expenses_mut(&mut self) -> &mut ExpenseService {
        &mut self.expense_service
    }

    pub fn categories(&self) -> &CategoryService {
        &self.category_service
    }

    pub fn categories_mut(&mut self) -> &mut CategoryService {
        &mut self.category_service
    }

    pub async fn sync_local_to_remote(&mut self) -> DomainResult<SyncReport> {
        let mode = self.mode_selector.mode();
        self.sync_service
            .local_to_remote(mode, self.user_id.as_deref(), &mut self.expense_service)
            .await
    }

    pub async fn sync_remote_to_local(&mut self) -> DomainResult<SyncReport> {
        let mode = self.mode_selector.mode();
        self.sync_service
            .remote_to_local(mode, self.user_id.as_deref(), &mut self.expense_service)
            .await
    }
}
