//! # Sync Service
//!
//! One-shot bulk copies between the local and remote expense collections.
//!
//! - local to remote: every local record is uploaded individually, keyed by its
//!   local id so a repeated sync skips what is already there. Failures of single
//!   records are counted, not raised.
//! - remote to local: the remote collection overwrites the local snapshot.
//!
//! All preconditions are checked before anything is written.

use anyhow::Result;
use shared::{Expense, StorageMode, SyncDirection, SyncReport};
use tracing::{info, warn};

use super::errors::{DomainError, DomainResult};
use super::expense_service::ExpenseService;
use crate::storage::{ExpenseStorage, StorageBackends};

#[derive(Clone)]
pub struct SyncService {
    backends: StorageBackends,
}

impl SyncService {
    pub fn new(backends: StorageBackends) -> Self {
        Self { backends }
    }

    /// Upload the local snapshot to the signed-in user's remote collection
    pub async fn local_to_remote(
        &self,
        mode: StorageMode,
        user_id: Option<&str>,
        expenses: &mut ExpenseService,
    ) -> DomainResult<SyncReport> {
        if mode != StorageMode::Remote {
            return Err(DomainError::WrongMode(StorageMode::Remote));
        }
        let user_id = user_id.ok_or(DomainError::NotSignedIn)?;
        let remote = self
            .backends
            .remote_expense_storage(user_id)
            .ok_or(DomainError::RemoteUnavailable)?;

        let local = self.backends.local_expense_storage();
        let local_expenses = local.list_expenses().await?;
        if local_expenses.is_empty() {
            return Err(DomainError::NothingToSync("local"));
        }

        info!("📤 SYNC: uploading {} local expenses for {}", local_expenses.len(), user_id);
        let report = upload(&local_expenses, remote.as_ref()).await;
        info!("📤 SYNC: {}", report.message);

        expenses.load().await;
        Ok(report)
    }

    /// Overwrite the local snapshot with the signed-in user's remote collection
    pub async fn remote_to_local(
        &self,
        mode: StorageMode,
        user_id: Option<&str>,
        expenses: &mut ExpenseService,
    ) -> DomainResult<SyncReport> {
        if mode != StorageMode::Local {
            return Err(DomainError::WrongMode(StorageMode::Local));
        }
        let user_id = user_id.ok_or(DomainError::NotSignedIn)?;
        let remote = self
            .backends
            .remote_expense_storage(user_id)
            .ok_or(DomainError::RemoteUnavailable)?;

        let local = self.backends.local_expense_storage();
        let remote_expenses = download(remote.as_ref(), local.as_ref()).await?;
        if remote_expenses.is_empty() {
            return Err(DomainError::NothingToSync("cloud"));
        }

        let count = remote_expenses.len();
        expenses.replace_in_memory(remote_expenses);

        let report = SyncReport {
            direction: SyncDirection::RemoteToLocal,
            attempted: count,
            succeeded: count,
            skipped: 0,
            message: format!("Successfully synced {} expenses from cloud to local", count),
        };
        info!("📥 SYNC: {}", report.message);
        Ok(report)
    }
}

async fn upload(records: &[Expense], destination: &dyn ExpenseStorage) -> SyncReport {
    let mut succeeded = 0;
    let mut skipped = 0;

    for expense in records {
        match destination.import_expense(expense).await {
            Ok(true) => succeeded += 1,
            Ok(false) => skipped += 1,
            Err(e) => warn!("Failed to upload expense {}: {:#}", expense.id, e),
        }
    }

    let mut message = format!(
        "Successfully synced {} of {} expenses to cloud",
        succeeded,
        records.len()
    );
    if skipped > 0 {
        message.push_str(&format!(" ({} already in cloud)", skipped));
    }

    SyncReport {
        direction: SyncDirection::LocalToRemote,
        attempted: records.len(),
        succeeded,
        skipped,
        message,
    }
}

/// Copy the source collection over the destination; nothing is written when the source is empty
async fn download(source: &dyn ExpenseStorage, destination: &dyn ExpenseStorage) -> Result<Vec<Expense>> {
    let records = source.list_expenses().await?;
    if !records.is_empty() {
        destination.replace_expenses(&records).await?;
    }
    Ok(records)
}
