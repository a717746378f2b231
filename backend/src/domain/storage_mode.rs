//! Selection of the authoritative storage backend.

use shared::StorageMode;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::storage::PreferenceStorage;

/// Tracks the active storage mode and persists the user's choice
pub struct StorageModeSelector {
    mode: StorageMode,
    remote_available: bool,
    preferences: Arc<dyn PreferenceStorage>,
}

impl StorageModeSelector {
    /// Restore the saved mode, falling back to remote when it is available
    pub fn new(preferences: Arc<dyn PreferenceStorage>, remote_available: bool) -> Self {
        let saved = match preferences.load_storage_mode() {
            Ok(saved) => saved,
            Err(e) => {
                warn!("Failed to read storage mode preference: {}", e);
                None
            }
        };

        let mode = match saved {
            Some(StorageMode::Local) => StorageMode::Local,
            Some(StorageMode::Remote) if remote_available => StorageMode::Remote,
            _ if remote_available => StorageMode::Remote,
            _ => StorageMode::Local,
        };

        info!(
            "Storage mode: {} (saved: {:?}, remote available: {})",
            mode, saved, remote_available
        );

        Self {
            mode,
            remote_available,
            preferences,
        }
    }

    pub fn mode(&self) -> StorageMode {
        self.mode
    }

    pub fn remote_available(&self) -> bool {
        self.remote_available
    }

    /// Switch mode; returns false when remote is requested but not available
    pub fn set_mode(&mut self, mode: StorageMode) -> bool {
        if mode == StorageMode::Remote && !self.remote_available {
            warn!("Remote storage is not configured, staying in {} mode", self.mode);
            return false;
        }

        self.mode = mode;
        if let Err(e) = self.preferences.save_storage_mode(mode) {
            error!("Failed to persist storage mode {}: {}", mode, e);
        }
        true
    }
}
