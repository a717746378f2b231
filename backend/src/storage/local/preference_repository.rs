//! # Local Preference Repository
//!
//! Stores user preferences in a single YAML file `preferences.yaml` at the root
//! of the data directory.
//!
//! ## YAML Format
//!
//! ```yaml
//! storage_mode: remote
//! created_at: "2024-03-01T09:30:00Z"
//! updated_at: "2024-03-02T18:05:00Z"
//! ```
//!
//! An unreadable or unknown `storage_mode` value is reported as "no preference"
//! so the mode selector can fall back to its own defaults.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use shared::StorageMode;
use std::fs;
use tracing::{debug, info, warn};

use super::connection::LocalConnection;
use crate::storage::traits::PreferenceStorage;

/// Contents of the preferences file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    /// Raw mode value; kept as a string so unknown values do not fail the whole file
    pub storage_mode: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Default for Preferences {
    fn default() -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            storage_mode: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

#[derive(Clone)]
pub struct PreferenceRepository {
    connection: LocalConnection,
}

impl PreferenceRepository {
    pub fn new(connection: LocalConnection) -> Self {
        Self { connection }
    }

    fn read_preferences(&self) -> Result<Option<Preferences>> {
        let path = self.connection.preferences_path();
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let preferences = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Some(preferences))
    }

    fn write_preferences(&self, preferences: &Preferences) -> Result<()> {
        let content = serde_yaml::to_string(preferences)?;
        self.connection
            .write_atomic(&self.connection.preferences_path(), content.as_bytes())
    }
}

impl PreferenceStorage for PreferenceRepository {
    fn load_storage_mode(&self) -> Result<Option<StorageMode>> {
        let Some(preferences) = self.read_preferences()? else {
            debug!("No preferences file, storage mode not set");
            return Ok(None);
        };

        let Some(raw) = preferences.storage_mode else {
            return Ok(None);
        };

        match serde_yaml::from_str::<StorageMode>(&raw) {
            Ok(mode) => Ok(Some(mode)),
            Err(_) => {
                warn!("Ignoring unknown saved storage mode '{}'", raw);
                Ok(None)
            }
        }
    }

    fn save_storage_mode(&self, mode: StorageMode) -> Result<()> {
        // A corrupt file is replaced rather than blocking the save
        let mut preferences = self.read_preferences().ok().flatten().unwrap_or_default();
        preferences.storage_mode = Some(mode.to_string());
        preferences.updated_at = Utc::now().to_rfc3339();
        self.write_preferences(&preferences)?;
        info!("Saved storage mode preference: {}", mode);
        Ok(())
    }
}
