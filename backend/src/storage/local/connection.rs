use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Storage key of the expense document
pub const EXPENSES_KEY: &str = "expense-tracker-data";
/// Storage key of the category document
pub const CATEGORIES_KEY: &str = "expense-tracker-categories";
/// File holding user preferences such as the storage mode
pub const PREFERENCES_FILE: &str = "preferences.yaml";

/// LocalConnection manages the data directory that holds the on-device documents
///
/// Each storage key maps to one JSON file `<key>.json` inside the base directory.
#[derive(Clone, Debug)]
pub struct LocalConnection {
    base_directory: PathBuf,
}

impl LocalConnection {
    /// Create a new local connection, creating the base directory if needed
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).with_context(|| {
                format!("Failed to create data directory {}", base_path.display())
            })?;
            info!("Created data directory: {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Get the file path backing a storage key
    pub fn document_path(&self, key: &str) -> PathBuf {
        self.base_directory.join(format!("{}.json", key))
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.base_directory.join(PREFERENCES_FILE)
    }

    /// Read and parse a JSON document; `None` when it has never been written
    pub fn read_document<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.document_path(key);
        if !path.exists() {
            debug!("No document stored under '{}'", key);
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if content.trim().is_empty() {
            warn!("Document '{}' is empty, treating it as missing", key);
            return Ok(None);
        }

        let value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Some(value))
    }

    /// Serialize and write a JSON document atomically
    pub fn write_document<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let content = serde_json::to_string(value)?;
        self.write_atomic(&self.document_path(key), content.as_bytes())?;
        debug!("Saved document '{}'", key);
        Ok(())
    }

    /// Write to a temp file next to the target, then rename over it
    pub fn write_atomic(&self, path: &Path, content: &[u8]) -> Result<()> {
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, content)
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to move {} into place", path.display()))?;
        Ok(())
    }
}
