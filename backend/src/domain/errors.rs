use shared::StorageMode;

/// Errors surfaced by the expense and category repositories and the sync service
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Category \"{0}\" already exists")]
    DuplicateCategory(String),
    #[error("Category \"{0}\" not found")]
    CategoryNotFound(String),
    #[error("Invalid import format: {0}")]
    InvalidImportFormat(String),
    #[error("Please switch to {} mode first", mode_label(.0))]
    WrongMode(StorageMode),
    #[error("Please log in first")]
    NotSignedIn,
    #[error("Remote storage is not configured")]
    RemoteUnavailable,
    #[error("No {0} data to sync")]
    NothingToSync(&'static str),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

fn mode_label(mode: &StorageMode) -> &'static str {
    match mode {
        StorageMode::Local => "Local",
        StorageMode::Remote => "Cloud",
    }
}

impl DomainError {
    /// Whether the error is a caller-side precondition rather than a backend fault
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            DomainError::WrongMode(_)
                | DomainError::NotSignedIn
                | DomainError::RemoteUnavailable
                | DomainError::NothingToSync(_)
        )
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
