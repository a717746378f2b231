//! Domain layer: repositories, sync, aggregation and the session that binds
//! them to a storage backend.

pub mod category_service;
pub mod errors;
pub mod expense_service;
pub mod export_service;
pub mod session;
pub mod statistics;
pub mod storage_mode;
pub mod sync_service;

pub use category_service::CategoryService;
pub use errors::{DomainError, DomainResult};
pub use expense_service::ExpenseService;
pub use export_service::ExportService;
pub use session::ExpenseSession;
pub use storage_mode::StorageModeSelector;
pub use sync_service::SyncService;
