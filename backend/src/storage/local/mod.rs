//! On-device document storage.
//!
//! ```text
//! {data_dir}/
//! ├── expense-tracker-data.json        expense array
//! ├── expense-tracker-categories.json  category array (absent until customised)
//! └── preferences.yaml                 storage mode
//! ```

pub mod category_repository;
pub mod connection;
pub mod expense_repository;
pub mod preference_repository;

pub use category_repository::CategoryRepository;
pub use connection::LocalConnection;
pub use expense_repository::ExpenseRepository;
pub use preference_repository::PreferenceRepository;
