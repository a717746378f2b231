//! Relational per-user storage backed by sqlx.

pub mod category_repository;
pub mod connection;
pub mod expense_repository;

pub use category_repository::RemoteCategoryRepository;
pub use connection::RemoteConnection;
pub use expense_repository::RemoteExpenseRepository;
