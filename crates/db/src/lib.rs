//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - Database migrations
//!
//! The expense approval path is the only operation that needs cross-row
//! atomicity; it runs inside a SERIALIZABLE transaction (see
//! `repositories::expense`).

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    AttachmentRepository, ExpenseRepository, FundRepository, NotificationRepository,
    UserRepository,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
