//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application.

pub mod attachment;
pub mod expense;
pub mod fund;
pub mod notification;
pub mod user;

pub use attachment::AttachmentRepository;
pub use expense::{ExpenseFilter, ExpenseRepoError, ExpenseRepository};
pub use fund::{FundOverview, FundRepoError, FundRepository};
pub use notification::NotificationRepository;
pub use user::UserRepository;
