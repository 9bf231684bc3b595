//! `SeaORM` entity definitions.

pub mod attachments;
pub mod expenses;
pub mod funds;
pub mod notifications;
pub mod sea_orm_active_enums;
pub mod users;
