//! In-app notification kinds and message building.
//!
//! The notification sink is best-effort: the persistence layer records the
//! rows, callers log and swallow any failure, and nothing here ever rolls
//! back the operation that triggered the message.

mod types;

pub use types::{NotificationKind, NotificationMessage, Priority};
