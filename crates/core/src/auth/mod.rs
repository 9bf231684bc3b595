//! Authentication and authorization primitives.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - User role definitions
//! - Capability sets derived from roles

mod capability;
mod password;

pub use capability::{Capabilities, Capability, Role};
pub use password::{PasswordError, hash_password, verify_password};
