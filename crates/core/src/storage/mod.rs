//! Receipt storage using Apache OpenDAL.
//!
//! Receipts never pass through the application: clients upload and download
//! against presigned URLs, and only the stable storage reference is kept on
//! the expense. Supported backends:
//! - S3-compatible: Cloudflare R2, Supabase Storage, AWS S3
//! - Local filesystem (development only)

mod config;
mod error;
mod service;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::{PresignedUrl, ReceiptMetadata, ReceiptStorage, UploadRequest};
