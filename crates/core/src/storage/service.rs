//! Receipt storage service implementation using Apache OpenDAL.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use opendal::{ErrorKind, Operator, services};
use uuid::Uuid;

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;

/// Presigned URL for upload or download.
#[derive(Debug, Clone)]
pub struct PresignedUrl {
    /// The presigned URL.
    pub url: String,
    /// HTTP method to use (PUT for upload, GET for download).
    pub method: String,
    /// When the URL expires.
    pub expires_at: DateTime<Utc>,
    /// Required headers for the request.
    pub headers: HashMap<String, String>,
}

/// Request to generate an upload URL for a receipt.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// The user uploading the receipt.
    pub uploaded_by: Uuid,
    /// The expense the receipt belongs to, if already created.
    pub expense_id: Option<Uuid>,
    /// Attachment ID.
    pub attachment_id: Uuid,
    /// Original filename.
    pub filename: String,
    /// Content type (MIME type).
    pub content_type: String,
    /// File size in bytes.
    pub file_size: u64,
}

/// Metadata about an uploaded receipt.
#[derive(Debug, Clone)]
pub struct ReceiptMetadata {
    /// Storage key.
    pub storage_key: String,
    /// File size in bytes.
    pub file_size: u64,
    /// Content type.
    pub content_type: Option<String>,
}

/// Storage service for receipt files.
pub struct ReceiptStorage {
    operator: Operator,
    config: StorageConfig,
}

impl ReceiptStorage {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Ok(Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish())
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                Ok(Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish())
            }
        }
    }

    /// Validate upload request against config constraints.
    ///
    /// # Errors
    ///
    /// Returns an error if file size or MIME type is invalid.
    pub fn validate_upload(&self, content_type: &str, size: u64) -> Result<(), StorageError> {
        if size > self.config.max_file_size {
            return Err(StorageError::file_too_large(
                size,
                self.config.max_file_size,
            ));
        }

        if !self.config.is_mime_type_allowed(content_type) {
            return Err(StorageError::invalid_mime_type(content_type));
        }

        Ok(())
    }

    /// Generate the storage key for a receipt.
    ///
    /// Format: `{uploader_id}/{expense_id}/{attachment_id}/{sanitized_filename}`,
    /// with `unfiled` standing in for receipts uploaded before the expense
    /// record exists.
    #[must_use]
    pub fn generate_storage_key(req: &UploadRequest) -> String {
        let sanitized_filename = sanitize_filename(&req.filename);
        let expense_part = req
            .expense_id
            .map_or_else(|| "unfiled".to_string(), |id| id.to_string());

        format!(
            "{}/{}/{}/{}",
            req.uploaded_by, expense_part, req.attachment_id, sanitized_filename
        )
    }

    /// Generate presigned URL for upload.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or presigning is not supported.
    pub async fn presign_upload(&self, req: &UploadRequest) -> Result<PresignedUrl, StorageError> {
        self.validate_upload(&req.content_type, req.file_size)?;

        let key = Self::generate_storage_key(req);
        let ttl = Duration::from_secs(self.config.presign_upload_ttl_secs);

        let presigned = self
            .operator
            .presign_write(&key, ttl)
            .await
            .map_err(StorageError::from)?;

        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), req.content_type.clone());

        Ok(PresignedUrl {
            url: presigned.uri().to_string(),
            method: presigned.method().to_string(),
            expires_at: Utc::now()
                + chrono::Duration::seconds(
                    i64::try_from(self.config.presign_upload_ttl_secs).unwrap_or(i64::MAX),
                ),
            headers,
        })
    }

    /// Generate presigned URL for download.
    ///
    /// # Errors
    ///
    /// Returns an error if presigning is not supported or fails.
    pub async fn presign_download(&self, key: &str) -> Result<PresignedUrl, StorageError> {
        let ttl = Duration::from_secs(self.config.presign_download_ttl_secs);

        let presigned = self
            .operator
            .presign_read(key, ttl)
            .await
            .map_err(StorageError::from)?;

        Ok(PresignedUrl {
            url: presigned.uri().to_string(),
            method: presigned.method().to_string(),
            expires_at: Utc::now()
                + chrono::Duration::seconds(
                    i64::try_from(self.config.presign_download_ttl_secs).unwrap_or(i64::MAX),
                ),
            headers: HashMap::new(),
        })
    }

    /// Verify that a receipt actually landed in storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be accessed.
    pub async fn verify_upload(&self, key: &str) -> Result<ReceiptMetadata, StorageError> {
        let meta = self.operator.stat(key).await.map_err(StorageError::from)?;

        Ok(ReceiptMetadata {
            storage_key: key.to_string(),
            file_size: meta.content_length(),
            content_type: meta.content_type().map(String::from),
        })
    }

    /// Delete a receipt from storage.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.operator.delete(key).await.map_err(StorageError::from)
    }

    /// Check if a receipt exists in storage.
    pub async fn exists(&self, key: &str) -> bool {
        match self.operator.stat(key).await {
            Ok(_) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(_) => false,
        }
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

/// Sanitize filename for storage key.
///
/// Only ASCII alphanumeric characters, dots, hyphens, and underscores
/// survive; everything else becomes an underscore.
fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("receipt.pdf"), "receipt.pdf");
        assert_eq!(sanitize_filename("ticket (1).jpg"), "ticket__1_.jpg");
        assert_eq!(sanitize_filename("test@#$%.png"), "test____.png");
    }

    #[test]
    fn test_generate_storage_key() {
        let user_id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").expect("valid uuid");
        let expense_id =
            Uuid::parse_str("6ba7b810-9dad-11d1-80b4-00c04fd430c8").expect("valid uuid");
        let att_id = Uuid::parse_str("6ba7b811-9dad-11d1-80b4-00c04fd430c8").expect("valid uuid");

        let req = UploadRequest {
            uploaded_by: user_id,
            expense_id: Some(expense_id),
            attachment_id: att_id,
            filename: "receipt.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            file_size: 1024,
        };

        let key = ReceiptStorage::generate_storage_key(&req);
        let parts: Vec<&str> = key.split('/').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], user_id.to_string());
        assert_eq!(parts[1], expense_id.to_string());
        assert_eq!(parts[2], att_id.to_string());
        assert_eq!(parts[3], "receipt.pdf");
    }

    #[test]
    fn test_generate_storage_key_without_expense() {
        let req = UploadRequest {
            uploaded_by: Uuid::new_v4(),
            expense_id: None,
            attachment_id: Uuid::new_v4(),
            filename: "receipt.png".to_string(),
            content_type: "image/png".to_string(),
            file_size: 2048,
        };

        let key = ReceiptStorage::generate_storage_key(&req);
        assert!(key.contains("unfiled"));
    }

    #[test]
    fn test_validate_upload_size() {
        let config =
            StorageConfig::new(StorageProvider::local_fs("./test")).with_max_file_size(1024);
        let service = ReceiptStorage::from_config(config).expect("should create service");

        assert!(service.validate_upload("application/pdf", 512).is_ok());

        let err = service
            .validate_upload("application/pdf", 2048)
            .unwrap_err();
        assert!(matches!(err, StorageError::FileTooLarge { .. }));
    }

    #[test]
    fn test_validate_upload_mime_type() {
        let config = StorageConfig::new(StorageProvider::local_fs("./test"));
        let service = ReceiptStorage::from_config(config).expect("should create service");

        assert!(service.validate_upload("application/pdf", 1024).is_ok());
        assert!(service.validate_upload("image/jpeg", 1024).is_ok());

        let err = service
            .validate_upload("application/x-executable", 1024)
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidMimeType { .. }));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    // For any upload request, the service accepts only MIME types in the
    // allowed list and rejects all others.
    proptest! {
        #[test]
        fn prop_mime_type_validation(mime_type in "[a-z]+/[a-z0-9-]+") {
            let config = StorageConfig::new(StorageProvider::local_fs("./test"));
            let service = ReceiptStorage::from_config(config.clone())
                .expect("should create service");

            let result = service.validate_upload(&mime_type, 1024);
            let is_allowed = config.is_mime_type_allowed(&mime_type);

            if is_allowed {
                prop_assert!(result.is_ok(), "Expected Ok for allowed MIME type");
            } else {
                let is_invalid_mime = matches!(result, Err(StorageError::InvalidMimeType { .. }));
                prop_assert!(is_invalid_mime, "Expected InvalidMimeType error");
            }
        }
    }

    // Any file larger than the configured limit is refused.
    proptest! {
        #[test]
        fn prop_file_size_validation(
            max_size in 1024u64..10_000_000,
            file_size in 0u64..20_000_000,
        ) {
            let config = StorageConfig::new(StorageProvider::local_fs("./test"))
                .with_max_file_size(max_size);
            let service = ReceiptStorage::from_config(config)
                .expect("should create service");

            let result = service.validate_upload("application/pdf", file_size);

            if file_size <= max_size {
                prop_assert!(result.is_ok(), "Expected Ok for valid file size");
            } else {
                let is_too_large = matches!(result, Err(StorageError::FileTooLarge { .. }));
                prop_assert!(is_too_large, "Expected FileTooLarge error");
            }
        }
    }

    // Sanitized filenames only ever contain safe characters.
    proptest! {
        #[test]
        fn prop_sanitized_filename_safe_chars(filename in ".*") {
            let sanitized = sanitize_filename(&filename);

            for c in sanitized.chars() {
                let is_safe = c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_';
                prop_assert!(is_safe, "Unexpected character in sanitized filename: {}", c);
            }
        }
    }
}
