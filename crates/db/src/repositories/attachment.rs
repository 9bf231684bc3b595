//! Attachment repository for receipt references.
//!
//! Only the storage reference is persisted; the bytes live in object
//! storage behind presigned URLs.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::attachments;

/// Input for recording an uploaded receipt.
#[derive(Debug, Clone)]
pub struct CreateAttachmentInput {
    /// Attachment ID (fixed before upload so the storage key is stable).
    pub id: Uuid,
    /// The expense the receipt belongs to.
    pub expense_id: Uuid,
    /// The uploading user.
    pub uploaded_by: Uuid,
    /// Original filename.
    pub filename: String,
    /// Stable storage reference.
    pub storage_key: String,
    /// Content type reported by storage.
    pub content_type: Option<String>,
    /// Size in bytes reported by storage.
    pub file_size: i64,
}

/// Attachment repository.
#[derive(Debug, Clone)]
pub struct AttachmentRepository {
    db: DatabaseConnection,
}

impl AttachmentRepository {
    /// Creates a new attachment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a verified upload against an expense.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        input: CreateAttachmentInput,
    ) -> Result<attachments::Model, DbErr> {
        let attachment = attachments::ActiveModel {
            id: Set(input.id),
            expense_id: Set(input.expense_id),
            uploaded_by: Set(input.uploaded_by),
            filename: Set(input.filename),
            storage_key: Set(input.storage_key),
            content_type: Set(input.content_type),
            file_size: Set(input.file_size),
            created_at: Set(chrono::Utc::now().into()),
        };

        attachment.insert(&self.db).await
    }

    /// Finds an attachment by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<attachments::Model>, DbErr> {
        attachments::Entity::find_by_id(id).one(&self.db).await
    }

    /// Lists the receipts attached to an expense, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_expense(
        &self,
        expense_id: Uuid,
    ) -> Result<Vec<attachments::Model>, DbErr> {
        attachments::Entity::find()
            .filter(attachments::Column::ExpenseId.eq(expense_id))
            .order_by_asc(attachments::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Deletes an attachment row.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete(&self, id: Uuid) -> Result<(), DbErr> {
        attachments::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }
}
