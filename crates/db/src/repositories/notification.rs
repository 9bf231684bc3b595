//! Notification repository for the in-app notification sink.
//!
//! Callers treat this sink as best-effort: failures are logged and
//! swallowed at the call site, and never roll back the operation that
//! produced the notification.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use caja_core::notification::NotificationMessage;

use crate::entities::notifications;

/// Notification repository.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    db: DatabaseConnection,
}

impl NotificationRepository {
    /// Creates a new notification repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Stores one notification for one recipient.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        recipient: Uuid,
        expense_id: Option<Uuid>,
        message: &NotificationMessage,
    ) -> Result<notifications::Model, DbErr> {
        let now = chrono::Utc::now().into();
        let notification = notifications::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(recipient),
            expense_id: Set(expense_id),
            kind: Set(message.kind.into()),
            title: Set(message.title.clone()),
            message: Set(message.message.clone()),
            priority: Set(message.priority.into()),
            is_read: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };

        notification.insert(&self.db).await
    }

    /// Fans one message out to many recipients, returning how many rows
    /// were written.
    ///
    /// # Errors
    ///
    /// Returns an error if any insert fails.
    pub async fn notify_all(
        &self,
        recipients: &[Uuid],
        expense_id: Option<Uuid>,
        message: &NotificationMessage,
    ) -> Result<usize, DbErr> {
        for recipient in recipients {
            self.create(*recipient, expense_id, message).await?;
        }
        Ok(recipients.len())
    }

    /// Lists a user's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: u64,
    ) -> Result<Vec<notifications::Model>, DbErr> {
        notifications::Entity::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .order_by_desc(notifications::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
    }

    /// Counts a user's unread notifications.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn unread_count(&self, user_id: Uuid) -> Result<u64, DbErr> {
        notifications::Entity::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::IsRead.eq(false))
            .count(&self.db)
            .await
    }

    /// Marks one notification as read. Scoped to the owning user so one
    /// user cannot touch another's notifications.
    ///
    /// Returns true if a row was updated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn mark_read(&self, notification_id: Uuid, user_id: Uuid) -> Result<bool, DbErr> {
        let result = notifications::Entity::update_many()
            .col_expr(notifications::Column::IsRead, Expr::value(true))
            .col_expr(
                notifications::Column::UpdatedAt,
                Expr::value(chrono::Utc::now()),
            )
            .filter(notifications::Column::Id.eq(notification_id))
            .filter(notifications::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Marks all of a user's notifications as read, returning the count.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, DbErr> {
        let result = notifications::Entity::update_many()
            .col_expr(notifications::Column::IsRead, Expr::value(true))
            .col_expr(
                notifications::Column::UpdatedAt,
                Expr::value(chrono::Utc::now()),
            )
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::IsRead.eq(false))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }
}
