use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait};
use tracing::{debug, info, warn};

use crate::entity::notification::{self, ActiveModel as NotificationActiveModel, Entity as NotificationEntity, NotificationType};
use crate::model::global_error::{AppError, ErrorCode};

/// Inserts a notification on the given connection, which may be an open transaction.
pub async fn create<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    event_id: Option<i32>,
    message: &str,
    notification_type: NotificationType,
) -> Result<notification::Model, AppError> {
    if message.trim().is_empty() {
        return Err(AppError::invalid_field("message", "알림 메시지는 필수입니다."));
    }

    let inserted = NotificationActiveModel::new(user_id, event_id, message, notification_type)
        .insert(db)
        .await?;

    debug!(user_id, notification_id = inserted.id, ?notification_type, "알림 생성");

    Ok(inserted)
}

pub async fn mark_read(
    db: &DatabaseConnection,
    acting_user_id: i32,
    notification_id: i32,
) -> Result<notification::Model, AppError> {
    let txn = db.begin().await?;

    let notification = NotificationEntity::find_by_id(notification_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::NotificationNotFound))?;

    if notification.user_id != acting_user_id {
        warn!(acting_user_id, notification_id, "다른 사용자의 알림 읽음 처리 시도");
        return Err(AppError::forbidden(ErrorCode::NotEnoughPermission));
    }

    let mut active_model: NotificationActiveModel = notification.into();
    active_model.is_read = Set(true);
    let updated = active_model.update(&txn).await?;

    txn.commit().await?;
    info!(acting_user_id, notification_id, "알림 읽음 처리");

    Ok(updated)
}

pub async fn unread_count<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<u64, AppError> {
    let count = NotificationEntity::find()
        .filter(notification::Column::UserId.eq(user_id))
        .filter(notification::Column::IsRead.eq(false))
        .count(db)
        .await?;

    Ok(count)
}

pub async fn list_for_user<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<Vec<notification::Model>, AppError> {
    let notifications = NotificationEntity::find()
        .filter(notification::Column::UserId.eq(user_id))
        .order_by_desc(notification::Column::CreatedAt)
        .order_by_desc(notification::Column::Id)
        .all(db)
        .await?;

    Ok(notifications)
}
