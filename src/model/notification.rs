use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use crate::entity::notification::{Model as NotificationModel, NotificationType};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationResponse {
    pub id: i32,
    pub event_id: Option<i32>,
    pub message: String,
    pub notification_type: NotificationType,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<NotificationModel> for NotificationResponse {
    fn from(model: NotificationModel) -> Self {
        Self {
            id: model.id,
            event_id: model.event_id,
            message: model.message,
            notification_type: model.notification_type,
            is_read: model.is_read,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct UnreadCountResponse {
    pub count: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct MarkReadResponse {
    pub success: bool,
}
