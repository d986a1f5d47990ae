use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use crate::entity::registration::Model as RegistrationModel;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegistrationResponse {
    pub id: i32,
    pub user_id: i32,
    pub event_id: i32,
    pub registered_at: DateTime<Utc>,
}

impl From<RegistrationModel> for RegistrationResponse {
    fn from(model: RegistrationModel) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            event_id: model.event_id,
            registered_at: model.registered_at,
        }
    }
}
