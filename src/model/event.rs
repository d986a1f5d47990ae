use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use crate::entity::event::Model as EventModel;

/// Raw event fields as submitted by the client; every value is validated by the event service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct EventForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    #[schema(example = "2025-12-24T18:30")]
    pub event_date: Option<String>,
    #[schema(example = "2025-12-20T23:59")]
    pub registration_deadline: Option<String>,
    pub max_registrations: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub location: String,
    pub event_date: DateTime<Utc>,
    pub registration_deadline: DateTime<Utc>,
    pub max_registrations: Option<i32>,
    pub organizer_id: i32,
    pub created_at: DateTime<Utc>,
    pub registration_count: u64,
    pub is_registration_open: bool,
    pub is_full: bool,
}

impl EventResponse {
    pub fn new(model: EventModel, registration_count: u64, now: DateTime<Utc>) -> Self {
        let is_registration_open = model.is_registration_open(now);
        let is_full = model.is_full(registration_count);

        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            location: model.location,
            event_date: model.event_date,
            registration_deadline: model.registration_deadline,
            max_registrations: model.max_registrations,
            organizer_id: model.organizer_id,
            created_at: model.created_at,
            registration_count,
            is_registration_open,
            is_full,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventDetailResponse {
    #[serde(flatten)]
    pub event: EventResponse,
    pub is_registered: bool,
}

/// `GET /registrations/count/{event_id}` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RegistrationStatusResponse {
    pub count: u64,
    pub max: Option<i32>,
    pub is_full: bool,
    pub is_open: bool,
}
