use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use crate::model::event::EventResponse;
use crate::model::registration::RegistrationResponse;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DashboardResponse {
    Organizer(OrganizerDashboard),
    Participant(ParticipantDashboard),
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrganizerDashboard {
    pub events: Vec<EventResponse>,
    pub upcoming_events: Vec<EventResponse>,
    pub total_events: u64,
    pub total_registrations: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParticipantDashboard {
    pub registrations: Vec<RegisteredEvent>,
    pub upcoming_registrations: Vec<RegisteredEvent>,
    pub all_events: Vec<EventResponse>,
    pub registered_event_ids: Vec<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisteredEvent {
    pub registration: RegistrationResponse,
    pub event: EventResponse,
}
