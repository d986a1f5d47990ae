use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::entity::event::{self, Entity as EventEntity};
use crate::entity::registration::{self, Entity as RegistrationEntity};
use crate::model::auth::AuthUser;
use crate::model::dashboard::{DashboardResponse, OrganizerDashboard, ParticipantDashboard, RegisteredEvent};
use crate::model::event::EventResponse;
use crate::model::global_error::AppError;
use crate::model::registration::RegistrationResponse;
use crate::service::event as event_service;
use crate::service::registration::registration_counts;

const UPCOMING_LIMIT: usize = 5;

pub async fn for_caller<C: ConnectionTrait>(
    db: &C,
    caller: &AuthUser,
    now: DateTime<Utc>,
) -> Result<DashboardResponse, AppError> {
    if caller.is_organizer() {
        organizer_dashboard(db, caller.user_id, now).await.map(DashboardResponse::Organizer)
    } else {
        participant_dashboard(db, caller.user_id, now).await.map(DashboardResponse::Participant)
    }
}

pub async fn organizer_dashboard<C: ConnectionTrait>(
    db: &C,
    organizer_id: i32,
    now: DateTime<Utc>,
) -> Result<OrganizerDashboard, AppError> {
    let my_events = event_service::list_by_organizer(db, organizer_id).await?;
    let events = event_service::with_counts(db, my_events, now).await?;

    let upcoming_events: Vec<EventResponse> = events
        .iter()
        .filter(|e| e.event_date > now)
        .take(UPCOMING_LIMIT)
        .cloned()
        .collect();
    let total_registrations: u64 = events.iter().map(|e| e.registration_count).sum();

    Ok(OrganizerDashboard {
        total_events: events.len() as u64,
        total_registrations,
        upcoming_events,
        events,
    })
}

pub async fn participant_dashboard<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    now: DateTime<Utc>,
) -> Result<ParticipantDashboard, AppError> {
    let rows = RegistrationEntity::find()
        .filter(registration::Column::UserId.eq(user_id))
        .find_also_related(EventEntity)
        .order_by_asc(event::Column::EventDate)
        .order_by_asc(registration::Column::Id)
        .all(db)
        .await?;

    let pairs: Vec<(registration::Model, event::Model)> = rows
        .into_iter()
        .filter_map(|(registration, event)| event.map(|event| (registration, event)))
        .collect();

    let event_ids: Vec<i32> = pairs.iter().map(|(_, event)| event.id).collect();
    let counts = registration_counts(db, &event_ids).await?;

    let registrations: Vec<RegisteredEvent> = pairs
        .into_iter()
        .map(|(registration, event)| {
            let count = counts.get(&event.id).copied().unwrap_or(0);
            RegisteredEvent {
                registration: RegistrationResponse::from(registration),
                event: EventResponse::new(event, count, now),
            }
        })
        .collect();

    let upcoming_registrations: Vec<RegisteredEvent> = registrations
        .iter()
        .filter(|r| r.event.event_date > now)
        .take(UPCOMING_LIMIT)
        .cloned()
        .collect();

    let upcoming = event_service::list_upcoming(db, now).await?;
    let all_events = event_service::with_counts(db, upcoming, now).await?;

    Ok(ParticipantDashboard {
        registered_event_ids: event_ids,
        upcoming_registrations,
        all_events,
        registrations,
    })
}
