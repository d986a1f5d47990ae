use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, QueryOrder, TransactionTrait};
use sea_query::Expr;
use tracing::{info, warn};

use crate::entity::event::{self, ActiveModel as EventActiveModel, Entity as EventEntity, EventFields};
use crate::entity::notification::{self, Entity as NotificationEntity};
use crate::entity::registration::{self, Entity as RegistrationEntity};
use crate::model::auth::AuthUser;
use crate::model::event::{EventDetailResponse, EventForm, EventResponse};
use crate::model::global_error::{AppError, ErrorCode, ValidationFieldError};
use crate::service::registration::{is_registered, registration_count, registration_counts};

// HTML datetime-local 입력 형식
const DATETIME_LOCAL_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Creates an event owned by `caller`.
///
/// Only organizers may create events. The registration deadline must fall strictly
/// before the event date and must not already have passed.
pub async fn create(
    db: &DatabaseConnection,
    caller: &AuthUser,
    form: &EventForm,
) -> Result<event::Model, AppError> {
    if !caller.is_organizer() {
        warn!(user_id = caller.user_id, "주최자가 아닌 사용자의 이벤트 생성 시도");
        return Err(AppError::forbidden(ErrorCode::OrganizerOnly));
    }

    let mut fields = parse_required_fields(form)?;

    if fields.registration_deadline >= fields.event_date {
        return Err(AppError::invalid_field(
            "registration_deadline",
            "신청 마감일은 이벤트 일시보다 빨라야 합니다.",
        ));
    }

    if fields.registration_deadline < Utc::now() {
        return Err(AppError::invalid_field(
            "registration_deadline",
            "신청 마감일은 과거일 수 없습니다.",
        ));
    }

    fields.max_registrations = parse_max_registrations(form.max_registrations.as_deref())?;

    let txn = db.begin().await?;
    let inserted = EventActiveModel::new(fields, caller.user_id).insert(&txn).await?;
    txn.commit().await?;

    info!(event_id = inserted.id, organizer_id = caller.user_id, "이벤트 생성 완료");

    Ok(inserted)
}

/// Overwrites an event's fields. Deadline ordering is not re-validated here.
pub async fn update(
    db: &DatabaseConnection,
    caller: &AuthUser,
    event_id: i32,
    form: &EventForm,
) -> Result<event::Model, AppError> {
    let txn = db.begin().await?;

    let event = get(&txn, event_id).await?;
    ensure_can_manage(caller, &event)?;

    let mut fields = parse_required_fields(form)?;
    fields.max_registrations = parse_max_registrations(form.max_registrations.as_deref())?;

    let mut active_model: EventActiveModel = event.into();
    active_model.overwrite(fields);
    let updated = active_model.update(&txn).await?;

    txn.commit().await?;
    info!(event_id, user_id = caller.user_id, "이벤트 수정 완료");

    Ok(updated)
}

/// Deletes an event together with its registrations. Notifications that referenced it are kept
/// with their event reference cleared.
pub async fn delete(db: &DatabaseConnection, caller: &AuthUser, event_id: i32) -> Result<(), AppError> {
    let txn = db.begin().await?;

    let event = get(&txn, event_id).await?;
    ensure_can_manage(caller, &event)?;

    let removed = RegistrationEntity::delete_many()
        .filter(registration::Column::EventId.eq(event_id))
        .exec(&txn)
        .await?;

    NotificationEntity::update_many()
        .col_expr(notification::Column::EventId, Expr::value(Option::<i32>::None))
        .filter(notification::Column::EventId.eq(event_id))
        .exec(&txn)
        .await?;

    event.delete(&txn).await?;

    txn.commit().await?;
    info!(event_id, user_id = caller.user_id, removed_registrations = removed.rows_affected, "이벤트 삭제 완료");

    Ok(())
}

pub async fn get<C: ConnectionTrait>(db: &C, event_id: i32) -> Result<event::Model, AppError> {
    EventEntity::find_by_id(event_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::EventNotFound))
}

/// Events that have not happened yet, soonest first.
pub async fn list_upcoming<C: ConnectionTrait>(db: &C, now: DateTime<Utc>) -> Result<Vec<event::Model>, AppError> {
    let events = EventEntity::find()
        .filter(event::Column::EventDate.gt(now))
        .order_by_asc(event::Column::EventDate)
        .order_by_asc(event::Column::Id)
        .all(db)
        .await?;

    Ok(events)
}

pub async fn list_all<C: ConnectionTrait>(db: &C) -> Result<Vec<event::Model>, AppError> {
    let events = EventEntity::find()
        .order_by_asc(event::Column::EventDate)
        .order_by_asc(event::Column::Id)
        .all(db)
        .await?;

    Ok(events)
}

pub async fn list_by_organizer<C: ConnectionTrait>(db: &C, organizer_id: i32) -> Result<Vec<event::Model>, AppError> {
    let events = EventEntity::find()
        .filter(event::Column::OrganizerId.eq(organizer_id))
        .order_by_asc(event::Column::EventDate)
        .order_by_asc(event::Column::Id)
        .all(db)
        .await?;

    Ok(events)
}

pub async fn detail<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    event_id: i32,
    now: DateTime<Utc>,
) -> Result<EventDetailResponse, AppError> {
    let event = get(db, event_id).await?;
    let count = registration_count(db, event_id).await?;
    let is_registered = is_registered(db, user_id, event_id).await?;

    Ok(EventDetailResponse {
        event: EventResponse::new(event, count, now),
        is_registered,
    })
}

/// Attaches registration counts and the derived open/full flags to each event.
pub async fn with_counts<C: ConnectionTrait>(
    db: &C,
    events: Vec<event::Model>,
    now: DateTime<Utc>,
) -> Result<Vec<EventResponse>, AppError> {
    let ids: Vec<i32> = events.iter().map(|e| e.id).collect();
    let counts = registration_counts(db, &ids).await?;

    Ok(events
        .into_iter()
        .map(|event| {
            let count = counts.get(&event.id).copied().unwrap_or(0);
            EventResponse::new(event, count, now)
        })
        .collect())
}

// 소유자가 아니어도 주최자 역할이면 수정/삭제 가능 (기존 정책 유지)
fn ensure_can_manage(caller: &AuthUser, event: &event::Model) -> Result<(), AppError> {
    if caller.user_id == event.organizer_id || caller.is_organizer() {
        return Ok(());
    }

    warn!(user_id = caller.user_id, event_id = event.id, "이벤트 관리 권한 없음");
    Err(AppError::forbidden(ErrorCode::NotEnoughPermission))
}

fn parse_required_fields(form: &EventForm) -> Result<EventFields, AppError> {
    let mut errors = Vec::new();

    let title = required(&form.title, "title", "제목은 필수입니다.", &mut errors);
    let description = required(&form.description, "description", "설명은 필수입니다.", &mut errors);
    let location = required(&form.location, "location", "장소는 필수입니다.", &mut errors);
    let event_date = required(&form.event_date, "event_date", "이벤트 일시는 필수입니다.", &mut errors);
    let deadline = required(&form.registration_deadline, "registration_deadline", "신청 마감일은 필수입니다.", &mut errors);

    if !errors.is_empty() {
        return Err(AppError::ValidationError(errors));
    }

    let event_date = event_date.and_then(|raw| {
        parse_datetime(raw).or_else(|| {
            errors.push(ValidationFieldError::new("event_date", "잘못된 날짜 형식입니다."));
            None
        })
    });
    let deadline = deadline.and_then(|raw| {
        parse_datetime(raw).or_else(|| {
            errors.push(ValidationFieldError::new("registration_deadline", "잘못된 날짜 형식입니다."));
            None
        })
    });

    match (title, description, location, event_date, deadline) {
        (Some(title), Some(description), Some(location), Some(event_date), Some(registration_deadline))
            if errors.is_empty() =>
        {
            Ok(EventFields {
                title: title.to_string(),
                description: description.to_string(),
                location: location.to_string(),
                event_date,
                registration_deadline,
                max_registrations: None,
            })
        }
        _ => Err(AppError::ValidationError(errors)),
    }
}

fn required<'a>(
    value: &'a Option<String>,
    field: &str,
    message: &str,
    errors: &mut Vec<ValidationFieldError>,
) -> Option<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            errors.push(ValidationFieldError::new(field, message));
            None
        }
    }
}

/// Accepts `YYYY-MM-DDTHH:MM[:SS]` interpreted as UTC, or a full RFC 3339 timestamp.
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    DATETIME_LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
}

/// Blank or absent means unlimited capacity.
pub fn parse_max_registrations(raw: Option<&str>) -> Result<Option<i32>, AppError> {
    let raw = match raw.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => return Ok(None),
    };

    match raw.parse::<i32>() {
        Ok(max) if max > 0 => Ok(Some(max)),
        _ => Err(AppError::invalid_field(
            "max_registrations",
            "최대 참가 인원은 양의 정수여야 합니다.",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Timelike};
    use sea_orm::PaginatorTrait;
    use crate::entity::notification::NotificationType;
    use crate::entity::user::Role;
    use crate::service::{notification as notification_service, registration as registration_service};
    use crate::test_support::{insert_event, insert_user, setup_db};

    fn organizer(user_id: i32) -> AuthUser {
        AuthUser { user_id, role: Role::Organizer }
    }

    fn participant(user_id: i32) -> AuthUser {
        AuthUser { user_id, role: Role::User }
    }

    fn local(dt: DateTime<Utc>) -> String {
        dt.format("%Y-%m-%dT%H:%M").to_string()
    }

    fn form(deadline: DateTime<Utc>, event_date: DateTime<Utc>, max: Option<&str>) -> EventForm {
        EventForm {
            title: Some("Rust Meetup".into()),
            description: Some("monthly meetup".into()),
            location: Some("Seoul".into()),
            event_date: Some(local(event_date)),
            registration_deadline: Some(local(deadline)),
            max_registrations: max.map(str::to_string),
        }
    }

    fn field_names(err: &AppError) -> Vec<String> {
        match err {
            AppError::ValidationError(errors) => errors.iter().map(|e| e.field.clone()).collect(),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn parse_datetime_accepts_local_and_rfc3339() {
        let local = parse_datetime("2030-01-02T03:04").unwrap();
        assert_eq!(local.to_rfc3339(), "2030-01-02T03:04:00+00:00");

        let with_seconds = parse_datetime("2030-01-02T03:04:05").unwrap();
        assert_eq!(with_seconds.second(), 5);

        let offset = parse_datetime("2030-01-02T12:00:00+09:00").unwrap();
        assert_eq!(offset.to_rfc3339(), "2030-01-02T03:00:00+00:00");

        assert!(parse_datetime("next tuesday").is_none());
        assert!(parse_datetime("2030-13-02T03:04").is_none());
    }

    #[test]
    fn parse_max_registrations_requires_positive_integer() {
        assert_eq!(parse_max_registrations(None).unwrap(), None);
        assert_eq!(parse_max_registrations(Some("  ")).unwrap(), None);
        assert_eq!(parse_max_registrations(Some("25")).unwrap(), Some(25));

        for bad in ["0", "-3", "ten", "1.5"] {
            let err = parse_max_registrations(Some(bad)).unwrap_err();
            assert_eq!(field_names(&err), vec!["max_registrations"]);
        }
    }

    #[tokio::test]
    async fn organizer_creates_event() {
        let db = setup_db().await;
        let host = insert_user(&db, "host", Role::Organizer).await;
        let now = Utc::now();

        let created = create(&db, &organizer(host.id), &form(now + Duration::hours(1), now + Duration::hours(2), Some("30")))
            .await
            .unwrap();

        assert_eq!(created.organizer_id, host.id);
        assert_eq!(created.max_registrations, Some(30));
        assert_eq!(created.title, "Rust Meetup");
    }

    #[tokio::test]
    async fn blank_capacity_means_unlimited() {
        let db = setup_db().await;
        let host = insert_user(&db, "host", Role::Organizer).await;
        let now = Utc::now();

        let created = create(&db, &organizer(host.id), &form(now + Duration::hours(1), now + Duration::hours(2), Some("")))
            .await
            .unwrap();

        assert_eq!(created.max_registrations, None);
    }

    #[tokio::test]
    async fn plain_user_cannot_create_event() {
        let db = setup_db().await;
        let user = insert_user(&db, "alice", Role::User).await;
        let now = Utc::now();

        let err = create(&db, &participant(user.id), &form(now + Duration::hours(1), now + Duration::hours(2), None))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::OrganizerOnly);
        assert!(list_all(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_fields_are_all_reported() {
        let db = setup_db().await;
        let host = insert_user(&db, "host", Role::Organizer).await;
        let incomplete = EventForm {
            title: Some("Rust Meetup".into()),
            description: Some("   ".into()),
            ..Default::default()
        };

        let err = create(&db, &organizer(host.id), &incomplete).await.unwrap_err();

        assert_eq!(
            field_names(&err),
            vec!["description", "location", "event_date", "registration_deadline"]
        );
    }

    #[tokio::test]
    async fn malformed_dates_are_rejected() {
        let db = setup_db().await;
        let host = insert_user(&db, "host", Role::Organizer).await;
        let mut bad = form(Utc::now() + Duration::hours(1), Utc::now() + Duration::hours(2), None);
        bad.event_date = Some("tomorrow".into());

        let err = create(&db, &organizer(host.id), &bad).await.unwrap_err();

        assert_eq!(field_names(&err), vec!["event_date"]);
    }

    #[tokio::test]
    async fn deadline_after_event_date_is_rejected() {
        let db = setup_db().await;
        let host = insert_user(&db, "host", Role::Organizer).await;
        let event_date = Utc::now() + Duration::hours(2);

        let err = create(&db, &organizer(host.id), &form(event_date + Duration::minutes(1), event_date, None))
            .await
            .unwrap_err();

        assert_eq!(field_names(&err), vec!["registration_deadline"]);
        assert!(list_all(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deadline_equal_to_event_date_is_rejected() {
        let db = setup_db().await;
        let host = insert_user(&db, "host", Role::Organizer).await;
        let event_date = Utc::now() + Duration::hours(2);

        let err = create(&db, &organizer(host.id), &form(event_date, event_date, None))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn past_deadline_is_rejected_on_create() {
        let db = setup_db().await;
        let host = insert_user(&db, "host", Role::Organizer).await;
        let now = Utc::now();

        let err = create(&db, &organizer(host.id), &form(now - Duration::hours(1), now + Duration::hours(2), None))
            .await
            .unwrap_err();

        assert_eq!(field_names(&err), vec!["registration_deadline"]);
    }

    #[tokio::test]
    async fn update_skips_deadline_ordering_check() {
        let db = setup_db().await;
        let host = insert_user(&db, "host", Role::Organizer).await;
        let now = Utc::now();
        let event = insert_event(&db, host.id, now + Duration::hours(1), now + Duration::hours(2), None).await;

        let mut edit = form(now + Duration::hours(5), now + Duration::hours(3), Some("3"));
        edit.title = Some("Rust Meetup (moved)".into());
        let updated = update(&db, &organizer(host.id), event.id, &edit).await.unwrap();

        assert_eq!(updated.title, "Rust Meetup (moved)");
        assert_eq!(updated.max_registrations, Some(3));
        assert!(updated.registration_deadline > updated.event_date);
    }

    #[tokio::test]
    async fn any_organizer_may_edit_any_event() {
        let db = setup_db().await;
        let owner = insert_user(&db, "host", Role::Organizer).await;
        let other = insert_user(&db, "cohost", Role::Organizer).await;
        let now = Utc::now();
        let event = insert_event(&db, owner.id, now + Duration::hours(1), now + Duration::hours(2), None).await;

        let updated = update(&db, &organizer(other.id), event.id, &form(now + Duration::hours(1), now + Duration::hours(2), None))
            .await
            .unwrap();

        assert_eq!(updated.organizer_id, owner.id);
    }

    #[tokio::test]
    async fn plain_user_cannot_edit_or_delete_foreign_event() {
        let db = setup_db().await;
        let owner = insert_user(&db, "host", Role::Organizer).await;
        let user = insert_user(&db, "alice", Role::User).await;
        let now = Utc::now();
        let event = insert_event(&db, owner.id, now + Duration::hours(1), now + Duration::hours(2), None).await;

        let err = update(&db, &participant(user.id), event.id, &form(now + Duration::hours(1), now + Duration::hours(2), None))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotEnoughPermission);

        let err = delete(&db, &participant(user.id), event.id).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotEnoughPermission);
        assert!(get(&db, event.id).await.is_ok());
    }

    #[tokio::test]
    async fn owner_keeps_access_after_losing_organizer_role() {
        let db = setup_db().await;
        let owner = insert_user(&db, "host", Role::Organizer).await;
        let now = Utc::now();
        let event = insert_event(&db, owner.id, now + Duration::hours(1), now + Duration::hours(2), None).await;

        delete(&db, &participant(owner.id), event.id).await.unwrap();

        assert_eq!(get(&db, event.id).await.unwrap_err().code(), ErrorCode::EventNotFound);
    }

    #[tokio::test]
    async fn update_and_delete_missing_event_is_not_found() {
        let db = setup_db().await;
        let host = insert_user(&db, "host", Role::Organizer).await;
        let now = Utc::now();

        let err = update(&db, &organizer(host.id), 77, &form(now + Duration::hours(1), now + Duration::hours(2), None))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::EventNotFound);

        let err = delete(&db, &organizer(host.id), 77).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::EventNotFound);
    }

    #[tokio::test]
    async fn update_rejects_bad_dates() {
        let db = setup_db().await;
        let host = insert_user(&db, "host", Role::Organizer).await;
        let now = Utc::now();
        let event = insert_event(&db, host.id, now + Duration::hours(1), now + Duration::hours(2), None).await;
        let mut bad = form(now + Duration::hours(1), now + Duration::hours(2), None);
        bad.registration_deadline = Some("31/12/2030".into());

        let err = update(&db, &organizer(host.id), event.id, &bad).await.unwrap_err();

        assert_eq!(field_names(&err), vec!["registration_deadline"]);
        assert_eq!(get(&db, event.id).await.unwrap().registration_deadline, event.registration_deadline);
    }

    #[tokio::test]
    async fn delete_cascades_registrations_and_keeps_notifications() {
        let db = setup_db().await;
        let host = insert_user(&db, "host", Role::Organizer).await;
        let alice = insert_user(&db, "alice", Role::User).await;
        let bob = insert_user(&db, "bob", Role::User).await;
        let now = Utc::now();
        let doomed = insert_event(&db, host.id, now + Duration::hours(1), now + Duration::hours(2), None).await;
        let survivor = insert_event(&db, host.id, now + Duration::hours(1), now + Duration::hours(2), None).await;
        registration_service::register(&db, alice.id, doomed.id).await.unwrap();
        registration_service::register(&db, bob.id, doomed.id).await.unwrap();
        registration_service::register(&db, bob.id, survivor.id).await.unwrap();

        delete(&db, &organizer(host.id), doomed.id).await.unwrap();

        assert_eq!(RegistrationEntity::find().count(&db).await.unwrap(), 1);
        assert_eq!(registration_count(&db, survivor.id).await.unwrap(), 1);

        let alice_notifications = notification_service::list_for_user(&db, alice.id).await.unwrap();
        assert_eq!(alice_notifications.len(), 1);
        assert_eq!(alice_notifications[0].event_id, None);
        assert_eq!(alice_notifications[0].notification_type, NotificationType::RegistrationConfirmation);
    }

    #[tokio::test]
    async fn list_upcoming_filters_past_and_sorts_ascending() {
        let db = setup_db().await;
        let host = insert_user(&db, "host", Role::Organizer).await;
        let now = Utc::now();
        let later = insert_event(&db, host.id, now + Duration::hours(1), now + Duration::days(3), None).await;
        let past = insert_event(&db, host.id, now - Duration::days(3), now - Duration::days(2), None).await;
        let sooner = insert_event(&db, host.id, now + Duration::hours(1), now + Duration::days(1), None).await;

        let upcoming = list_upcoming(&db, now).await.unwrap();
        let ids: Vec<i32> = upcoming.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![sooner.id, later.id]);

        let all: Vec<i32> = list_all(&db).await.unwrap().iter().map(|e| e.id).collect();
        assert_eq!(all, vec![past.id, sooner.id, later.id]);
    }

    #[tokio::test]
    async fn detail_reports_derived_fields_for_caller() {
        let db = setup_db().await;
        let host = insert_user(&db, "host", Role::Organizer).await;
        let alice = insert_user(&db, "alice", Role::User).await;
        let bob = insert_user(&db, "bob", Role::User).await;
        let now = Utc::now();
        let event = insert_event(&db, host.id, now + Duration::hours(1), now + Duration::hours(2), Some(1)).await;
        registration_service::register(&db, alice.id, event.id).await.unwrap();

        let for_alice = detail(&db, alice.id, event.id, Utc::now()).await.unwrap();
        assert!(for_alice.is_registered);
        assert_eq!(for_alice.event.registration_count, 1);
        assert!(for_alice.event.is_full);
        assert!(for_alice.event.is_registration_open);

        let for_bob = detail(&db, bob.id, event.id, Utc::now()).await.unwrap();
        assert!(!for_bob.is_registered);
    }
}
