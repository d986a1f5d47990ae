use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, QuerySelect, SqlErr, TransactionTrait};
use sea_query::{Condition, Expr};
use tracing::{info, warn};

use crate::entity::event::{self, Entity as EventEntity};
use crate::entity::notification::NotificationType;
use crate::entity::registration::{self, ActiveModel as RegistrationActiveModel, Entity as RegistrationEntity};
use crate::model::event::RegistrationStatusResponse;
use crate::model::global_error::{AppError, ErrorCode};
use crate::service::notification;

/// Registers `user_id` for `event_id` and emits the confirmation notification in the same transaction.
///
/// Checks run in a fixed order: duplicate registration, then the deadline, then capacity.
pub async fn register(
    db: &DatabaseConnection,
    user_id: i32,
    event_id: i32,
) -> Result<registration::Model, AppError> {
    let txn = db.begin().await?;

    let event = find_event_for_update(&txn, event_id).await?;

    if find_registration(&txn, user_id, event_id).await?.is_some() {
        return Err(AppError::conflict(ErrorCode::AlreadyRegistered, event.title));
    }

    let now = Utc::now();
    if !event.is_registration_open(now) {
        return Err(AppError::conflict(ErrorCode::RegistrationClosed, event.title));
    }

    let count = registration_count(&txn, event_id).await?;
    if event.is_full(count) {
        return Err(AppError::conflict(ErrorCode::EventFull, event.title));
    }

    let registration = RegistrationActiveModel::new(user_id, event_id, now)
        .insert(&txn)
        .await
        .map_err(|err| match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                warn!(user_id, event_id, "동시 참가 신청이 unique index 에 걸림");
                AppError::conflict(ErrorCode::AlreadyRegistered, event.title.clone())
            }
            _ => AppError::from(err),
        })?;

    notification::create(
        &txn,
        user_id,
        Some(event_id),
        &confirmation_message(&event.title),
        NotificationType::RegistrationConfirmation,
    )
    .await?;

    txn.commit().await?;
    info!(user_id, event_id, registration_id = registration.id, "이벤트 참가 신청 완료");

    Ok(registration)
}

/// Removes the caller's registration. Cancelling does not notify anyone.
pub async fn cancel(db: &DatabaseConnection, user_id: i32, event_id: i32) -> Result<(), AppError> {
    let txn = db.begin().await?;

    let registration = find_registration(&txn, user_id, event_id)
        .await?
        .ok_or_else(|| AppError::bad_request(ErrorCode::NotRegistered))?;

    registration.delete(&txn).await?;

    txn.commit().await?;
    info!(user_id, event_id, "이벤트 참가 신청 취소");

    Ok(())
}

pub async fn status<C: ConnectionTrait>(
    db: &C,
    event_id: i32,
    now: DateTime<Utc>,
) -> Result<RegistrationStatusResponse, AppError> {
    let event = EventEntity::find_by_id(event_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::EventNotFound))?;

    let count = registration_count(db, event_id).await?;

    Ok(RegistrationStatusResponse {
        count,
        max: event.max_registrations,
        is_full: event.is_full(count),
        is_open: event.is_registration_open(now),
    })
}

pub async fn is_registered<C: ConnectionTrait>(db: &C, user_id: i32, event_id: i32) -> Result<bool, AppError> {
    Ok(find_registration(db, user_id, event_id).await?.is_some())
}

pub async fn registration_count<C: ConnectionTrait>(db: &C, event_id: i32) -> Result<u64, AppError> {
    let count = RegistrationEntity::find()
        .filter(registration::Column::EventId.eq(event_id))
        .count(db)
        .await?;

    Ok(count)
}

/// Registration counts keyed by event id; events without registrations are absent.
pub async fn registration_counts<C: ConnectionTrait>(
    db: &C,
    event_ids: &[i32],
) -> Result<HashMap<i32, u64>, AppError> {
    if event_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(i32, i64)> = RegistrationEntity::find()
        .select_only()
        .column(registration::Column::EventId)
        .column_as(Expr::col(registration::Column::Id).count(), "registration_count")
        .filter(registration::Column::EventId.is_in(event_ids.iter().copied()))
        .group_by(registration::Column::EventId)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(event_id, count)| (event_id, u64::try_from(count).unwrap_or(0)))
        .collect())
}

async fn find_registration<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    event_id: i32,
) -> Result<Option<registration::Model>, AppError> {
    let registration = RegistrationEntity::find()
        .filter(
            Condition::all()
                .add(registration::Column::UserId.eq(user_id))
                .add(registration::Column::EventId.eq(event_id))
        )
        .one(db)
        .await?;

    Ok(registration)
}

// SELECT ... FOR UPDATE 로 같은 이벤트에 대한 정원 확인을 직렬화한다 (SQLite 는 미지원)
async fn find_event_for_update(txn: &DatabaseTransaction, event_id: i32) -> Result<event::Model, AppError> {
    let mut query = EventEntity::find_by_id(event_id);
    if txn.get_database_backend() != DbBackend::Sqlite {
        query = query.lock_exclusive();
    }

    query
        .one(txn)
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::EventNotFound))
}

fn confirmation_message(title: &str) -> String {
    format!("\"{}\" 이벤트 참가 신청이 완료되었습니다", title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::entity::notification::Entity as NotificationEntity;
    use crate::entity::user::Role;
    use crate::test_support::{insert_event, insert_user, setup_db};

    async fn total_registrations(db: &DatabaseConnection) -> u64 {
        RegistrationEntity::find().count(db).await.unwrap()
    }

    #[tokio::test]
    async fn failed_confirmation_rolls_back_registration() {
        let db = setup_db().await;
        let organizer = insert_user(&db, "host", Role::Organizer).await;
        let user = insert_user(&db, "alice", Role::User).await;
        let now = Utc::now();
        let event = insert_event(&db, organizer.id, now + Duration::hours(1), now + Duration::hours(2), None).await;

        db.execute_unprepared("DROP TABLE notifications").await.unwrap();

        let err = register(&db, user.id, event.id).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::DatabaseError);
        assert_eq!(total_registrations(&db).await, 0);
        assert!(!is_registered(&db, user.id, event.id).await.unwrap());
    }

    #[tokio::test]
    async fn register_creates_registration_and_confirmation() {
        let db = setup_db().await;
        let organizer = insert_user(&db, "host", Role::Organizer).await;
        let user = insert_user(&db, "alice", Role::User).await;
        let now = Utc::now();
        let event = insert_event(&db, organizer.id, now + Duration::hours(1), now + Duration::hours(2), None).await;

        let registration = register(&db, user.id, event.id).await.unwrap();

        assert_eq!(registration.user_id, user.id);
        assert_eq!(registration.event_id, event.id);
        let notifications = notification::list_for_user(&db, user.id).await.unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].event_id, Some(event.id));
        assert_eq!(notifications[0].notification_type, NotificationType::RegistrationConfirmation);
        assert!(notifications[0].message.contains("Rust Meetup"));
    }

    #[tokio::test]
    async fn register_missing_event_is_not_found() {
        let db = setup_db().await;
        let user = insert_user(&db, "alice", Role::User).await;

        let err = register(&db, user.id, 999).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::EventNotFound);
    }

    #[tokio::test]
    async fn second_register_is_rejected_without_new_rows() {
        let db = setup_db().await;
        let organizer = insert_user(&db, "host", Role::Organizer).await;
        let user = insert_user(&db, "alice", Role::User).await;
        let now = Utc::now();
        let event = insert_event(&db, organizer.id, now + Duration::hours(1), now + Duration::hours(2), Some(10)).await;
        register(&db, user.id, event.id).await.unwrap();

        let err = register(&db, user.id, event.id).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::AlreadyRegistered);
        assert_eq!(err.detail(), Some("Rust Meetup"));
        assert_eq!(total_registrations(&db).await, 1);
        assert_eq!(NotificationEntity::find().count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicate_check_runs_before_deadline_check() {
        let db = setup_db().await;
        let organizer = insert_user(&db, "host", Role::Organizer).await;
        let user = insert_user(&db, "alice", Role::User).await;
        let now = Utc::now();
        let event = insert_event(&db, organizer.id, now + Duration::hours(1), now + Duration::hours(2), None).await;
        register(&db, user.id, event.id).await.unwrap();

        let mut closed: event::ActiveModel = event.into();
        closed.registration_deadline = sea_orm::Set(now - Duration::minutes(1));
        let closed = closed.update(&db).await.unwrap();

        let err = register(&db, user.id, closed.id).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::AlreadyRegistered);
    }

    #[tokio::test]
    async fn register_after_deadline_is_closed() {
        let db = setup_db().await;
        let organizer = insert_user(&db, "host", Role::Organizer).await;
        let user = insert_user(&db, "alice", Role::User).await;
        let now = Utc::now();
        let event = insert_event(&db, organizer.id, now - Duration::seconds(1), now + Duration::hours(2), None).await;

        let err = register(&db, user.id, event.id).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::RegistrationClosed);
        assert_eq!(total_registrations(&db).await, 0);
        assert_eq!(NotificationEntity::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn closed_check_runs_before_capacity_check() {
        let db = setup_db().await;
        let organizer = insert_user(&db, "host", Role::Organizer).await;
        let alice = insert_user(&db, "alice", Role::User).await;
        let bob = insert_user(&db, "bob", Role::User).await;
        let now = Utc::now();
        let event = insert_event(&db, organizer.id, now + Duration::hours(1), now + Duration::hours(2), Some(1)).await;
        register(&db, alice.id, event.id).await.unwrap();

        let mut closed: event::ActiveModel = event.into();
        closed.registration_deadline = sea_orm::Set(now - Duration::minutes(1));
        let closed = closed.update(&db).await.unwrap();

        let err = register(&db, bob.id, closed.id).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::RegistrationClosed);
    }

    #[tokio::test]
    async fn capacity_limit_is_full_exactly_at_max() {
        let db = setup_db().await;
        let organizer = insert_user(&db, "host", Role::Organizer).await;
        let alice = insert_user(&db, "alice", Role::User).await;
        let bob = insert_user(&db, "bob", Role::User).await;
        let carol = insert_user(&db, "carol", Role::User).await;
        let now = Utc::now();
        let event = insert_event(&db, organizer.id, now + Duration::hours(1), now + Duration::hours(2), Some(2)).await;

        register(&db, alice.id, event.id).await.unwrap();
        register(&db, bob.id, event.id).await.unwrap();
        let err = register(&db, carol.id, event.id).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::EventFull);
        assert_eq!(registration_count(&db, event.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn unlimited_event_accepts_everyone() {
        let db = setup_db().await;
        let organizer = insert_user(&db, "host", Role::Organizer).await;
        let now = Utc::now();
        let event = insert_event(&db, organizer.id, now + Duration::hours(1), now + Duration::hours(2), None).await;

        for name in ["a", "b", "c", "d", "e"] {
            let user = insert_user(&db, name, Role::User).await;
            register(&db, user.id, event.id).await.unwrap();
        }

        let status = status(&db, event.id, Utc::now()).await.unwrap();
        assert_eq!(status.count, 5);
        assert_eq!(status.max, None);
        assert!(!status.is_full);
        assert!(status.is_open);
    }

    #[tokio::test]
    async fn single_seat_event_frees_up_after_cancel() {
        let db = setup_db().await;
        let organizer = insert_user(&db, "host", Role::Organizer).await;
        let alice = insert_user(&db, "alice", Role::User).await;
        let bob = insert_user(&db, "bob", Role::User).await;
        let now = Utc::now();
        let event = insert_event(&db, organizer.id, now + Duration::hours(1), now + Duration::hours(2), Some(1)).await;

        register(&db, alice.id, event.id).await.unwrap();
        let after_alice = status(&db, event.id, Utc::now()).await.unwrap();
        assert_eq!(after_alice.count, 1);
        assert!(after_alice.is_full);

        let err = register(&db, bob.id, event.id).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::EventFull);

        cancel(&db, alice.id, event.id).await.unwrap();
        let after_cancel = status(&db, event.id, Utc::now()).await.unwrap();
        assert_eq!(after_cancel.count, 0);
        assert!(!after_cancel.is_full);

        register(&db, bob.id, event.id).await.unwrap();
        assert!(is_registered(&db, bob.id, event.id).await.unwrap());
        assert!(!is_registered(&db, alice.id, event.id).await.unwrap());
    }

    #[tokio::test]
    async fn cancel_then_register_again_succeeds() {
        let db = setup_db().await;
        let organizer = insert_user(&db, "host", Role::Organizer).await;
        let user = insert_user(&db, "alice", Role::User).await;
        let now = Utc::now();
        let event = insert_event(&db, organizer.id, now + Duration::hours(1), now + Duration::hours(2), Some(1)).await;

        register(&db, user.id, event.id).await.unwrap();
        cancel(&db, user.id, event.id).await.unwrap();
        register(&db, user.id, event.id).await.unwrap();

        assert_eq!(registration_count(&db, event.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn cancel_without_registration_fails_and_sends_nothing() {
        let db = setup_db().await;
        let organizer = insert_user(&db, "host", Role::Organizer).await;
        let user = insert_user(&db, "alice", Role::User).await;
        let now = Utc::now();
        let event = insert_event(&db, organizer.id, now + Duration::hours(1), now + Duration::hours(2), None).await;

        let err = cancel(&db, user.id, event.id).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::NotRegistered);
        assert_eq!(NotificationEntity::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn registration_counts_groups_by_event() {
        let db = setup_db().await;
        let organizer = insert_user(&db, "host", Role::Organizer).await;
        let alice = insert_user(&db, "alice", Role::User).await;
        let bob = insert_user(&db, "bob", Role::User).await;
        let now = Utc::now();
        let busy = insert_event(&db, organizer.id, now + Duration::hours(1), now + Duration::hours(2), None).await;
        let quiet = insert_event(&db, organizer.id, now + Duration::hours(1), now + Duration::hours(2), None).await;
        register(&db, alice.id, busy.id).await.unwrap();
        register(&db, bob.id, busy.id).await.unwrap();

        let counts = registration_counts(&db, &[busy.id, quiet.id]).await.unwrap();

        assert_eq!(counts.get(&busy.id), Some(&2));
        assert_eq!(counts.get(&quiet.id), None);
        assert!(registration_counts(&db, &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn status_for_missing_event_is_not_found() {
        let db = setup_db().await;

        let err = status(&db, 42, Utc::now()).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::EventNotFound);
    }
}
