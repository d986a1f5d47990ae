use std::sync::LazyLock;

use bcrypt::{hash, verify, DEFAULT_COST};
use regex::Regex;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, TransactionTrait};
use sea_query::Condition;
use tracing::{error, info};

use crate::configuration::DefaultOrganizerSettings;
use crate::entity::event::{self, Entity as EventEntity};
use crate::entity::notification::{self, Entity as NotificationEntity};
use crate::entity::registration::{self, Entity as RegistrationEntity};
use crate::entity::user::{self, Entity as UserEntity, Role};
use crate::model::global_error::{AppError, ErrorCode, ValidationFieldError};

#[cfg(not(test))]
const HASH_COST: u32 = DEFAULT_COST;
#[cfg(test)]
const HASH_COST: u32 = 4;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

pub async fn create_user(
    db: &DatabaseConnection,
    username: &str,
    email: &str,
    password: &str,
    role: Role,
) -> Result<user::Model, AppError> {
    validate_new_account(username, email, password)?;

    let txn = db.begin().await?;

    let existing_user = UserEntity::find()
        .filter(
            Condition::any()
                .add(user::Column::Username.eq(username.trim()))
                .add(user::Column::Email.eq(email.trim()))
        )
        .one(&txn)
        .await?;

    if existing_user.is_some() {
        txn.rollback().await.ok();
        return Err(AppError::conflict(ErrorCode::DuplicateAccount, username.trim()));
    }

    let hashed_password = hash(password, HASH_COST).map_err(|err| {
        error!("비밀번호 해시 생성 실패: {}", err);
        AppError::internal_error(ErrorCode::InternalError)
    })?;

    let user = user::ActiveModel::new(
        username.trim().to_string(),
        email.trim().to_string(),
        hashed_password,
        role,
    )
    .insert(&txn)
    .await?;

    txn.commit().await?;
    info!(user_id = user.id, role = role.as_str(), "사용자 생성 완료");

    Ok(user)
}

/// Resolves a user by email and password; unknown email and wrong password fail the same way.
pub async fn authenticate<C: ConnectionTrait>(db: &C, email: &str, password: &str) -> Result<user::Model, AppError> {
    let user = UserEntity::find()
        .filter(user::Column::Email.eq(email.trim()))
        .one(db)
        .await?
        .ok_or_else(|| AppError::bad_request(ErrorCode::InvalidEmailPwd))?;

    let is_valid = verify(password, &user.password).map_err(|err| {
        error!("비밀번호 검증 실패: {}", err);
        AppError::internal_error(ErrorCode::InternalError)
    })?;

    if !is_valid {
        return Err(AppError::bad_request(ErrorCode::InvalidEmailPwd));
    }

    Ok(user)
}

pub async fn find<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<user::Model, AppError> {
    UserEntity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::MemberNotFound))
}

/// Deletes an account with its registrations and notifications.
///
/// Organizers must delete their events first; their events are never removed implicitly.
pub async fn delete_user(db: &DatabaseConnection, user_id: i32) -> Result<(), AppError> {
    let txn = db.begin().await?;

    let user = find(&txn, user_id).await?;

    let organized = EventEntity::find()
        .filter(event::Column::OrganizerId.eq(user_id))
        .count(&txn)
        .await?;
    if organized > 0 {
        return Err(AppError::conflict(ErrorCode::OrganizerHasEvents, user.username));
    }

    let registrations = RegistrationEntity::delete_many()
        .filter(registration::Column::UserId.eq(user_id))
        .exec(&txn)
        .await?;

    let notifications = NotificationEntity::delete_many()
        .filter(notification::Column::UserId.eq(user_id))
        .exec(&txn)
        .await?;

    user.delete(&txn).await?;

    txn.commit().await?;
    info!(
        user_id,
        removed_registrations = registrations.rows_affected,
        removed_notifications = notifications.rows_affected,
        "사용자 삭제 완료"
    );

    Ok(())
}

/// Creates the configured organizer account once. Returns whether a new account was made.
pub async fn ensure_default_organizer(
    db: &DatabaseConnection,
    settings: &DefaultOrganizerSettings,
) -> Result<bool, AppError> {
    let existing = UserEntity::find()
        .filter(user::Column::Username.eq(settings.username.as_str()))
        .one(db)
        .await?;

    if existing.is_some() {
        return Ok(false);
    }

    create_user(db, &settings.username, &settings.email, &settings.password, Role::Organizer).await?;
    info!(username = %settings.username, "기본 주최자 계정 생성");

    Ok(true)
}

fn validate_new_account(username: &str, email: &str, password: &str) -> Result<(), AppError> {
    let mut errors = Vec::new();

    if username.trim().is_empty() {
        errors.push(ValidationFieldError::new("username", "사용자명은 필수입니다."));
    } else if username.trim().chars().count() > 80 {
        errors.push(ValidationFieldError::new("username", "사용자명은 80자 이하여야 합니다."));
    }

    if email.trim().is_empty() {
        errors.push(ValidationFieldError::new("email", "이메일은 필수입니다."));
    } else if !EMAIL_PATTERN.is_match(email.trim()) {
        errors.push(ValidationFieldError::new("email", "유효한 이메일 형식이 아닙니다."));
    }

    if password.len() < 8 {
        errors.push(ValidationFieldError::new("password", "비밀번호는 최소 8자 이상이어야 합니다."));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationError(errors))
    }
}
