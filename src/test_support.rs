use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection};

use crate::configuration::DatabaseSettings;
use crate::db::init_db_with_migrations;
use crate::entity::event::{self, EventFields};
use crate::entity::user::{self, Role};

pub async fn setup_db() -> DatabaseConnection {
    init_db_with_migrations(&DatabaseSettings::in_memory_sqlite())
        .await
        .expect("in-memory sqlite should migrate")
}

/// Inserts a user without hashing a password.
pub async fn insert_user(db: &DatabaseConnection, username: &str, role: Role) -> user::Model {
    user::ActiveModel::new(
        username.to_string(),
        format!("{}@example.com", username),
        "not-a-real-hash".to_string(),
        role,
    )
    .insert(db)
    .await
    .expect("user insert")
}

/// Inserts an event directly, bypassing create-time validation so past deadlines are possible.
pub async fn insert_event(
    db: &DatabaseConnection,
    organizer_id: i32,
    registration_deadline: DateTime<Utc>,
    event_date: DateTime<Utc>,
    max_registrations: Option<i32>,
) -> event::Model {
    let fields = EventFields {
        title: "Rust Meetup".to_string(),
        description: "monthly meetup".to_string(),
        location: "Seoul".to_string(),
        event_date,
        registration_deadline,
        max_registrations,
    };

    event::ActiveModel::new(fields, organizer_id)
        .insert(db)
        .await
        .expect("event insert")
}
