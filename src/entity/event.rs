use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub location: String,
    pub event_date: DateTime<Utc>,
    pub registration_deadline: DateTime<Utc>,
    pub max_registrations: Option<i32>,  // None 이면 정원 무제한
    pub organizer_id: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OrganizerId",
        to = "super::user::Column::Id",
        on_delete = "Restrict"
    )]
    Organizer,

    #[sea_orm(has_many = "super::registration::Entity")]
    Registrations,

    #[sea_orm(has_many = "super::notification::Entity")]
    Notifications,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizer.def()
    }
}

impl Related<super::registration::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Registrations.def()
    }
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Registration stays open until the deadline itself; at the deadline it is closed.
    pub fn is_registration_open(&self, now: DateTime<Utc>) -> bool {
        now < self.registration_deadline
    }

    /// An event without capacity is never full.
    pub fn is_full(&self, registration_count: u64) -> bool {
        match self.max_registrations {
            Some(max) => registration_count >= u64::try_from(max).unwrap_or(0),
            None => false,
        }
    }
}

/// Validated field values for an event row, shared by create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct EventFields {
    pub title: String,
    pub description: String,
    pub location: String,
    pub event_date: DateTime<Utc>,
    pub registration_deadline: DateTime<Utc>,
    pub max_registrations: Option<i32>,
}

impl ActiveModel {
    pub fn new(fields: EventFields, organizer_id: i32) -> Self {
        Self {
            title: Set(fields.title),
            description: Set(fields.description),
            location: Set(fields.location),
            event_date: Set(fields.event_date),
            registration_deadline: Set(fields.registration_deadline),
            max_registrations: Set(fields.max_registrations),
            organizer_id: Set(organizer_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
    }

    pub fn overwrite(&mut self, fields: EventFields) {
        self.title = Set(fields.title);
        self.description = Set(fields.description);
        self.location = Set(fields.location);
        self.event_date = Set(fields.event_date);
        self.registration_deadline = Set(fields.registration_deadline);
        self.max_registrations = Set(fields.max_registrations);
    }
}
