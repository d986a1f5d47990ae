pub use sea_orm_migration::prelude::*;

mod m20251019_000001_create_user_table;
mod m20251019_000002_create_event_table;
mod m20251019_000003_create_registration_table;
mod m20251019_000004_create_notification_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251019_000001_create_user_table::Migration),
            Box::new(m20251019_000002_create_event_table::Migration),
            Box::new(m20251019_000003_create_registration_table::Migration),
            Box::new(m20251019_000004_create_notification_table::Migration),
        ]
    }
}
