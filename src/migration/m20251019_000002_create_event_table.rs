use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("events"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key()
                    )
                    .col(
                        ColumnDef::new(Alias::new("title"))
                            .string_len(200)
                            .not_null()
                    )
                    .col(
                        ColumnDef::new(Alias::new("description"))
                            .text()
                            .not_null()
                    )
                    .col(
                        ColumnDef::new(Alias::new("location"))
                            .string_len(200)
                            .not_null()
                    )
                    .col(
                        ColumnDef::new(Alias::new("event_date"))
                            .timestamp_with_time_zone()
                            .not_null()
                    )
                    .col(
                        ColumnDef::new(Alias::new("registration_deadline"))
                            .timestamp_with_time_zone()
                            .not_null()
                    )
                    .col(
                        ColumnDef::new(Alias::new("max_registrations"))
                            .integer()
                            .null()
                    )
                    .col(
                        ColumnDef::new(Alias::new("organizer_id"))
                            .integer()
                            .not_null()
                    )
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp())
                    )
                    // 주최자는 이벤트가 남아 있는 동안 삭제할 수 없다
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_events_organizer")
                            .from(Alias::new("events"), Alias::new("organizer_id"))
                            .to(Alias::new("users"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Restrict)
                    )
                    .to_owned()
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_events_event_date")
                    .table(Alias::new("events"))
                    .col(Alias::new("event_date"))
                    .to_owned()
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(Alias::new("events"))
                    .to_owned()
            )
            .await
    }
}
