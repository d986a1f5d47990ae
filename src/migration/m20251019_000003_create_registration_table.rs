use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("registrations"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key()
                    )
                    .col(
                        ColumnDef::new(Alias::new("user_id"))
                            .integer()
                            .not_null()
                    )
                    .col(
                        ColumnDef::new(Alias::new("event_id"))
                            .integer()
                            .not_null()
                    )
                    .col(
                        ColumnDef::new(Alias::new("registered_at"))
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp())
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_registrations_user")
                            .from(Alias::new("registrations"), Alias::new("user_id"))
                            .to(Alias::new("users"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade)
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_registrations_event")
                            .from(Alias::new("registrations"), Alias::new("event_id"))
                            .to(Alias::new("events"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade)
                    )
                    .to_owned()
            )
            .await?;

        // 한 사용자는 이벤트당 한 번만 신청 가능
        manager
            .create_index(
                Index::create()
                    .name("unique_user_event_registration")
                    .table(Alias::new("registrations"))
                    .col(Alias::new("user_id"))
                    .col(Alias::new("event_id"))
                    .unique()
                    .to_owned()
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(Alias::new("registrations"))
                    .to_owned()
            )
            .await
    }
}
