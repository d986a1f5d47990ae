use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("notifications"))
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
                            .null()
                    )
                    .col(
                        ColumnDef::new(Alias::new("message"))
                            .text()
                            .not_null()
                    )
                    .col(
                        ColumnDef::new(Alias::new("notification_type"))
                            .string_len(50)
                            .not_null()
                    )
                    .col(
                        ColumnDef::new(Alias::new("is_read"))
                            .boolean()
                            .not_null()
                            .default(false)
                    )
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp())
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notifications_user")
                            .from(Alias::new("notifications"), Alias::new("user_id"))
                            .to(Alias::new("users"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade)
                    )
                    // 이벤트가 삭제되어도 알림 기록은 남긴다
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notifications_event")
                            .from(Alias::new("notifications"), Alias::new("event_id"))
                            .to(Alias::new("events"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::SetNull)
                    )
                    .to_owned()
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_notifications_user_read")
                    .table(Alias::new("notifications"))
                    .col(Alias::new("user_id"))
                    .col(Alias::new("is_read"))
                    .to_owned()
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(Alias::new("notifications"))
                    .to_owned()
            )
            .await
    }
}
