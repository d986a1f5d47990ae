use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("users"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key()
                    )
                    .col(
                        ColumnDef::new(Alias::new("username"))
                            .string_len(80)
                            .not_null()
                            .unique_key()
                    )
                    .col(
                        ColumnDef::new(Alias::new("email"))
                            .string_len(120)
                            .not_null()
                            .unique_key()
                    )
                    .col(
                        ColumnDef::new(Alias::new("password"))
                            .string_len(255)
                            .not_null()
                    )
                    .col(
                        ColumnDef::new(Alias::new("role"))
                            .string_len(20)
                            .not_null()
                            .default("user")
                    )
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp())
                    )
                    .to_owned()
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(Alias::new("users"))
                    .to_owned()
            )
            .await
    }
}
