//! 灵修内容表（支持软删除）

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Devotionals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Devotionals::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Devotionals::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Devotionals::Content).text().not_null())
                    .col(ColumnDef::new(Devotionals::DevotionalDate).date().not_null())
                    .col(
                        ColumnDef::new(Devotionals::Status)
                            .string_len(16)
                            .not_null()
                            .default("draft"),
                    )
                    .col(
                        ColumnDef::new(Devotionals::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Devotionals::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Devotionals::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, col) in [
            ("idx_devotionals_status", Devotionals::Status),
            ("idx_devotionals_date", Devotionals::DevotionalDate),
            ("idx_devotionals_deleted_at", Devotionals::DeletedAt),
        ] {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(name)
                        .table(Devotionals::Table)
                        .col(col)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_devotionals_deleted_at",
            "idx_devotionals_date",
            "idx_devotionals_status",
        ] {
            manager
                .drop_index(Index::drop().name(name).to_owned())
                .await?;
        }

        manager
            .drop_table(Table::drop().table(Devotionals::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Devotionals {
    #[sea_orm(iden = "devotionals")]
    Table,
    Id,
    Title,
    Content,
    DevotionalDate,
    Status,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
