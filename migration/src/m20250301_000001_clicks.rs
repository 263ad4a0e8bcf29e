//! 点击记录与日汇总表
//!
//! - clicks: 每次外链点击一行
//! - daily_stats: 按 UTC 日期累计的点击数，date 唯一

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Clicks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Clicks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Clicks::Platform).string_len(64).not_null())
                    .col(ColumnDef::new(Clicks::Url).text().not_null())
                    .col(
                        ColumnDef::new(Clicks::ClickedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Clicks::UserAgent).text().null())
                    .col(ColumnDef::new(Clicks::IpHash).string_len(16).null())
                    .col(ColumnDef::new(Clicks::Referrer).text().null())
                    .to_owned(),
            )
            .await?;

        // 按平台分组
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_clicks_platform")
                    .table(Clicks::Table)
                    .col(Clicks::Platform)
                    .to_owned(),
            )
            .await?;

        // 时间窗口查询（最近 24 小时、N 天趋势）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_clicks_clicked_at")
                    .table(Clicks::Table)
                    .col(Clicks::ClickedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DailyStats::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DailyStats::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DailyStats::Date).date().not_null())
                    .col(
                        ColumnDef::new(DailyStats::TotalClicks)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DailyStats::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // upsert 依赖该唯一索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_daily_stats_date")
                    .table(DailyStats::Table)
                    .col(DailyStats::Date)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DailyStats::Table).to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_clicks_clicked_at").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_clicks_platform").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Clicks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Clicks {
    #[sea_orm(iden = "clicks")]
    Table,
    Id,
    Platform,
    Url,
    ClickedAt,
    UserAgent,
    IpHash,
    Referrer,
}

#[derive(DeriveIden)]
enum DailyStats {
    #[sea_orm(iden = "daily_stats")]
    Table,
    Id,
    Date,
    TotalClicks,
    UpdatedAt,
}
