//! 点击记录与聚合查询
//!
//! 写入：插入一条 click，同时在同一事务内对当天的 daily_stats 做 +1 upsert。
//! 读取：COUNT / GROUP BY 聚合，日期分组表达式按数据库方言生成。

use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{
    ActiveValue::Set,
    ColumnTrait, ConnectionTrait, DatabaseBackend, DbErr, EntityTrait, ExprTrait, FromQueryResult, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    sea_query::{Expr, OnConflict},
};
use tracing::debug;

use super::converters::model_to_daily_stat;
use super::SeaOrmStorage;
use crate::errors::Result;
use crate::storage::models::{
    AnalyticsStats, DailyStat, DateCount, NewClick, PlatformCount, TopLink,
};
use migration::entities::{click, daily_stat};

#[derive(Debug, FromQueryResult)]
struct PlatformRow {
    platform: String,
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct DateRow {
    label: String,
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct TopLinkRow {
    platform: String,
    url: String,
    count: i64,
}

/// 按 UTC 日期分组的表达式（YYYY-MM-DD）
///
/// MySQL 的 TIMESTAMP 按会话时区读出，PostgreSQL 的 timestamptz 按会话
/// TimeZone 格式化，两者都先换算到 UTC 再取日期。
pub(crate) fn click_date_expr(backend: DatabaseBackend) -> Expr {
    match backend {
        DatabaseBackend::Sqlite => Expr::cust("strftime('%Y-%m-%d', clicked_at)"),
        DatabaseBackend::MySql => Expr::cust(
            "DATE_FORMAT(CONVERT_TZ(clicked_at, @@session.time_zone, '+00:00'), '%Y-%m-%d')",
        ),
        _ => Expr::cust("TO_CHAR(clicked_at AT TIME ZONE 'UTC', 'YYYY-MM-DD')"),
    }
}

/// daily_stats 的累加 upsert：total_clicks += excluded.total_clicks
fn daily_stats_on_conflict(backend: DatabaseBackend) -> OnConflict {
    let increment = match backend {
        DatabaseBackend::MySql => Expr::cust("VALUES(total_clicks)"),
        _ => Expr::cust("excluded.total_clicks"),
    };

    OnConflict::column(daily_stat::Column::Date)
        .value(
            daily_stat::Column::TotalClicks,
            Expr::col(daily_stat::Column::TotalClicks).add(increment),
        )
        .update_column(daily_stat::Column::UpdatedAt)
        .to_owned()
}

/// 插入 click 并累加当天 daily_stats，调用方负责事务边界
async fn insert_click<C: ConnectionTrait>(
    conn: &C,
    click_model: click::ActiveModel,
    stat_model: daily_stat::ActiveModel,
    on_conflict: OnConflict,
) -> std::result::Result<i64, DbErr> {
    let inserted = click::Entity::insert(click_model).exec(conn).await?;

    daily_stat::Entity::insert(stat_model)
        .on_conflict(on_conflict)
        .exec_without_returning(conn)
        .await?;

    Ok(inserted.last_insert_id)
}

impl SeaOrmStorage {
    /// 记录一次点击，返回新 click 的 id
    pub async fn register_click(&self, new_click: NewClick) -> Result<i64> {
        let now = Utc::now();
        let today = now.date_naive();

        let click_model = click::ActiveModel {
            platform: Set(new_click.platform),
            url: Set(new_click.url),
            clicked_at: Set(now),
            user_agent: Set(new_click.user_agent),
            ip_hash: Set(new_click.ip_hash),
            referrer: Set(new_click.referrer),
            ..Default::default()
        };
        let stat_model = daily_stat::ActiveModel {
            date: Set(today),
            total_clicks: Set(1),
            updated_at: Set(now),
            ..Default::default()
        };
        let on_conflict = daily_stats_on_conflict(self.analytics_backend());

        let click_id = self
            .write("register_click", || async {
                let txn = self.analytics_db.begin().await?;
                let id = insert_click(
                    &txn,
                    click_model.clone(),
                    stat_model.clone(),
                    on_conflict.clone(),
                )
                .await?;
                txn.commit().await?;
                Ok(id)
            })
            .await?;

        debug!("Click {} recorded for {}", click_id, today);
        Ok(click_id)
    }

    /// 总点击数
    pub async fn total_clicks(&self) -> Result<u64> {
        Ok(click::Entity::find().count(&self.analytics_db).await?)
    }

    /// 最近 24 小时点击数
    pub async fn recent_clicks(&self) -> Result<u64> {
        let since = Utc::now() - Duration::hours(24);
        Ok(click::Entity::find()
            .filter(click::Column::ClickedAt.gte(since))
            .count(&self.analytics_db)
            .await?)
    }

    /// 按平台分组，点击数降序
    pub async fn clicks_by_platform(&self) -> Result<Vec<PlatformCount>> {
        let rows = click::Entity::find()
            .select_only()
            .column(click::Column::Platform)
            .column_as(click::Column::Id.count(), "count")
            .group_by(click::Column::Platform)
            .order_by_desc(Expr::cust("count"))
            .order_by_asc(click::Column::Platform)
            .into_model::<PlatformRow>()
            .all(&self.analytics_db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| PlatformCount {
                platform: r.platform,
                count: Ord::max(r.count, 0) as u64,
            })
            .collect())
    }

    /// 最近 `days` 天的每日点击数（UTC 日期升序，无点击的日期不出现）
    pub async fn clicks_last_days(&self, days: u32) -> Result<Vec<DateCount>> {
        let since = Utc::now() - Duration::days(i64::from(days));
        let date_expr = click_date_expr(self.analytics_backend());

        let rows = click::Entity::find()
            .select_only()
            .column_as(date_expr.clone(), "label")
            .column_as(click::Column::Id.count(), "count")
            .filter(click::Column::ClickedAt.gte(since))
            .group_by(date_expr)
            .order_by_asc(Expr::cust("label"))
            .into_model::<DateRow>()
            .all(&self.analytics_db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| DateCount {
                date: r.label,
                count: Ord::max(r.count, 0) as u64,
            })
            .collect())
    }

    /// 点击最多的链接
    pub async fn top_links(&self, limit: u64) -> Result<Vec<TopLink>> {
        let rows = click::Entity::find()
            .select_only()
            .column(click::Column::Platform)
            .column(click::Column::Url)
            .column_as(click::Column::Id.count(), "count")
            .group_by(click::Column::Url)
            .group_by(click::Column::Platform)
            .order_by_desc(Expr::cust("count"))
            .order_by_asc(click::Column::Url)
            .limit(limit)
            .into_model::<TopLinkRow>()
            .all(&self.analytics_db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| TopLink {
                platform: r.platform,
                url: r.url,
                count: Ord::max(r.count, 0) as u64,
            })
            .collect())
    }

    /// 最近 `days` 个日期（含今天）的 daily_stats 行，日期升序
    pub async fn daily_stats(&self, days: u32) -> Result<Vec<DailyStat>> {
        let today = Utc::now().date_naive();
        let from: NaiveDate = today - Duration::days(i64::from(Ord::max(days, 1)) - 1);

        let models = daily_stat::Entity::find()
            .filter(daily_stat::Column::Date.gte(from))
            .order_by_asc(daily_stat::Column::Date)
            .all(&self.analytics_db)
            .await?;

        Ok(models.into_iter().map(model_to_daily_stat).collect())
    }

    /// 汇总统计
    pub async fn all_stats(&self, trend_days: u32, top_limit: u64) -> Result<AnalyticsStats> {
        Ok(AnalyticsStats {
            total_clicks: self.total_clicks().await?,
            clicks_last_24h: self.recent_clicks().await?,
            clicks_by_platform: self.clicks_by_platform().await?,
            trend: self.clicks_last_days(trend_days).await?,
            top_links: self.top_links(top_limit).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::QueryTrait;

    #[test]
    fn test_click_date_expr_per_backend() {
        let sql = click::Entity::find()
            .select_only()
            .column_as(click_date_expr(DatabaseBackend::Sqlite), "label")
            .build(DatabaseBackend::Sqlite)
            .to_string();
        assert!(sql.contains("strftime('%Y-%m-%d', clicked_at)"));

        let sql = click::Entity::find()
            .select_only()
            .column_as(click_date_expr(DatabaseBackend::Postgres), "label")
            .build(DatabaseBackend::Postgres)
            .to_string();
        assert!(sql.contains("TO_CHAR(clicked_at AT TIME ZONE 'UTC', 'YYYY-MM-DD')"));

        let sql = click::Entity::find()
            .select_only()
            .column_as(click_date_expr(DatabaseBackend::MySql), "label")
            .build(DatabaseBackend::MySql)
            .to_string();
        assert!(sql.contains(
            "DATE_FORMAT(CONVERT_TZ(clicked_at, @@session.time_zone, '+00:00'), '%Y-%m-%d')"
        ));
    }

    #[test]
    fn test_daily_stats_upsert_increments() {
        let model = daily_stat::ActiveModel {
            date: Set(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()),
            total_clicks: Set(1),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };

        let sql = daily_stat::Entity::insert(model.clone())
            .on_conflict(daily_stats_on_conflict(DatabaseBackend::Sqlite))
            .build(DatabaseBackend::Sqlite)
            .to_string();
        assert!(sql.contains("ON CONFLICT"));
        assert!(sql.contains("excluded.total_clicks"));

        let sql = daily_stat::Entity::insert(model)
            .on_conflict(daily_stats_on_conflict(DatabaseBackend::MySql))
            .build(DatabaseBackend::MySql)
            .to_string();
        assert!(sql.contains("ON DUPLICATE KEY UPDATE"));
        assert!(sql.contains("VALUES(total_clicks)"));
    }

    #[tokio::test]
    async fn test_busy_click_write_rolls_back_and_counts_once() {
        use super::super::retry::RetryPolicy;
        use super::super::{connect_sqlite, run_migrations};
        use sea_orm::error::RuntimeErr;
        use std::sync::atomic::{AtomicU32, Ordering};
        use std::time::Duration as StdDuration;

        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("clicks.db").display());
        let db = connect_sqlite(&url).await.unwrap();
        run_migrations::<migration::AnalyticsMigrator>(&db, "Analytics")
            .await
            .unwrap();

        let now = Utc::now();
        let click_model = click::ActiveModel {
            platform: Set("youtube".into()),
            url: Set("https://youtube.com/@linkhub".into()),
            clicked_at: Set(now),
            ..Default::default()
        };
        let stat_model = daily_stat::ActiveModel {
            date: Set(now.date_naive()),
            total_clicks: Set(1),
            updated_at: Set(now),
            ..Default::default()
        };
        let on_conflict = daily_stats_on_conflict(DatabaseBackend::Sqlite);

        let policy = RetryPolicy {
            retries: 3,
            base_delay: StdDuration::from_millis(5),
            max_delay: StdDuration::from_millis(20),
        };
        let attempts = AtomicU32::new(0);

        // 第一次在提交前报 BUSY，事务随之回滚
        let click_id = policy
            .run("register_click", || {
                let attempt = attempts.fetch_add(1, Ordering::SeqCst);
                let (db, c, st, oc) = (
                    &db,
                    click_model.clone(),
                    stat_model.clone(),
                    on_conflict.clone(),
                );
                async move {
                    let txn = db.begin().await?;
                    let id = insert_click(&txn, c, st, oc).await?;
                    if attempt == 0 {
                        return Err(DbErr::Exec(RuntimeErr::Internal(
                            "database is locked".into(),
                        )));
                    }
                    txn.commit().await?;
                    Ok(id)
                }
            })
            .await
            .unwrap();

        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert!(click_id > 0);
        assert_eq!(click::Entity::find().count(&db).await.unwrap(), 1);

        let stats = daily_stat::Entity::find().all(&db).await.unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].total_clicks, 1);
    }
}
