//! SeaORM storage backend
//!
//! Two databases are opened side by side: the analytics store (clicks,
//! daily stats, devotionals, payments) and the users store. Each URL may
//! point at SQLite, MySQL/MariaDB or PostgreSQL.

mod clicks;
mod connection;
mod converters;
mod devotionals;
mod payments;
pub mod retry;
mod users;

use std::future::Future;
use std::time::Duration;

use moka::sync::Cache;
use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr};
use tracing::{info, warn};

use crate::errors::{LinkhubError, Result};
use migration::{AnalyticsMigrator, UsersMigrator};

pub use connection::{connect_generic, connect_sqlite, run_migrations};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(LinkhubError::database_config(format!(
            "Cannot infer database type from URL: {}. Supported: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

async fn open(database_url: &str, backend_name: &str) -> Result<DatabaseConnection> {
    if backend_name == "sqlite" {
        connect_sqlite(database_url).await
    } else {
        connect_generic(database_url, backend_name).await
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    analytics_db: DatabaseConnection,
    users_db: DatabaseConnection,
    backend_name: String,
    /// 用户列表 COUNT 缓存（TTL 30 秒），写操作时清空
    count_cache: Cache<String, u64>,
    retry: retry::RetryPolicy,
}

impl SeaOrmStorage {
    pub async fn new(analytics_url: &str, users_url: &str) -> Result<Self> {
        if analytics_url.is_empty() || users_url.is_empty() {
            return Err(LinkhubError::database_config(
                "database.analytics_url and database.users_url must both be set",
            ));
        }

        let config = crate::config::get_config();
        let retry = retry::RetryPolicy::from(&config.database);

        let analytics_backend = infer_backend_from_url(analytics_url)?;
        let users_backend = infer_backend_from_url(users_url)?;

        let analytics_db = open(analytics_url, &analytics_backend).await?;
        run_migrations::<AnalyticsMigrator>(&analytics_db, "Analytics").await?;

        let users_db = open(users_url, &users_backend).await?;
        run_migrations::<UsersMigrator>(&users_db, "Users").await?;

        let backend_name = if analytics_backend == users_backend {
            analytics_backend
        } else {
            format!("{}+{}", analytics_backend, users_backend)
        };

        info!("{} storage initialized", backend_name.to_uppercase());

        Ok(SeaOrmStorage {
            analytics_db,
            users_db,
            backend_name,
            count_cache: Cache::builder()
                .time_to_live(Duration::from_secs(30))
                .max_capacity(100)
                .build(),
            retry,
        })
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    pub fn analytics_db(&self) -> &DatabaseConnection {
        &self.analytics_db
    }

    pub fn users_db(&self) -> &DatabaseConnection {
        &self.users_db
    }

    pub(crate) fn analytics_backend(&self) -> DatabaseBackend {
        self.analytics_db.get_database_backend()
    }

    /// 带重试的写操作，`op` 每次重跑都要从头开始（包括开启事务）
    pub(crate) async fn write<T, F, Fut>(&self, label: &str, op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, DbErr>>,
    {
        Ok(self.retry.run(label, op).await?)
    }

    /// 清除分页 COUNT 缓存（数据变更时调用）
    pub fn invalidate_count_cache(&self) {
        self.count_cache.invalidate_all();
    }

    /// 两个库的连通性检查（健康检查使用）
    pub async fn ping(&self) -> Result<()> {
        self.analytics_db.ping().await?;
        self.users_db.ping().await?;
        Ok(())
    }

    /// 关闭连接池
    pub async fn close(&self) {
        if let Err(e) = self.analytics_db.clone().close().await {
            warn!("Failed to close analytics database: {}", e);
        }
        if let Err(e) = self.users_db.clone().close().await {
            warn!("Failed to close users database: {}", e);
        }
        info!("Database connections closed");
    }
}
