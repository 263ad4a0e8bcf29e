//! 写操作重试
//!
//! 点击并发写入时 SQLite 会返回 BUSY/LOCKED，MySQL/PostgreSQL 会出现死锁或
//! 序列化失败。遇到这类瞬时错误时整个写操作重跑：闭包内开启的事务在出错时
//! 被 drop 并回滚，所以重跑不会重复计数。其余错误原样返回。

use std::future::Future;
use std::time::Duration;

use rand::RngExt;
use sea_orm::DbErr;
use sea_orm::error::RuntimeErr;
use tracing::{debug, warn};

use crate::config::DatabaseConfig;

/// 瞬时错误码
const TRANSIENT_CODES: &[&str] = &[
    // SQLITE_BUSY / SQLITE_LOCKED / SQLITE_BUSY_SNAPSHOT
    "5", "6", "517",
    // MySQL: lock wait timeout / deadlock
    "1205", "1213",
    // PostgreSQL: serialization_failure / deadlock_detected
    "40001", "40P01",
];

/// 没有错误码时按消息匹配（小写）
const TRANSIENT_MESSAGES: &[&str] = &[
    "database is locked",
    "database table is locked",
    "deadlock",
    "lock wait timeout",
    "could not serialize access",
    "serialization failure",
];

/// 是否值得重跑
pub fn is_transient(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Exec(runtime) | DbErr::Query(runtime) => runtime_is_transient(runtime),
        _ => false,
    }
}

fn runtime_is_transient(err: &RuntimeErr) -> bool {
    let message = match err {
        RuntimeErr::SqlxError(sqlx_err) => {
            let code = sqlx_err.as_database_error().and_then(|db_err| db_err.code());
            if let Some(code) = code {
                let code: &str = &code;
                return TRANSIENT_CODES.iter().any(|c| *c == code);
            }
            sqlx_err.to_string()
        }
        RuntimeErr::Internal(msg) => msg.clone(),
        #[allow(unreachable_patterns)]
        _ => return false,
    };

    let message = message.to_lowercase();
    TRANSIENT_MESSAGES.iter().any(|m| message.contains(m))
}

/// 写操作的重试策略（来自 `[database]` 配置）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 首次失败后最多再跑几次
    pub retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(2000),
        }
    }
}

impl From<&DatabaseConfig> for RetryPolicy {
    fn from(config: &DatabaseConfig) -> Self {
        let base_delay = Duration::from_millis(config.retry_base_delay_ms);
        Self {
            retries: config.retry_count,
            base_delay,
            max_delay: Duration::from_millis(config.retry_max_delay_ms).max(base_delay),
        }
    }
}

impl RetryPolicy {
    /// 第 `retry` 次重跑前的等待：base * 2^(retry-1)，封顶 max_delay，再加 0-25% 抖动
    pub fn delay_before(&self, retry: u32) -> Duration {
        let shift = retry.saturating_sub(1).min(16);
        let delay = self.base_delay.saturating_mul(1 << shift).min(self.max_delay);

        let jitter_ms = (delay.as_millis() / 4) as u64;
        if jitter_ms == 0 {
            return delay;
        }
        delay + Duration::from_millis(rand::rng().random_range(0..=jitter_ms))
    }

    /// 执行 `op`，瞬时错误时按退避重跑
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, DbErr>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DbErr>>,
    {
        let mut retry = 0;
        loop {
            let err = match op().await {
                Ok(value) => {
                    if retry > 0 {
                        debug!("{} succeeded on retry {}", label, retry);
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            if !is_transient(&err) {
                return Err(err);
            }
            if retry >= self.retries {
                warn!("{} gave up after {} attempts: {}", label, retry + 1, err);
                return Err(err);
            }

            retry += 1;
            let delay = self.delay_before(retry);
            warn!(
                "{} hit a transient error ({}), retry {}/{} in {:?}",
                label, err, retry, self.retries, delay
            );
            tokio::time::sleep(delay).await;
        }
    }
}
