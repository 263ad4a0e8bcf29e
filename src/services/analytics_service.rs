//! Click tracking and analytics queries

use std::sync::Arc;

use tracing::debug;

use crate::config::get_config;
use crate::errors::{LinkhubError, Result};
use crate::storage::{AnalyticsStats, DailyStat, NewClick, SeaOrmStorage};
use crate::utils::ip::{UNKNOWN_IP, hash_ip};
use crate::utils::non_empty;

const MAX_PLATFORM_LENGTH: usize = 64;
const MAX_URL_LENGTH: usize = 2048;
const MAX_STATS_DAYS: u32 = 365;

/// A click as reported by the landing page
#[derive(Debug, Clone, Default)]
pub struct ClickRequest {
    pub platform: String,
    pub url: String,
    pub user_agent: Option<String>,
    /// Resolved client IP, hashed before storage
    pub ip: Option<String>,
    pub referrer: Option<String>,
}

pub struct AnalyticsService {
    storage: Arc<SeaOrmStorage>,
}

impl AnalyticsService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// 记录一次外链点击，返回 click id
    pub async fn track_click(&self, req: ClickRequest) -> Result<i64> {
        let platform = req.platform.trim();
        let url = req.url.trim();

        if platform.is_empty() || url.is_empty() {
            return Err(LinkhubError::validation(
                "Missing required fields: platform and url",
            ));
        }
        if platform.chars().count() > MAX_PLATFORM_LENGTH {
            return Err(LinkhubError::validation(format!(
                "platform must be at most {} characters",
                MAX_PLATFORM_LENGTH
            )));
        }
        if url.len() > MAX_URL_LENGTH {
            return Err(LinkhubError::validation(format!(
                "url must be at most {} bytes",
                MAX_URL_LENGTH
            )));
        }

        let salt = &get_config().analytics.ip_hash_salt;
        let ip_hash = non_empty(req.ip.as_deref())
            .filter(|ip| ip != UNKNOWN_IP)
            .map(|ip| hash_ip(&ip, salt));

        let click = NewClick {
            platform: platform.to_string(),
            url: url.to_string(),
            user_agent: non_empty(req.user_agent.as_deref()),
            ip_hash,
            referrer: non_empty(req.referrer.as_deref()),
        };

        let id = self.storage.register_click(click).await?;
        debug!("Tracked click {} on {}", id, platform);
        Ok(id)
    }

    /// 汇总统计，窗口大小来自 `[analytics]` 配置
    pub async fn stats(&self) -> Result<AnalyticsStats> {
        let config = get_config();
        self.storage
            .all_stats(config.analytics.trend_days, config.analytics.top_links_limit)
            .await
    }

    /// 最近 `days` 天的日汇总（1..=365）
    pub async fn daily_stats(&self, days: u32) -> Result<Vec<DailyStat>> {
        if days == 0 || days > MAX_STATS_DAYS {
            return Err(LinkhubError::validation(format!(
                "days must be between 1 and {}",
                MAX_STATS_DAYS
            )));
        }
        self.storage.daily_stats(days).await
    }
}
