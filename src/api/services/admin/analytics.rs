//! Admin API 统计端点

use actix_web::{Responder, Result as ActixResult, web};
use std::sync::Arc;

use crate::services::AnalyticsService;

use super::error_code::ErrorCode;
use super::helpers::resource_result;
use super::types::DailyStatsQuery;

const DEFAULT_DAILY_DAYS: u32 = 30;

/// GET /analytics/daily?days=N
pub async fn get_daily_stats(
    query: web::Query<DailyStatsQuery>,
    analytics: web::Data<Arc<AnalyticsService>>,
) -> ActixResult<impl Responder> {
    let days = query.days.unwrap_or(DEFAULT_DAILY_DAYS);
    Ok(resource_result(
        analytics.daily_stats(days).await,
        ErrorCode::AnalyticsQueryFailed,
    ))
}

/// GET /analytics/stats
pub async fn get_stats(analytics: web::Data<Arc<AnalyticsService>>) -> ActixResult<impl Responder> {
    Ok(resource_result(
        analytics.stats().await,
        ErrorCode::AnalyticsQueryFailed,
    ))
}
