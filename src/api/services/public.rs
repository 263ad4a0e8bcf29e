//! 公开端点（落地页使用）

use actix_cors::Cors;
use actix_web::http::{StatusCode, header};
use actix_web::{HttpRequest, Responder, Result as ActixResult, web};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::trace;

use crate::config::get_config;
use crate::errors::LinkhubError;
use crate::services::{
    AnalyticsService, ClickRequest, DevotionalService, LiveStatus, LiveStatusService,
};
use crate::utils::ip::extract_client_ip;

use super::admin::{
    ErrorCode, api_result, error_from_linkhub, json_response, resource_result, success_response,
};

#[derive(Deserialize, Clone, Debug, Default)]
pub struct ClickBody {
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub referrer: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ClickResponse {
    pub click_id: i64,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct FeedQuery {
    pub limit: Option<u64>,
}

fn header_value(req: &HttpRequest, name: header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
}

/// POST /api/analytics/click
pub async fn track_click(
    req: HttpRequest,
    body: web::Json<ClickBody>,
    analytics: web::Data<Arc<AnalyticsService>>,
) -> ActixResult<impl Responder> {
    let body = body.into_inner();
    let click = ClickRequest {
        platform: body.platform.unwrap_or_default(),
        url: body.url.unwrap_or_default(),
        user_agent: header_value(&req, header::USER_AGENT),
        ip: Some(extract_client_ip(&req)),
        referrer: body.referrer.or_else(|| header_value(&req, header::REFERER)),
    };

    Ok(match analytics.track_click(click).await {
        Ok(click_id) => {
            trace!("Click {} recorded", click_id);
            json_response(
                StatusCode::OK,
                ErrorCode::Success,
                "Click tracked",
                Some(ClickResponse { click_id }),
            )
        }
        Err(e @ LinkhubError::Validation(_)) => json_response::<()>(
            StatusCode::BAD_REQUEST,
            ErrorCode::ClickInvalid,
            e.message(),
            None,
        ),
        Err(e) => error_from_linkhub(&e),
    })
}

/// GET /api/analytics/stats
pub async fn analytics_stats(
    analytics: web::Data<Arc<AnalyticsService>>,
) -> ActixResult<impl Responder> {
    Ok(resource_result(
        analytics.stats().await,
        ErrorCode::AnalyticsQueryFailed,
    ))
}

/// GET /api/devotionals?limit=N
pub async fn devotional_feed(
    query: web::Query<FeedQuery>,
    devotionals: web::Data<Arc<DevotionalService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(devotionals.published_feed(query.limit).await))
}

/// GET /api/live
///
/// 上游失败时返回 502，data 为离线状态并带上错误信息。
pub async fn live_status(live: web::Data<Arc<LiveStatusService>>) -> ActixResult<impl Responder> {
    Ok(match live.status().await {
        Ok(status) => json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(status)),
        Err(e) => json_response(
            StatusCode::BAD_GATEWAY,
            ErrorCode::LiveStatusUnavailable,
            e.message(),
            Some(LiveStatus::failed(e.message())),
        ),
    })
}

/// GET /api/profile
pub async fn profile() -> ActixResult<impl Responder> {
    Ok(success_response(get_config().profile.clone()))
}

/// 点击上报允许任意来源跨域
fn click_cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["POST", "OPTIONS"])
        .allowed_header(header::CONTENT_TYPE)
        .max_age(3600)
}

/// 公开路由，挂载在 `/api` 下
pub fn public_routes(cfg: &mut web::ServiceConfig) {
    // `/analytics/track` 是旧前端使用的别名
    cfg.service(
        web::resource(["/analytics/click", "/analytics/track"])
            .wrap(click_cors())
            .route(web::post().to(track_click)),
    )
    .route("/analytics/stats", web::get().to(analytics_stats))
    .route("/devotionals", web::get().to(devotional_feed))
    .route("/live", web::get().to(live_status))
    .route("/profile", web::get().to(profile));
}
