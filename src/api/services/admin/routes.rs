//! Admin API 路由配置
//!
//! `/api/admin` 下的路由按资源拆分，整个 scope 由 `AdminAuth` 保护。

use actix_web::web;

use super::analytics::{get_daily_stats, get_stats};
use super::devotionals::{
    create_devotional, delete_devotional, get_devotional, list_devotionals, restore_devotional,
    update_devotional,
};
use super::payments::{
    create_payment, delete_payment, get_payment, list_payments, payment_summary, update_payment,
};
use super::users::{
    activate_user, create_user, deactivate_user, delete_user, get_user, list_users, update_user,
};

/// 用户管理路由 `/users`
pub fn users_routes() -> actix_web::Scope {
    web::scope("/users")
        .route("", web::get().to(list_users))
        .route("", web::post().to(create_user))
        .route("/{id}/activate", web::post().to(activate_user))
        .route("/{id}/deactivate", web::post().to(deactivate_user))
        .route("/{id}", web::get().to(get_user))
        .route("/{id}", web::put().to(update_user))
        .route("/{id}", web::delete().to(delete_user))
}

/// 付款路由 `/payments`
///
/// `/summary` 必须在 `/{id}` 之前注册
pub fn payments_routes() -> actix_web::Scope {
    web::scope("/payments")
        .route("", web::get().to(list_payments))
        .route("", web::post().to(create_payment))
        .route("/summary", web::get().to(payment_summary))
        .route("/{id}", web::get().to(get_payment))
        .route("/{id}", web::put().to(update_payment))
        .route("/{id}", web::delete().to(delete_payment))
}

/// 灵修内容路由 `/devotionals`
pub fn devotionals_routes() -> actix_web::Scope {
    web::scope("/devotionals")
        .route("", web::get().to(list_devotionals))
        .route("", web::post().to(create_devotional))
        .route("/{id}/restore", web::post().to(restore_devotional))
        .route("/{id}", web::get().to(get_devotional))
        .route("/{id}", web::put().to(update_devotional))
        .route("/{id}", web::delete().to(delete_devotional))
}

/// 统计路由 `/analytics`
pub fn analytics_routes() -> actix_web::Scope {
    web::scope("/analytics")
        .route("/daily", web::get().to(get_daily_stats))
        .route("/stats", web::get().to(get_stats))
}

/// 组合所有 admin 子路由
pub fn admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(users_routes())
        .service(payments_routes())
        .service(devotionals_routes())
        .service(analytics_routes());
}
