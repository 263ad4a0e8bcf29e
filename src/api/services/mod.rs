pub mod admin;
pub mod auth;
pub mod frontend;
pub mod health;
pub mod public;

use actix_web::web;

use crate::api::middleware::AdminAuth;

pub use auth::auth_routes;
pub use frontend::{FrontendService, frontend_routes};
pub use health::{AppStartTime, HealthService, health_routes};
pub use public::public_routes;

/// JSON / 查询参数解析错误统一返回 API 信封
pub fn extractor_configs(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(admin::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(admin::query_error_handler))
        .app_data(web::PayloadConfig::new(1024 * 1024));
}

/// 挂载全部路由：`/api/auth`、`/api/admin`、公开 `/api`、`/health` 与落地页
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(auth_routes())
            .service(
                web::scope("/admin")
                    .wrap(AdminAuth)
                    .configure(admin::routes::admin_routes),
            )
            .configure(public_routes),
    )
    .service(health_routes())
    .configure(frontend_routes);
}
