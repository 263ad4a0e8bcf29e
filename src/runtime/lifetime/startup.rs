use crate::config::get_config;
use crate::services::{
    AnalyticsService, DevotionalService, LiveStatusService, PaymentService, UserService,
};
use crate::storage::{SeaOrmStorage, StorageFactory};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub user_service: Arc<UserService>,
    pub analytics_service: Arc<AnalyticsService>,
    pub devotional_service: Arc<DevotionalService>,
    pub payment_service: Arc<PaymentService>,
    pub live_service: Arc<LiveStatusService>,
}

/// 准备服务器启动的上下文
/// 包括存储、默认管理员与各业务服务
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    // ureq 与 sqlx 共用 ring provider，重复安装时忽略
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    let config = get_config();

    let storage = StorageFactory::create()
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", storage.backend_name());

    let user_service = Arc::new(UserService::new(storage.clone()));
    user_service
        .ensure_bootstrap_admin(&config.bootstrap)
        .await
        .context("Failed to bootstrap admin account")?;

    if config.auth.jwt_secret.is_empty() {
        warn!(
            "auth.jwt_secret is empty, a random secret is generated. \
             Sessions will not survive a restart."
        );
    }

    if config.analytics.ip_hash_salt.is_empty() {
        warn!("analytics.ip_hash_salt is empty, client IP hashes are unsalted");
    }

    let live_service = Arc::new(LiveStatusService::new(&config.live));
    let context = StartupContext {
        analytics_service: Arc::new(AnalyticsService::new(storage.clone())),
        devotional_service: Arc::new(DevotionalService::new(storage.clone())),
        payment_service: Arc::new(PaymentService::new(storage.clone())),
        user_service,
        live_service,
        storage,
    };

    info!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );
    Ok(context)
}
