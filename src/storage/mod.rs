use std::sync::Arc;

use crate::errors::Result;

pub mod backend;
pub mod models;

pub use backend::SeaOrmStorage;
pub use models::*;

pub struct StorageFactory;

impl StorageFactory {
    /// 按静态配置打开 analytics 与 users 两个数据库
    pub async fn create() -> Result<Arc<SeaOrmStorage>> {
        let config = crate::config::get_config();
        let storage =
            SeaOrmStorage::new(&config.database.analytics_url, &config.database.users_url).await?;
        Ok(Arc::new(storage))
    }
}
