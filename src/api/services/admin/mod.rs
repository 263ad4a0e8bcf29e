//! Admin API 服务模块
//!
//! 该模块包含管理 API 的所有端点：
//! - 用户管理
//! - 付款记录
//! - 灵修内容
//! - 点击统计

pub mod analytics;
pub mod devotionals;
pub mod error_code;
mod helpers;
pub mod payments;
pub mod routes;
mod types;
pub mod users;

// 重新导出类型
pub use types::*;

// 重新导出帮助函数
pub use helpers::{
    CookieBuilder, api_result, created_response, error_from_linkhub, error_response,
    json_error_handler, json_response, paginated_response, query_error_handler, resource_result,
    success_response,
};

// 重新导出错误码
pub use error_code::ErrorCode;
