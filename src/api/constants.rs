//! API 模块常量定义

/// Access Token Cookie 名称
pub const ACCESS_COOKIE_NAME: &str = "linkhub_access";

/// Refresh Token Cookie 名称
pub const REFRESH_COOKIE_NAME: &str = "linkhub_refresh";

/// Refresh cookie 只在会话接口下发送
pub const REFRESH_COOKIE_PATH: &str = "/api/auth";

/// 默认分页大小
pub const DEFAULT_PAGE_SIZE: u64 = 20;
