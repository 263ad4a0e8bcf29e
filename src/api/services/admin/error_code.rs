//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::LinkhubError;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字。按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 2000-2099: 认证错误
/// - 3000-3099: 用户错误
/// - 4000-4099: 付款错误
/// - 5000-5099: 灵修内容错误
/// - 6000-6099: 统计与直播错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    // 成功
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    InternalServerError = 1005,
    Conflict = 1009,
    InvalidDateFormat = 1012,
    ServiceUnavailable = 1030,

    // 认证错误 2000-2099
    AuthFailed = 2000,
    TokenExpired = 2001,
    TokenInvalid = 2002,
    RateLimitExceeded = 2004,
    AccountInactive = 2005,
    AdminRequired = 2006,

    // 用户错误 3000-3099
    UserNotFound = 3000,
    UserEmailExists = 3001,
    UserSelfProtection = 3002,
    UserPasswordHashError = 3003,

    // 付款错误 4000-4099
    PaymentNotFound = 4000,
    PaymentInvalidDateRange = 4001,

    // 灵修内容错误 5000-5099
    DevotionalNotFound = 5000,

    // 统计与直播错误 6000-6099
    AnalyticsQueryFailed = 6000,
    ClickInvalid = 6001,
    LiveStatusUnavailable = 6002,
}

impl From<&LinkhubError> for ErrorCode {
    fn from(err: &LinkhubError) -> Self {
        match err {
            LinkhubError::Validation(_) => ErrorCode::BadRequest,
            LinkhubError::DateParse(_) => ErrorCode::InvalidDateFormat,
            LinkhubError::NotFound(_) => ErrorCode::NotFound,
            LinkhubError::Conflict(_) => ErrorCode::Conflict,
            LinkhubError::Unauthorized(_) => ErrorCode::Unauthorized,
            LinkhubError::Forbidden(_) => ErrorCode::Forbidden,
            LinkhubError::ExternalService(_) => ErrorCode::ServiceUnavailable,
            LinkhubError::PasswordHash(_) => ErrorCode::UserPasswordHashError,
            LinkhubError::DatabaseConfig(_)
            | LinkhubError::DatabaseConnection(_)
            | LinkhubError::DatabaseOperation(_)
            | LinkhubError::FileOperation(_)
            | LinkhubError::Serialization(_)
            | LinkhubError::Config(_) => ErrorCode::InternalServerError,
        }
    }
}

impl From<LinkhubError> for ErrorCode {
    fn from(err: LinkhubError) -> Self {
        ErrorCode::from(&err)
    }
}
