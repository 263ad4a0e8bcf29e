use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum LinkhubError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Validation(String),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
    Forbidden(String),
    ExternalService(String),
    Serialization(String),
    DateParse(String),
    PasswordHash(String),
    Config(String),
}

impl LinkhubError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            LinkhubError::DatabaseConfig(_) => "E001",
            LinkhubError::DatabaseConnection(_) => "E002",
            LinkhubError::DatabaseOperation(_) => "E003",
            LinkhubError::FileOperation(_) => "E004",
            LinkhubError::Validation(_) => "E005",
            LinkhubError::NotFound(_) => "E006",
            LinkhubError::Conflict(_) => "E007",
            LinkhubError::Unauthorized(_) => "E008",
            LinkhubError::Forbidden(_) => "E009",
            LinkhubError::ExternalService(_) => "E010",
            LinkhubError::Serialization(_) => "E011",
            LinkhubError::DateParse(_) => "E012",
            LinkhubError::PasswordHash(_) => "E013",
            LinkhubError::Config(_) => "E014",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            LinkhubError::DatabaseConfig(_) => "Database Configuration Error",
            LinkhubError::DatabaseConnection(_) => "Database Connection Error",
            LinkhubError::DatabaseOperation(_) => "Database Operation Error",
            LinkhubError::FileOperation(_) => "File Operation Error",
            LinkhubError::Validation(_) => "Validation Error",
            LinkhubError::NotFound(_) => "Resource Not Found",
            LinkhubError::Conflict(_) => "Resource Conflict",
            LinkhubError::Unauthorized(_) => "Unauthorized",
            LinkhubError::Forbidden(_) => "Forbidden",
            LinkhubError::ExternalService(_) => "External Service Error",
            LinkhubError::Serialization(_) => "Serialization Error",
            LinkhubError::DateParse(_) => "Date Parse Error",
            LinkhubError::PasswordHash(_) => "Password Hash Error",
            LinkhubError::Config(_) => "Configuration Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            LinkhubError::DatabaseConfig(msg)
            | LinkhubError::DatabaseConnection(msg)
            | LinkhubError::DatabaseOperation(msg)
            | LinkhubError::FileOperation(msg)
            | LinkhubError::Validation(msg)
            | LinkhubError::NotFound(msg)
            | LinkhubError::Conflict(msg)
            | LinkhubError::Unauthorized(msg)
            | LinkhubError::Forbidden(msg)
            | LinkhubError::ExternalService(msg)
            | LinkhubError::Serialization(msg)
            | LinkhubError::DateParse(msg)
            | LinkhubError::PasswordHash(msg)
            | LinkhubError::Config(msg) => msg,
        }
    }

    /// 对应的 HTTP 状态码
    pub fn http_status(&self) -> StatusCode {
        match self {
            LinkhubError::Validation(_) | LinkhubError::DateParse(_) => StatusCode::BAD_REQUEST,
            LinkhubError::NotFound(_) => StatusCode::NOT_FOUND,
            LinkhubError::Conflict(_) => StatusCode::CONFLICT,
            LinkhubError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            LinkhubError::Forbidden(_) => StatusCode::FORBIDDEN,
            LinkhubError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for LinkhubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LinkhubError {}

// 便捷的构造函数
impl LinkhubError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        LinkhubError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        LinkhubError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        LinkhubError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        LinkhubError::FileOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        LinkhubError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        LinkhubError::NotFound(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        LinkhubError::Conflict(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        LinkhubError::Unauthorized(msg.into())
    }

    pub fn forbidden<T: Into<String>>(msg: T) -> Self {
        LinkhubError::Forbidden(msg.into())
    }

    pub fn external_service<T: Into<String>>(msg: T) -> Self {
        LinkhubError::ExternalService(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        LinkhubError::Serialization(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        LinkhubError::DateParse(msg.into())
    }

    pub fn password_hash<T: Into<String>>(msg: T) -> Self {
        LinkhubError::PasswordHash(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        LinkhubError::Config(msg.into())
    }
}

// 唯一约束冲突单独映射为 Conflict，其余数据库错误统一为 DatabaseOperation
impl From<sea_orm::DbErr> for LinkhubError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(msg)) => LinkhubError::Conflict(msg),
            _ => LinkhubError::DatabaseOperation(err.to_string()),
        }
    }
}

impl From<std::io::Error> for LinkhubError {
    fn from(err: std::io::Error) -> Self {
        LinkhubError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for LinkhubError {
    fn from(err: serde_json::Error) -> Self {
        LinkhubError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for LinkhubError {
    fn from(err: chrono::ParseError) -> Self {
        LinkhubError::DateParse(err.to_string())
    }
}

impl From<crate::utils::password::PasswordError> for LinkhubError {
    fn from(err: crate::utils::password::PasswordError) -> Self {
        LinkhubError::PasswordHash(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LinkhubError>;
