//! Admin API 帮助函数

use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, error::JsonPayloadError, error::QueryPayloadError};
use serde::Serialize;

use crate::api::constants;
use crate::config::SameSitePolicy;
use crate::errors::LinkhubError;

use super::error_code::ErrorCode;
use super::types::{ApiResponse, PaginatedResponse, PaginationInfo};

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            code: code as i32,
            message: message.into(),
            data,
        })
}

/// 构建成功响应
pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data))
}

/// 201 Created
pub fn created_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::CREATED, ErrorCode::Success, "Created", Some(data))
}

/// 构建错误响应
pub fn error_response(status: StatusCode, error_code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, error_code, message, None)
}

/// 分页列表响应
pub fn paginated_response<T: Serialize>(data: T, pagination: PaginationInfo) -> HttpResponse {
    HttpResponse::Ok()
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(PaginatedResponse {
            code: ErrorCode::Success as i32,
            message: "OK".to_string(),
            data,
            pagination,
        })
}

/// 从 LinkhubError 构建错误响应（自动映射 HTTP 状态码和 ErrorCode）
pub fn error_from_linkhub(err: &LinkhubError) -> HttpResponse {
    if err.http_status().is_server_error() {
        tracing::error!("API error: {}", err);
    }
    error_response(err.http_status(), ErrorCode::from(err), err.message())
}

/// 统一 Result → HttpResponse 转换
///
/// 成功时返回 200 OK + JSON 数据，失败时自动映射 LinkhubError。
pub fn api_result<T, E>(result: Result<T, E>) -> HttpResponse
where
    T: Serialize,
    E: Into<LinkhubError>,
{
    match result {
        Ok(data) => success_response(data),
        Err(e) => error_from_linkhub(&e.into()),
    }
}

/// 与 `api_result` 相同，但 NotFound 使用资源自己的错误码
pub fn resource_result<T: Serialize>(
    result: crate::errors::Result<T>,
    not_found: ErrorCode,
) -> HttpResponse {
    match result {
        Ok(data) => success_response(data),
        Err(e @ LinkhubError::NotFound(_)) => {
            error_response(StatusCode::NOT_FOUND, not_found, e.message())
        }
        Err(e) => error_from_linkhub(&e),
    }
}

/// JSON 请求体解析失败时返回统一信封
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = format!("Invalid JSON body: {}", err);
    actix_web::error::InternalError::from_response(
        err,
        error_response(StatusCode::BAD_REQUEST, ErrorCode::BadRequest, &message),
    )
    .into()
}

/// 查询参数解析失败时返回统一信封
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = format!("Invalid query parameters: {}", err);
    actix_web::error::InternalError::from_response(
        err,
        error_response(StatusCode::BAD_REQUEST, ErrorCode::BadRequest, &message),
    )
    .into()
}

/// Cookie 构建器，消除重复的 cookie 创建代码
pub struct CookieBuilder {
    same_site: SameSite,
    secure: bool,
    domain: Option<String>,
    access_token_minutes: u64,
    refresh_token_days: u64,
}

impl CookieBuilder {
    pub fn from_config() -> Self {
        let config = crate::config::get_config();

        let same_site = match config.auth.cookie_same_site {
            SameSitePolicy::Strict => SameSite::Strict,
            SameSitePolicy::None => SameSite::None,
            SameSitePolicy::Lax => SameSite::Lax,
        };

        Self {
            same_site,
            secure: config.auth.cookie_secure,
            domain: config.auth.cookie_domain.clone(),
            access_token_minutes: config.auth.access_token_minutes,
            refresh_token_days: config.auth.refresh_token_days,
        }
    }

    fn build_cookie_base(
        &self,
        name: &str,
        value: String,
        path: &str,
        max_age: actix_web::cookie::time::Duration,
    ) -> Cookie<'static> {
        let mut cookie = Cookie::new(name.to_string(), value);
        cookie.set_path(path.to_string());
        cookie.set_http_only(true);
        cookie.set_secure(self.secure);
        cookie.set_same_site(self.same_site);
        cookie.set_max_age(max_age);
        if let Some(ref domain) = self.domain {
            cookie.set_domain(domain.clone());
        }
        cookie
    }

    pub fn build_access_cookie(&self, token: String) -> Cookie<'static> {
        self.build_cookie_base(
            constants::ACCESS_COOKIE_NAME,
            token,
            "/",
            actix_web::cookie::time::Duration::minutes(self.access_token_minutes as i64),
        )
    }

    pub fn build_refresh_cookie(&self, token: String) -> Cookie<'static> {
        self.build_cookie_base(
            constants::REFRESH_COOKIE_NAME,
            token,
            constants::REFRESH_COOKIE_PATH,
            actix_web::cookie::time::Duration::days(self.refresh_token_days as i64),
        )
    }

    pub fn build_expired_access_cookie(&self) -> Cookie<'static> {
        self.build_cookie_base(
            constants::ACCESS_COOKIE_NAME,
            String::new(),
            "/",
            actix_web::cookie::time::Duration::ZERO,
        )
    }

    pub fn build_expired_refresh_cookie(&self) -> Cookie<'static> {
        self.build_cookie_base(
            constants::REFRESH_COOKIE_NAME,
            String::new(),
            constants::REFRESH_COOKIE_PATH,
            actix_web::cookie::time::Duration::ZERO,
        )
    }

    pub fn access_token_minutes(&self) -> u64 {
        self.access_token_minutes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response() {
        let response = success_response("success_data");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_created_response() {
        let response = created_response(1);
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[test]
    fn test_error_from_linkhub_maps_status() {
        let response = error_from_linkhub(&LinkhubError::conflict("dup"));
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = error_from_linkhub(&LinkhubError::database_operation("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_resource_result_not_found() {
        let result: crate::errors::Result<()> = Err(LinkhubError::not_found("Payment 9 not found"));
        let response = resource_result(result, ErrorCode::PaymentNotFound);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_refresh_cookie_scoped_to_auth() {
        let builder = CookieBuilder {
            same_site: SameSite::Lax,
            secure: true,
            domain: None,
            access_token_minutes: 15,
            refresh_token_days: 7,
        };

        let refresh = builder.build_refresh_cookie("token".to_string());
        assert_eq!(refresh.path(), Some("/api/auth"));
        assert_eq!(refresh.http_only(), Some(true));

        let expired = builder.build_expired_access_cookie();
        assert_eq!(expired.path(), Some("/"));
        assert_eq!(
            expired.max_age(),
            Some(actix_web::cookie::time::Duration::ZERO)
        );
    }
}
