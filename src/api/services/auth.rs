//! 会话端点 `/api/auth`
//!
//! - POST /login：邮箱 + 密码登录（按客户端 IP 限流）
//! - POST /refresh：用 refresh cookie 换新的 access cookie
//! - POST /logout：清除 cookies
//! - GET /me：当前用户

use actix_governor::{Governor, GovernorConfigBuilder, KeyExtractor, SimpleKeyExtractionError};
use actix_web::dev::ServiceRequest;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, Result as ActixResult, web};
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::api::constants;
use crate::api::jwt::get_jwt_service;
use crate::api::middleware::authenticate;
use crate::config::get_config;
use crate::errors::LinkhubError;
use crate::services::UserService;
use crate::storage::User;
use crate::utils::ip::{forwarded_ip_from_headers, resolve_client_ip};

use super::admin::{
    AuthSuccessResponse, CookieBuilder, ErrorCode, LoginCredentials, MessageResponse,
    error_from_linkhub, error_response, json_response, success_response,
};

/// 基于客户端 IP 的限流 key 提取器
///
/// 默认使用连接 IP；连接来自可信代理（或未配置时的私有地址）才采用转发头。
#[derive(Clone, Copy)]
pub struct LoginKeyExtractor;

impl KeyExtractor for LoginKeyExtractor {
    type Key = String;
    type KeyExtractionError = SimpleKeyExtractionError<&'static str>;

    fn extract(&self, req: &ServiceRequest) -> Result<Self::Key, Self::KeyExtractionError> {
        let config = get_config();
        let conn_info = req.connection_info();
        let key = resolve_client_ip(
            conn_info.peer_addr(),
            forwarded_ip_from_headers(req.headers()),
            &config.auth.trusted_proxies,
        );
        debug!("Login rate limit key: {}", key);
        Ok(key)
    }
}

/// 创建登录限流器
///
/// 配置：每秒补充 1 个令牌，突发最多 5 次请求
/// 超限返回 HTTP 429 Too Many Requests
pub fn login_rate_limiter() -> Governor<LoginKeyExtractor, NoOpMiddleware> {
    let config = GovernorConfigBuilder::default()
        .seconds_per_request(1)
        .burst_size(5)
        .key_extractor(LoginKeyExtractor)
        .finish()
        .expect("constant rate limit config is valid");

    debug!("Login rate limiter created: 1 req/s, burst 5");
    Governor::new(&config)
}

/// 为用户签发 access + refresh token 并写入 cookies
fn session_response(user: User, message: &str) -> HttpResponse {
    let jwt_service = get_jwt_service();
    let tokens = jwt_service
        .generate_access_token(&user)
        .and_then(|access| Ok((access, jwt_service.generate_refresh_token(&user)?)));

    let (access_token, refresh_token) = match tokens {
        Ok(tokens) => tokens,
        Err(e) => {
            error!("Failed to generate session tokens: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalServerError,
                "Failed to generate token",
            );
        }
    };

    let cookie_builder = CookieBuilder::from_config();
    let mut response = json_response(
        StatusCode::OK,
        ErrorCode::Success,
        message,
        Some(AuthSuccessResponse {
            user,
            expires_in: cookie_builder.access_token_minutes() * 60,
        }),
    );

    for cookie in [
        cookie_builder.build_access_cookie(access_token),
        cookie_builder.build_refresh_cookie(refresh_token),
    ] {
        if let Err(e) = response.add_cookie(&cookie) {
            error!("Failed to set session cookie: {}", e);
        }
    }
    response
}

/// POST /api/auth/login
pub async fn login(
    body: web::Json<LoginCredentials>,
    users: web::Data<Arc<UserService>>,
) -> ActixResult<impl Responder> {
    match users.login(&body.email, &body.password).await {
        Ok(user) => {
            info!("Login successful for user {} ({})", user.id, user.email);
            Ok(session_response(user, "Login successful"))
        }
        Err(LinkhubError::Unauthorized(message)) => Ok(error_response(
            StatusCode::UNAUTHORIZED,
            ErrorCode::AuthFailed,
            &message,
        )),
        Err(e) => Ok(error_from_linkhub(&e)),
    }
}

/// POST /api/auth/refresh
pub async fn refresh_token(
    req: HttpRequest,
    users: web::Data<Arc<UserService>>,
) -> ActixResult<impl Responder> {
    let Some(token) = req
        .cookie(constants::REFRESH_COOKIE_NAME)
        .map(|c| c.value().to_string())
    else {
        warn!("Refresh token not found in cookie");
        return Ok(error_response(
            StatusCode::UNAUTHORIZED,
            ErrorCode::TokenInvalid,
            "Refresh token not found",
        ));
    };

    let claims = match get_jwt_service().validate_refresh_token(&token) {
        Ok(claims) => claims,
        Err(e) => {
            warn!("Invalid refresh token: {}", e);
            return Ok(error_response(
                StatusCode::UNAUTHORIZED,
                ErrorCode::TokenInvalid,
                "Invalid refresh token",
            ));
        }
    };

    let user = match claims.user_id() {
        Some(id) => users.get_user(id).await.ok(),
        None => None,
    };

    match user {
        Some(user) if user.is_active() => {
            info!("Token refresh successful for user {}", user.id);
            Ok(session_response(user, "Token refreshed"))
        }
        Some(_) => Ok(error_response(
            StatusCode::UNAUTHORIZED,
            ErrorCode::AccountInactive,
            "Account is inactive",
        )),
        None => Ok(error_response(
            StatusCode::UNAUTHORIZED,
            ErrorCode::TokenInvalid,
            "User no longer exists",
        )),
    }
}

/// POST /api/auth/logout
pub async fn logout() -> ActixResult<impl Responder> {
    info!("Logout");

    let cookie_builder = CookieBuilder::from_config();
    Ok(HttpResponse::Ok()
        .cookie(cookie_builder.build_expired_access_cookie())
        .cookie(cookie_builder.build_expired_refresh_cookie())
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(super::admin::ApiResponse {
            code: ErrorCode::Success as i32,
            message: "OK".to_string(),
            data: Some(MessageResponse {
                message: "Logout successful".to_string(),
            }),
        }))
}

/// GET /api/auth/me
pub async fn me(req: HttpRequest, users: web::Data<Arc<UserService>>) -> ActixResult<impl Responder> {
    Ok(match authenticate(&req, &users).await {
        Ok(user) => success_response(user),
        Err(LinkhubError::Unauthorized(message)) => {
            error_response(StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized, &message)
        }
        Err(e) => error_from_linkhub(&e),
    })
}

/// 会话路由 `/auth`
pub fn auth_routes() -> actix_web::Scope {
    web::scope("/auth")
        .route("/login", web::post().to(login).wrap(login_rate_limiter()))
        .route("/refresh", web::post().to(refresh_token))
        .route("/logout", web::post().to(logout))
        .route("/me", web::get().to(me))
}
