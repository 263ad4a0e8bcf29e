use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpRequest, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::{Method, StatusCode, header::CONTENT_TYPE},
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, info, trace};

use crate::api::constants;
use crate::api::jwt::get_jwt_service;
use crate::api::services::admin::{ErrorCode, error_response};
use crate::errors::{LinkhubError, Result};
use crate::services::UserService;
use crate::storage::User;

/// 认证通过后写入 request extensions 的当前用户
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// 从 Authorization header 提取 Bearer token
fn extract_bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// 解析请求携带的会话并加载用户
///
/// 先尝试 Bearer Token，再尝试 access cookie。token 有效但用户已被删除
/// 或停用时同样返回 Unauthorized。
pub async fn authenticate(req: &HttpRequest, users: &UserService) -> Result<User> {
    let jwt_service = get_jwt_service();

    let bearer = extract_bearer_token(req).and_then(|token| {
        jwt_service
            .validate_access_token(&token)
            .inspect_err(|e| info!("Bearer token validation failed: {}", e))
            .ok()
    });

    let claims = match bearer {
        Some(claims) => {
            trace!("Authenticated via Bearer token");
            claims
        }
        None => {
            let token = req
                .cookie(constants::ACCESS_COOKIE_NAME)
                .map(|c| c.value().to_string())
                .ok_or_else(|| LinkhubError::unauthorized("Unauthorized: missing token"))?;
            jwt_service.validate_access_token(&token).map_err(|e| {
                info!("JWT cookie validation failed: {}", e);
                LinkhubError::unauthorized("Unauthorized: invalid or expired token")
            })?
        }
    };

    let user_id = claims
        .user_id()
        .ok_or_else(|| LinkhubError::unauthorized("Unauthorized: invalid token subject"))?;

    let user = match users.get_user(user_id).await {
        Ok(user) => user,
        Err(LinkhubError::NotFound(_)) => {
            return Err(LinkhubError::unauthorized("Unauthorized: user no longer exists"));
        }
        Err(e) => return Err(e),
    };

    if !user.is_active() {
        return Err(LinkhubError::unauthorized("Unauthorized: account is inactive"));
    }

    Ok(user)
}

/// Admin role gate
///
/// 每个请求都重新加载用户：无有效会话 401，非 admin 角色 403。
#[derive(Clone)]
pub struct AdminAuth;

impl<S, B> Transform<S, ServiceRequest> for AdminAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AdminAuthMiddleware<S>;
    type Future = Ready<std::result::Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct AdminAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> AdminAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    /// Handle OPTIONS requests for CORS preflight
    fn handle_options_request(req: ServiceRequest) -> ServiceResponse<EitherBody<B>> {
        req.into_response(
            HttpResponse::NoContent()
                .insert_header((CONTENT_TYPE, "text/plain; charset=utf-8"))
                .finish()
                .map_into_right_body(),
        )
    }

    fn reject(
        req: ServiceRequest,
        status: StatusCode,
        code: ErrorCode,
        message: &str,
    ) -> ServiceResponse<EitherBody<B>> {
        req.into_response(error_response(status, code, message).map_into_right_body())
    }
}

impl<S, B> Service<ServiceRequest> for AdminAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();

        Box::pin(async move {
            if req.method() == Method::OPTIONS {
                return Ok(Self::handle_options_request(req));
            }

            let Some(users) = req.app_data::<web::Data<Arc<UserService>>>().cloned() else {
                tracing::error!("UserService is not registered as app data");
                return Ok(Self::reject(
                    req,
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::InternalServerError,
                    "Authentication unavailable",
                ));
            };

            let user = match authenticate(req.request(), &users).await {
                Ok(user) => user,
                Err(LinkhubError::Unauthorized(message)) => {
                    debug!("Admin authentication failed: {}", message);
                    return Ok(Self::reject(
                        req,
                        StatusCode::UNAUTHORIZED,
                        ErrorCode::Unauthorized,
                        &message,
                    ));
                }
                Err(e) => {
                    tracing::error!("Admin authentication error: {}", e);
                    return Ok(Self::reject(
                        req,
                        e.http_status(),
                        ErrorCode::from(&e),
                        e.message(),
                    ));
                }
            };

            if !user.is_admin() {
                info!(
                    "Forbidden: user {} ({}) is not an admin",
                    user.id, user.email
                );
                return Ok(Self::reject(
                    req,
                    StatusCode::FORBIDDEN,
                    ErrorCode::AdminRequired,
                    "Forbidden: admin role required",
                ));
            }

            trace!("Admin authentication successful for user {}", user.id);
            req.extensions_mut().insert(CurrentUser(user));
            let response = srv.call(req).await?.map_into_left_body();
            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_extract_bearer_token() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer abc.def.ghi"))
            .to_http_request();
        assert_eq!(extract_bearer_token(&req), Some("abc.def.ghi".to_string()));

        let req = TestRequest::default()
            .insert_header(("Authorization", "Basic dXNlcg=="))
            .to_http_request();
        assert_eq!(extract_bearer_token(&req), None);

        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer "))
            .to_http_request();
        assert_eq!(extract_bearer_token(&req), None);
    }
}
