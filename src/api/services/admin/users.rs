//! Admin API 用户管理

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, Result as ActixResult, web};
use std::sync::Arc;
use tracing::info;

use crate::api::middleware::CurrentUser;
use crate::errors::{LinkhubError, Result};
use crate::services::{CreateUserRequest, UpdateUserRequest, UserService};
use crate::storage::{UserFilter, UserRole, UserStatus};

use super::error_code::ErrorCode;
use super::helpers::{
    created_response, error_from_linkhub, error_response, paginated_response, resource_result,
    success_response,
};
use super::types::{GetUsersQuery, MessageResponse, PaginationInfo, PostNewUser, UpdateUserBody};
use crate::api::constants::DEFAULT_PAGE_SIZE;

fn parse_role(value: &str) -> Result<UserRole> {
    value.trim().parse().map_err(|_| {
        LinkhubError::validation(format!("Invalid role '{}', expected admin or user", value))
    })
}

fn parse_status(value: &str) -> Result<UserStatus> {
    value.trim().parse().map_err(|_| {
        LinkhubError::validation(format!(
            "Invalid status '{}', expected active or inactive",
            value
        ))
    })
}

fn optional<T>(value: Option<&str>, parse: fn(&str) -> Result<T>) -> Result<Option<T>> {
    match crate::utils::non_empty(value) {
        Some(v) => parse(&v).map(Some),
        None => Ok(None),
    }
}

fn self_protection(message: &str) -> HttpResponse {
    error_response(
        StatusCode::BAD_REQUEST,
        ErrorCode::UserSelfProtection,
        message,
    )
}

fn user_result<T: serde::Serialize>(result: Result<T>) -> HttpResponse {
    match result {
        Err(ref e @ LinkhubError::Conflict(_)) => {
            error_response(StatusCode::CONFLICT, ErrorCode::UserEmailExists, e.message())
        }
        other => resource_result(other, ErrorCode::UserNotFound),
    }
}

/// GET /users
pub async fn list_users(
    query: web::Query<GetUsersQuery>,
    users: web::Data<Arc<UserService>>,
) -> ActixResult<impl Responder> {
    let filter = match (
        optional(query.role.as_deref(), parse_role),
        optional(query.status.as_deref(), parse_status),
    ) {
        (Ok(role), Ok(status)) => UserFilter {
            search: query.search.clone(),
            role,
            status,
        },
        (Err(e), _) | (_, Err(e)) => return Ok(error_from_linkhub(&e)),
    };

    let page = query.page.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);

    match users.list_users(filter, page, page_size).await {
        Ok((items, total)) => Ok(paginated_response(
            items,
            PaginationInfo::new(page, page_size, total),
        )),
        Err(e) => Ok(error_from_linkhub(&e)),
    }
}

/// POST /users
pub async fn create_user(
    body: web::Json<PostNewUser>,
    users: web::Data<Arc<UserService>>,
) -> ActixResult<impl Responder> {
    let body = body.into_inner();
    let role = match optional(body.role.as_deref(), parse_role) {
        Ok(role) => role.unwrap_or_default(),
        Err(e) => return Ok(error_from_linkhub(&e)),
    };
    let status = match optional(body.status.as_deref(), parse_status) {
        Ok(status) => status.unwrap_or_default(),
        Err(e) => return Ok(error_from_linkhub(&e)),
    };

    let result = users
        .create_user(CreateUserRequest {
            name: body.name,
            email: body.email,
            password: body.password,
            role,
            status,
        })
        .await;

    Ok(match result {
        Ok(user) => {
            info!("Admin API: user {} created ({})", user.id, user.email);
            created_response(user)
        }
        Err(e) => user_result::<()>(Err(e)),
    })
}

/// GET /users/{id}
pub async fn get_user(
    path: web::Path<i64>,
    users: web::Data<Arc<UserService>>,
) -> ActixResult<impl Responder> {
    Ok(user_result(users.get_user(path.into_inner()).await))
}

/// PUT /users/{id}
pub async fn update_user(
    path: web::Path<i64>,
    body: web::Json<UpdateUserBody>,
    current: web::ReqData<CurrentUser>,
    users: web::Data<Arc<UserService>>,
) -> ActixResult<impl Responder> {
    let id = path.into_inner();
    let body = body.into_inner();

    let role = match optional(body.role.as_deref(), parse_role) {
        Ok(role) => role,
        Err(e) => return Ok(error_from_linkhub(&e)),
    };
    let status = match optional(body.status.as_deref(), parse_status) {
        Ok(status) => status,
        Err(e) => return Ok(error_from_linkhub(&e)),
    };

    if id == current.0.id {
        if role.is_some_and(|r| r != UserRole::Admin) {
            return Ok(self_protection("You cannot remove your own admin role"));
        }
        if status == Some(UserStatus::Inactive) {
            return Ok(self_protection("You cannot deactivate your own account"));
        }
    }

    let result = users
        .update_user(
            id,
            UpdateUserRequest {
                name: body.name,
                email: body.email,
                password: body.password,
                role,
                status,
            },
        )
        .await;

    Ok(user_result(result))
}

/// DELETE /users/{id}
pub async fn delete_user(
    path: web::Path<i64>,
    current: web::ReqData<CurrentUser>,
    users: web::Data<Arc<UserService>>,
) -> ActixResult<impl Responder> {
    let id = path.into_inner();
    if id == current.0.id {
        return Ok(self_protection("You cannot delete your own account"));
    }

    Ok(match users.delete_user(id).await {
        Ok(()) => {
            info!("Admin API: user {} deleted by {}", id, current.0.id);
            success_response(MessageResponse {
                message: format!("User {} deleted", id),
            })
        }
        Err(e) => user_result::<()>(Err(e)),
    })
}

/// POST /users/{id}/activate
pub async fn activate_user(
    path: web::Path<i64>,
    users: web::Data<Arc<UserService>>,
) -> ActixResult<impl Responder> {
    Ok(user_result(users.activate_user(path.into_inner()).await))
}

/// POST /users/{id}/deactivate
pub async fn deactivate_user(
    path: web::Path<i64>,
    current: web::ReqData<CurrentUser>,
    users: web::Data<Arc<UserService>>,
) -> ActixResult<impl Responder> {
    let id = path.into_inner();
    if id == current.0.id {
        return Ok(self_protection("You cannot deactivate your own account"));
    }
    Ok(user_result(users.deactivate_user(id).await))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_enum_parsing() {
        assert_eq!(optional(None, parse_role).unwrap(), None);
        assert_eq!(optional(Some("  "), parse_role).unwrap(), None);
        assert_eq!(
            optional(Some("ADMIN"), parse_role).unwrap(),
            Some(UserRole::Admin)
        );
        assert!(optional(Some("owner"), parse_role).is_err());
        assert_eq!(
            optional(Some("inactive"), parse_status).unwrap(),
            Some(UserStatus::Inactive)
        );
    }
}
