//! Admin API 灵修内容

use actix_web::{Responder, Result as ActixResult, web};
use std::sync::Arc;
use tracing::info;

use crate::services::{
    CreateDevotionalRequest, DevotionalService, UpdateDevotionalRequest, parse_devotional_status,
};
use crate::storage::DevotionalFilter;
use crate::utils::non_empty;

use super::error_code::ErrorCode;
use super::helpers::{created_response, error_from_linkhub, resource_result};
use super::types::{
    GetDevotionalsQuery, MessageResponse, PostNewDevotional, UpdateDevotionalBody,
};

/// GET /devotionals
pub async fn list_devotionals(
    query: web::Query<GetDevotionalsQuery>,
    devotionals: web::Data<Arc<DevotionalService>>,
) -> ActixResult<impl Responder> {
    let status = match non_empty(query.status.as_deref())
        .map(|s| parse_devotional_status(&s))
        .transpose()
    {
        Ok(status) => status,
        Err(e) => return Ok(error_from_linkhub(&e)),
    };

    let filter = DevotionalFilter {
        status,
        include_deleted: query.include_deleted.unwrap_or(false),
        search: query.search.clone(),
    };
    Ok(resource_result(
        devotionals.list(filter).await,
        ErrorCode::DevotionalNotFound,
    ))
}

/// POST /devotionals
pub async fn create_devotional(
    body: web::Json<PostNewDevotional>,
    devotionals: web::Data<Arc<DevotionalService>>,
) -> ActixResult<impl Responder> {
    let body = body.into_inner();
    let result = devotionals
        .create(CreateDevotionalRequest {
            title: body.title,
            content: body.content,
            devotional_date: body.devotional_date,
            status: body.status,
        })
        .await;

    Ok(match result {
        Ok(devotional) => {
            info!("Admin API: devotional {} created", devotional.id);
            created_response(devotional)
        }
        Err(e) => error_from_linkhub(&e),
    })
}

/// GET /devotionals/{id}
pub async fn get_devotional(
    path: web::Path<i64>,
    devotionals: web::Data<Arc<DevotionalService>>,
) -> ActixResult<impl Responder> {
    Ok(resource_result(
        devotionals.get(path.into_inner()).await,
        ErrorCode::DevotionalNotFound,
    ))
}

/// PUT /devotionals/{id}
pub async fn update_devotional(
    path: web::Path<i64>,
    body: web::Json<UpdateDevotionalBody>,
    devotionals: web::Data<Arc<DevotionalService>>,
) -> ActixResult<impl Responder> {
    let body = body.into_inner();
    let result = devotionals
        .update(
            path.into_inner(),
            UpdateDevotionalRequest {
                title: body.title,
                content: body.content,
                devotional_date: body.devotional_date,
                status: body.status,
            },
        )
        .await;
    Ok(resource_result(result, ErrorCode::DevotionalNotFound))
}

/// DELETE /devotionals/{id}（软删除）
pub async fn delete_devotional(
    path: web::Path<i64>,
    devotionals: web::Data<Arc<DevotionalService>>,
) -> ActixResult<impl Responder> {
    let id = path.into_inner();
    let result = devotionals.soft_delete(id).await.map(|()| MessageResponse {
        message: format!("Devotional {} deleted", id),
    });
    Ok(resource_result(result, ErrorCode::DevotionalNotFound))
}

/// POST /devotionals/{id}/restore
pub async fn restore_devotional(
    path: web::Path<i64>,
    devotionals: web::Data<Arc<DevotionalService>>,
) -> ActixResult<impl Responder> {
    Ok(resource_result(
        devotionals.restore(path.into_inner()).await,
        ErrorCode::DevotionalNotFound,
    ))
}
