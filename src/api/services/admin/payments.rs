//! Admin API 付款记录

use actix_web::{Responder, Result as ActixResult, web};
use std::sync::Arc;
use tracing::info;

use crate::errors::Result;
use crate::services::{
    CreatePaymentRequest, PaymentService, UpdatePaymentRequest, parse_payment_status,
};
use crate::storage::PaymentFilter;
use crate::utils::{non_empty, parse_date};

use super::error_code::ErrorCode;
use super::helpers::{created_response, error_from_linkhub, resource_result};
use super::types::{GetPaymentsQuery, MessageResponse, PostNewPayment, UpdatePaymentBody};

fn build_filter(query: &GetPaymentsQuery) -> Result<PaymentFilter> {
    Ok(PaymentFilter {
        start_date: non_empty(query.start_date.as_deref())
            .map(|s| parse_date(&s))
            .transpose()?,
        end_date: non_empty(query.end_date.as_deref())
            .map(|s| parse_date(&s))
            .transpose()?,
        status: non_empty(query.status.as_deref())
            .map(|s| parse_payment_status(&s))
            .transpose()?,
        recorder_id: non_empty(query.recorder_id.as_deref()),
    })
}

/// GET /payments
pub async fn list_payments(
    query: web::Query<GetPaymentsQuery>,
    payments: web::Data<Arc<PaymentService>>,
) -> ActixResult<impl Responder> {
    let filter = match build_filter(&query) {
        Ok(filter) => filter,
        Err(e) => return Ok(error_from_linkhub(&e)),
    };
    Ok(resource_result(
        payments.list(filter).await,
        ErrorCode::PaymentNotFound,
    ))
}

/// GET /payments/summary
pub async fn payment_summary(
    payments: web::Data<Arc<PaymentService>>,
) -> ActixResult<impl Responder> {
    Ok(resource_result(
        payments.summary().await,
        ErrorCode::PaymentNotFound,
    ))
}

/// POST /payments
pub async fn create_payment(
    body: web::Json<PostNewPayment>,
    payments: web::Data<Arc<PaymentService>>,
) -> ActixResult<impl Responder> {
    let body = body.into_inner();
    let result = payments
        .create(CreatePaymentRequest {
            payment_recorder_id: body.payment_recorder_id,
            amount: body.amount,
            date: body.date,
            description: body.description,
            status: body.status,
        })
        .await;

    Ok(match result {
        Ok(payment) => {
            info!("Admin API: payment {} created", payment.id);
            created_response(payment)
        }
        Err(e) => error_from_linkhub(&e),
    })
}

/// GET /payments/{id}
pub async fn get_payment(
    path: web::Path<i64>,
    payments: web::Data<Arc<PaymentService>>,
) -> ActixResult<impl Responder> {
    Ok(resource_result(
        payments.get(path.into_inner()).await,
        ErrorCode::PaymentNotFound,
    ))
}

/// PUT /payments/{id}
pub async fn update_payment(
    path: web::Path<i64>,
    body: web::Json<UpdatePaymentBody>,
    payments: web::Data<Arc<PaymentService>>,
) -> ActixResult<impl Responder> {
    let body = body.into_inner();
    let result = payments
        .update(
            path.into_inner(),
            UpdatePaymentRequest {
                payment_recorder_id: body.payment_recorder_id,
                amount: body.amount,
                date: body.date,
                description: body.description,
                status: body.status,
            },
        )
        .await;
    Ok(resource_result(result, ErrorCode::PaymentNotFound))
}

/// DELETE /payments/{id}
pub async fn delete_payment(
    path: web::Path<i64>,
    payments: web::Data<Arc<PaymentService>>,
) -> ActixResult<impl Responder> {
    let id = path.into_inner();
    let result = payments.delete(id).await.map(|()| MessageResponse {
        message: format!("Payment {} deleted", id),
    });
    Ok(resource_result(result, ErrorCode::PaymentNotFound))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::PaymentStatus;

    #[test]
    fn test_build_filter() {
        let query = GetPaymentsQuery {
            start_date: Some("2024-01-01".to_string()),
            end_date: Some(String::new()),
            status: Some("Completed".to_string()),
            recorder_id: Some("  ".to_string()),
        };
        let filter = build_filter(&query).unwrap();
        assert!(filter.start_date.is_some());
        assert!(filter.end_date.is_none());
        assert_eq!(filter.status, Some(PaymentStatus::Completed));
        assert!(filter.recorder_id.is_none());
    }

    #[test]
    fn test_build_filter_rejects_bad_date() {
        let query = GetPaymentsQuery {
            start_date: Some("01/02/2024".to_string()),
            ..Default::default()
        };
        assert_eq!(build_filter(&query).unwrap_err().code(), "E012");
    }
}
