//! Payment / donation ledger service

use std::sync::Arc;

use crate::errors::{LinkhubError, Result};
use crate::storage::{
    NewPayment, Payment, PaymentFilter, PaymentStatus, PaymentSummary, PaymentUpdate,
    SeaOrmStorage,
};
use crate::utils::parse_date;

#[derive(Debug, Clone, Default)]
pub struct CreatePaymentRequest {
    pub payment_recorder_id: String,
    pub amount: f64,
    /// `YYYY-MM-DD`
    pub date: String,
    pub description: String,
    /// `pending` (default), `completed` or `cancelled`
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdatePaymentRequest {
    pub payment_recorder_id: Option<String>,
    pub amount: Option<f64>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

pub fn parse_payment_status(value: &str) -> Result<PaymentStatus> {
    value.trim().parse().map_err(|_| {
        LinkhubError::validation(format!(
            "Invalid status '{}', expected pending, completed or cancelled",
            value
        ))
    })
}

pub fn validate_amount(amount: f64) -> Result<f64> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(LinkhubError::validation(
            "Amount must be a positive number",
        ));
    }
    Ok(amount)
}

fn required(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(LinkhubError::validation(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

pub struct PaymentService {
    storage: Arc<SeaOrmStorage>,
}

impl PaymentService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    fn not_found(id: i64) -> LinkhubError {
        LinkhubError::not_found(format!("Payment {} not found", id))
    }

    pub async fn create(&self, req: CreatePaymentRequest) -> Result<Payment> {
        let new = NewPayment {
            payment_recorder_id: required("payment_recorder_id", &req.payment_recorder_id)?,
            amount: validate_amount(req.amount)?,
            date: parse_date(&req.date)?,
            description: required("description", &req.description)?,
            status: match req.status.as_deref() {
                Some(s) if !s.trim().is_empty() => parse_payment_status(s)?,
                _ => PaymentStatus::default(),
            },
        };
        self.storage.create_payment(new).await
    }

    pub async fn get(&self, id: i64) -> Result<Payment> {
        self.storage
            .get_payment(id)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    pub async fn list(&self, filter: PaymentFilter) -> Result<Vec<Payment>> {
        if let (Some(start), Some(end)) = (filter.start_date, filter.end_date)
            && start > end
        {
            return Err(LinkhubError::validation(
                "start_date must not be after end_date",
            ));
        }
        self.storage.list_payments(&filter).await
    }

    pub async fn update(&self, id: i64, req: UpdatePaymentRequest) -> Result<Payment> {
        let update = PaymentUpdate {
            payment_recorder_id: req
                .payment_recorder_id
                .as_deref()
                .map(|v| required("payment_recorder_id", v))
                .transpose()?,
            amount: req.amount.map(validate_amount).transpose()?,
            date: req.date.as_deref().map(parse_date).transpose()?,
            description: req
                .description
                .as_deref()
                .map(|v| required("description", v))
                .transpose()?,
            status: req.status.as_deref().map(parse_payment_status).transpose()?,
        };

        self.storage
            .update_payment(id, update)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        if !self.storage.delete_payment(id).await? {
            return Err(Self::not_found(id));
        }
        Ok(())
    }

    pub async fn summary(&self) -> Result<PaymentSummary> {
        self.storage.payment_summary().await
    }
}
