//! 付款/捐赠记录

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, EntityTrait, FromQueryResult,
    QueryFilter, QueryOrder, QuerySelect,
};
use tracing::info;

use super::converters::model_to_payment;
use super::SeaOrmStorage;
use crate::errors::Result;
use crate::storage::models::{
    NewPayment, Payment, PaymentFilter, PaymentStatus, PaymentSummary, PaymentUpdate,
};
use migration::entities::payment;

#[derive(Debug, FromQueryResult)]
struct StatusTotalRow {
    status: String,
    total: Option<f64>,
    count: i64,
}

/// 把按状态分组的 SUM/COUNT 折叠成汇总，cancelled 不计入
fn fold_summary(rows: Vec<StatusTotalRow>) -> PaymentSummary {
    let mut summary = PaymentSummary::default();

    for row in rows {
        let total = row.total.unwrap_or(0.0);
        let count = row.count.max(0) as u64;
        match row.status.parse::<PaymentStatus>() {
            Ok(PaymentStatus::Completed) => {
                summary.total_completed += total;
                summary.completed_count += count;
            }
            Ok(PaymentStatus::Pending) => {
                summary.total_pending += total;
                summary.pending_count += count;
            }
            _ => {}
        }
    }

    summary.total_amount = summary.total_completed + summary.total_pending;
    summary.total_count = summary.completed_count + summary.pending_count;
    summary
}

impl SeaOrmStorage {
    pub async fn create_payment(&self, new: NewPayment) -> Result<Payment> {
        let now = Utc::now();
        let model = payment::ActiveModel {
            payment_recorder_id: Set(new.payment_recorder_id),
            amount: Set(new.amount),
            date: Set(new.date),
            description: Set(new.description),
            status: Set(new.status.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let created = self.write("create_payment", || async {
            model.clone().insert(&self.analytics_db).await
        })
        .await?;

        info!(
            "Payment {} recorded: {:.2} ({})",
            created.id, created.amount, created.status
        );
        Ok(model_to_payment(created))
    }

    pub async fn get_payment(&self, id: i64) -> Result<Option<Payment>> {
        Ok(payment::Entity::find_by_id(id)
            .one(&self.analytics_db)
            .await?
            .map(model_to_payment))
    }

    /// 日期范围为闭区间，按 `date desc, id desc` 排序
    pub async fn list_payments(&self, filter: &PaymentFilter) -> Result<Vec<Payment>> {
        let mut condition = Condition::all();

        if let Some(start) = filter.start_date {
            condition = condition.add(payment::Column::Date.gte(start));
        }
        if let Some(end) = filter.end_date {
            condition = condition.add(payment::Column::Date.lte(end));
        }
        if let Some(status) = filter.status {
            condition = condition.add(payment::Column::Status.eq(status.as_ref()));
        }
        if let Some(ref recorder) = filter.recorder_id {
            condition = condition.add(payment::Column::PaymentRecorderId.eq(recorder.as_str()));
        }

        let models = payment::Entity::find()
            .filter(condition)
            .order_by_desc(payment::Column::Date)
            .order_by_desc(payment::Column::Id)
            .all(&self.analytics_db)
            .await?;

        Ok(models.into_iter().map(model_to_payment).collect())
    }

    pub async fn update_payment(&self, id: i64, update: PaymentUpdate) -> Result<Option<Payment>> {
        let Some(existing) = payment::Entity::find_by_id(id)
            .one(&self.analytics_db)
            .await?
        else {
            return Ok(None);
        };

        let mut active: payment::ActiveModel = existing.into();
        if let Some(recorder) = update.payment_recorder_id {
            active.payment_recorder_id = Set(recorder);
        }
        if let Some(amount) = update.amount {
            active.amount = Set(amount);
        }
        if let Some(date) = update.date {
            active.date = Set(date);
        }
        if let Some(description) = update.description {
            active.description = Set(description);
        }
        if let Some(status) = update.status {
            active.status = Set(status.to_string());
        }
        active.updated_at = Set(Utc::now());

        let updated = self.write("update_payment", || async {
            active.clone().update(&self.analytics_db).await
        })
        .await?;

        Ok(Some(model_to_payment(updated)))
    }

    /// 硬删除，返回是否删除了记录
    pub async fn delete_payment(&self, id: i64) -> Result<bool> {
        let result = self.write("delete_payment", || async {
            payment::Entity::delete_by_id(id).exec(&self.analytics_db).await
        })
        .await?;

        if result.rows_affected > 0 {
            info!("Payment deleted: {}", id);
        }
        Ok(result.rows_affected > 0)
    }

    /// `SUM(amount)` / `COUNT(*)` 按状态分组
    pub async fn payment_summary(&self) -> Result<PaymentSummary> {
        let rows = payment::Entity::find()
            .select_only()
            .column(payment::Column::Status)
            .column_as(payment::Column::Amount.sum(), "total")
            .column_as(payment::Column::Id.count(), "count")
            .group_by(payment::Column::Status)
            .into_model::<StatusTotalRow>()
            .all(&self.analytics_db)
            .await?;

        Ok(fold_summary(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str, total: f64, count: i64) -> StatusTotalRow {
        StatusTotalRow {
            status: status.to_string(),
            total: Some(total),
            count,
        }
    }

    #[test]
    fn test_fold_summary_excludes_cancelled() {
        let summary = fold_summary(vec![
            row("completed", 150.0, 2),
            row("pending", 25.5, 1),
            row("cancelled", 999.0, 4),
        ]);

        assert_eq!(summary.total_completed, 150.0);
        assert_eq!(summary.total_pending, 25.5);
        assert_eq!(summary.total_amount, 175.5);
        assert_eq!(summary.total_count, 3);
        assert_eq!(summary.completed_count, 2);
        assert_eq!(summary.pending_count, 1);
    }

    #[test]
    fn test_fold_summary_empty() {
        let summary = fold_summary(Vec::new());
        assert_eq!(summary, PaymentSummary::default());
    }

    #[test]
    fn test_fold_summary_null_sum() {
        let summary = fold_summary(vec![StatusTotalRow {
            status: "pending".to_string(),
            total: None,
            count: 0,
        }]);
        assert_eq!(summary.total_amount, 0.0);
    }
}
