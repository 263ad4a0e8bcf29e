//! 灵修内容（软删除）

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use tracing::info;

use super::converters::model_to_devotional;
use super::SeaOrmStorage;
use crate::errors::Result;
use crate::storage::models::{
    Devotional, DevotionalFilter, DevotionalStatus, DevotionalUpdate, NewDevotional,
};
use migration::entities::devotional;

impl SeaOrmStorage {
    pub async fn create_devotional(&self, new: NewDevotional) -> Result<Devotional> {
        let now = Utc::now();
        let model = devotional::ActiveModel {
            title: Set(new.title),
            content: Set(new.content),
            devotional_date: Set(new.devotional_date),
            status: Set(new.status.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        };

        let created = self.write("create_devotional", || async {
            model.clone().insert(&self.analytics_db).await
        })
        .await?;

        info!("Devotional created: {}", created.id);
        Ok(model_to_devotional(created))
    }

    /// 按 id 获取（包括已软删除的记录）
    pub async fn get_devotional(&self, id: i64) -> Result<Option<Devotional>> {
        Ok(devotional::Entity::find_by_id(id)
            .one(&self.analytics_db)
            .await?
            .map(model_to_devotional))
    }

    /// 按 `devotional_date desc, id desc` 排序
    pub async fn list_devotionals(&self, filter: &DevotionalFilter) -> Result<Vec<Devotional>> {
        let mut condition = Condition::all();

        if !filter.include_deleted {
            condition = condition.add(devotional::Column::DeletedAt.is_null());
        }
        if let Some(status) = filter.status {
            condition = condition.add(devotional::Column::Status.eq(status.as_ref()));
        }
        if let Some(ref search) = filter.search {
            condition = condition.add(
                Condition::any()
                    .add(devotional::Column::Title.contains(search))
                    .add(devotional::Column::Content.contains(search)),
            );
        }

        let models = devotional::Entity::find()
            .filter(condition)
            .order_by_desc(devotional::Column::DevotionalDate)
            .order_by_desc(devotional::Column::Id)
            .all(&self.analytics_db)
            .await?;

        Ok(models.into_iter().map(model_to_devotional).collect())
    }

    /// 公开列表：已发布、未删除、日期不晚于 `today`
    pub async fn published_devotionals(
        &self,
        today: NaiveDate,
        limit: u64,
    ) -> Result<Vec<Devotional>> {
        let models = devotional::Entity::find()
            .filter(devotional::Column::Status.eq(DevotionalStatus::Published.as_ref()))
            .filter(devotional::Column::DeletedAt.is_null())
            .filter(devotional::Column::DevotionalDate.lte(today))
            .order_by_desc(devotional::Column::DevotionalDate)
            .order_by_desc(devotional::Column::Id)
            .limit(limit)
            .all(&self.analytics_db)
            .await?;

        Ok(models.into_iter().map(model_to_devotional).collect())
    }

    pub async fn update_devotional(
        &self,
        id: i64,
        update: DevotionalUpdate,
    ) -> Result<Option<Devotional>> {
        let Some(existing) = devotional::Entity::find_by_id(id)
            .one(&self.analytics_db)
            .await?
        else {
            return Ok(None);
        };

        let mut active: devotional::ActiveModel = existing.into();
        if let Some(title) = update.title {
            active.title = Set(title);
        }
        if let Some(content) = update.content {
            active.content = Set(content);
        }
        if let Some(date) = update.devotional_date {
            active.devotional_date = Set(date);
        }
        if let Some(status) = update.status {
            active.status = Set(status.to_string());
        }
        active.updated_at = Set(Utc::now());

        let updated = self.write("update_devotional", || async {
            active.clone().update(&self.analytics_db).await
        })
        .await?;

        Ok(Some(model_to_devotional(updated)))
    }

    /// 设置 `deleted_at`，记录不存在或已删除时返回 false
    pub async fn soft_delete_devotional(&self, id: i64) -> Result<bool> {
        self.set_devotional_deleted(id, true).await
    }

    /// 清除 `deleted_at`，记录不存在或未删除时返回 false
    pub async fn restore_devotional(&self, id: i64) -> Result<bool> {
        self.set_devotional_deleted(id, false).await
    }

    async fn set_devotional_deleted(&self, id: i64, deleted: bool) -> Result<bool> {
        let now = Utc::now();
        let (op_name, deleted_at, guard) = if deleted {
            (
                "soft_delete_devotional",
                Some(now),
                devotional::Column::DeletedAt.is_null(),
            )
        } else {
            (
                "restore_devotional",
                None,
                devotional::Column::DeletedAt.is_not_null(),
            )
        };

        let result = self.write(op_name, || async {
            devotional::Entity::update_many()
                .col_expr(
                    devotional::Column::DeletedAt,
                    sea_orm::sea_query::Expr::value(deleted_at),
                )
                .col_expr(
                    devotional::Column::UpdatedAt,
                    sea_orm::sea_query::Expr::value(now),
                )
                .filter(devotional::Column::Id.eq(id))
                .filter(guard.clone())
                .exec(&self.analytics_db)
                .await
        })
        .await?;

        if result.rows_affected > 0 {
            info!("Devotional {}: {}", id, op_name);
        }
        Ok(result.rows_affected > 0)
    }
}
