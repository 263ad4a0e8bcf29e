//! 用户表操作（users 库）

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use tracing::{debug, info};

use super::converters::{model_to_credentials, model_to_user};
use super::SeaOrmStorage;
use crate::errors::Result;
use crate::storage::models::{NewUser, User, UserCredentials, UserFilter, UserStatus, UserUpdate};
use migration::entities::user;

fn user_condition(filter: &UserFilter) -> Condition {
    let mut condition = Condition::all();

    if let Some(ref search) = filter.search {
        condition = condition.add(
            Condition::any()
                .add(user::Column::Name.contains(search))
                .add(user::Column::Email.contains(search)),
        );
    }
    if let Some(role) = filter.role {
        condition = condition.add(user::Column::Role.eq(role.as_ref()));
    }
    if let Some(status) = filter.status {
        condition = condition.add(user::Column::Status.eq(status.as_ref()));
    }
    condition
}

impl SeaOrmStorage {
    pub async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let now = Utc::now();
        let model = user::ActiveModel {
            name: Set(new_user.name),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            role: Set(new_user.role.to_string()),
            status: Set(new_user.status.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let created = self.write("create_user", || async {
            model.clone().insert(&self.users_db).await
        })
        .await?;

        self.invalidate_count_cache();
        info!("User created: {} ({})", created.email, created.id);
        Ok(model_to_user(created))
    }

    pub async fn get_user(&self, id: i64) -> Result<Option<User>> {
        Ok(user::Entity::find_by_id(id)
            .one(&self.users_db)
            .await?
            .map(model_to_user))
    }

    /// 按邮箱查找（含密码哈希，邮箱不区分大小写）
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserCredentials>> {
        Ok(user::Entity::find()
            .filter(user::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.users_db)
            .await?
            .map(model_to_credentials))
    }

    /// 分页列出用户，`created_at` 降序
    pub async fn list_users(
        &self,
        filter: &UserFilter,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<User>, u64)> {
        let condition = user_condition(filter);

        let cache_key = format!(
            "users:s={:?}:r={:?}:st={:?}",
            filter.search, filter.role, filter.status
        );
        let total = match self.count_cache.get(&cache_key) {
            Some(cached) => {
                debug!("count cache hit: key={}, value={}", cache_key, cached);
                cached
            }
            None => {
                let count = user::Entity::find()
                    .filter(condition.clone())
                    .count(&self.users_db)
                    .await?;
                self.count_cache.insert(cache_key, count);
                count
            }
        };

        let models = user::Entity::find()
            .filter(condition)
            .order_by_desc(user::Column::CreatedAt)
            .order_by_desc(user::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&self.users_db)
            .await?;

        Ok((models.into_iter().map(model_to_user).collect(), total))
    }

    /// 部分更新：只修改提供的字段，返回更新后的用户（不存在时 None）
    ///
    /// 没有任何字段时不写库，`updated_at` 保持不变。
    pub async fn update_user(&self, id: i64, update: UserUpdate) -> Result<Option<User>> {
        let Some(existing) = user::Entity::find_by_id(id).one(&self.users_db).await? else {
            return Ok(None);
        };
        if update.is_empty() {
            return Ok(Some(model_to_user(existing)));
        }

        let mut active: user::ActiveModel = existing.into();
        if let Some(name) = update.name {
            active.name = Set(name);
        }
        if let Some(email) = update.email {
            active.email = Set(email);
        }
        if let Some(hash) = update.password_hash {
            active.password_hash = Set(hash);
        }
        if let Some(role) = update.role {
            active.role = Set(role.to_string());
        }
        if let Some(status) = update.status {
            active.status = Set(status.to_string());
        }
        active.updated_at = Set(Utc::now());

        let updated = self.write("update_user", || async {
            active.clone().update(&self.users_db).await
        })
        .await?;

        self.invalidate_count_cache();
        Ok(Some(model_to_user(updated)))
    }

    pub async fn update_user_password(&self, id: i64, password_hash: String) -> Result<bool> {
        let update = UserUpdate {
            password_hash: Some(password_hash),
            ..Default::default()
        };
        Ok(self.update_user(id, update).await?.is_some())
    }

    pub async fn set_user_status(&self, id: i64, status: UserStatus) -> Result<Option<User>> {
        let update = UserUpdate {
            status: Some(status),
            ..Default::default()
        };
        self.update_user(id, update).await
    }

    /// 硬删除，返回是否删除了记录
    pub async fn delete_user(&self, id: i64) -> Result<bool> {
        let result = self.write("delete_user", || async {
            user::Entity::delete_by_id(id).exec(&self.users_db).await
        })
        .await?;

        if result.rows_affected > 0 {
            self.invalidate_count_cache();
            info!("User deleted: {}", id);
        }
        Ok(result.rows_affected > 0)
    }

    pub async fn count_users(&self) -> Result<u64> {
        Ok(user::Entity::find().count(&self.users_db).await?)
    }
}
