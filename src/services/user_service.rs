//! User management service
//!
//! Shared by the admin HTTP handlers, the session endpoints and the CLI.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::BootstrapConfig;
use crate::errors::{LinkhubError, Result};
use crate::storage::{
    NewUser, SeaOrmStorage, User, UserFilter, UserRole, UserStatus, UserUpdate,
};
use crate::utils::password::{hash_password, verify_password};

/// 最短密码长度
pub const MIN_PASSWORD_LENGTH: usize = 6;
const MAX_NAME_LENGTH: usize = 100;
const MAX_EMAIL_LENGTH: usize = 254;

// ============ Request DTOs ============

#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    pub status: UserStatus,
}

/// Partial update, `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    /// New plaintext password, re-hashed before storage
    pub password: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
}

// ============ Validation ============

pub fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LinkhubError::validation("Name is required"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(LinkhubError::validation(format!(
            "Name must be at most {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(name.to_string())
}

/// 基本邮箱格式校验，返回小写形式
pub fn validate_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    let invalid = || LinkhubError::validation(format!("Invalid email address: '{}'", email));

    if email.is_empty() || email.len() > MAX_EMAIL_LENGTH || email.chars().any(char::is_whitespace)
    {
        return Err(invalid());
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(invalid());
    };
    if local.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(invalid());
    }

    Ok(email)
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(LinkhubError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

// ============ UserService ============

pub struct UserService {
    storage: Arc<SeaOrmStorage>,
}

impl UserService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    async fn ensure_email_available(&self, email: &str, exclude_id: Option<i64>) -> Result<()> {
        if let Some(existing) = self.storage.get_user_by_email(email).await?
            && Some(existing.user.id) != exclude_id
        {
            return Err(LinkhubError::conflict(format!(
                "Email '{}' is already registered",
                email
            )));
        }
        Ok(())
    }

    pub async fn create_user(&self, req: CreateUserRequest) -> Result<User> {
        let name = validate_name(&req.name)?;
        let email = validate_email(&req.email)?;
        validate_password(&req.password)?;

        self.ensure_email_available(&email, None).await?;

        let password_hash = hash_password(&req.password)?;
        self.storage
            .create_user(NewUser {
                name,
                email,
                password_hash,
                role: req.role,
                status: req.status,
            })
            .await
    }

    pub async fn get_user(&self, id: i64) -> Result<User> {
        self.storage
            .get_user(id)
            .await?
            .ok_or_else(|| LinkhubError::not_found(format!("User {} not found", id)))
    }

    /// 按邮箱查找公开用户信息
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .storage
            .get_user_by_email(email)
            .await?
            .map(|creds| creds.user))
    }

    /// 分页列出用户（page 从 1 开始）
    pub async fn list_users(
        &self,
        filter: UserFilter,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<User>, u64)> {
        let page = page.max(1);
        let page_size = page_size.clamp(1, 100);
        let filter = UserFilter {
            search: crate::utils::non_empty(filter.search.as_deref()),
            ..filter
        };
        self.storage
            .list_users(&filter, page_size, (page - 1) * page_size)
            .await
    }

    pub async fn update_user(&self, id: i64, req: UpdateUserRequest) -> Result<User> {
        let mut update = UserUpdate {
            role: req.role,
            status: req.status,
            ..Default::default()
        };

        if let Some(ref name) = req.name {
            update.name = Some(validate_name(name)?);
        }
        if let Some(ref email) = req.email {
            let email = validate_email(email)?;
            self.ensure_email_available(&email, Some(id)).await?;
            update.email = Some(email);
        }
        if let Some(password) = req.password.as_deref().filter(|p| !p.is_empty()) {
            validate_password(password)?;
            update.password_hash = Some(hash_password(password)?);
        }

        self.storage
            .update_user(id, update)
            .await?
            .ok_or_else(|| LinkhubError::not_found(format!("User {} not found", id)))
    }

    pub async fn change_password(&self, id: i64, new_password: &str) -> Result<()> {
        validate_password(new_password)?;
        let hash = hash_password(new_password)?;
        if !self.storage.update_user_password(id, hash).await? {
            return Err(LinkhubError::not_found(format!("User {} not found", id)));
        }
        info!("Password changed for user {}", id);
        Ok(())
    }

    pub async fn set_status(&self, id: i64, status: UserStatus) -> Result<User> {
        self.storage
            .set_user_status(id, status)
            .await?
            .ok_or_else(|| LinkhubError::not_found(format!("User {} not found", id)))
    }

    pub async fn activate_user(&self, id: i64) -> Result<User> {
        self.set_status(id, UserStatus::Active).await
    }

    pub async fn deactivate_user(&self, id: i64) -> Result<User> {
        self.set_status(id, UserStatus::Inactive).await
    }

    pub async fn delete_user(&self, id: i64) -> Result<()> {
        if !self.storage.delete_user(id).await? {
            return Err(LinkhubError::not_found(format!("User {} not found", id)));
        }
        Ok(())
    }

    /// 凭据校验：用户存在、处于 active 且密码匹配时返回用户
    ///
    /// 所有失败情况返回同一条 Unauthorized 消息，不泄露邮箱是否存在。
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let invalid = || LinkhubError::unauthorized("Invalid email or password");

        let Some(creds) = self.storage.get_user_by_email(email).await? else {
            return Err(invalid());
        };

        if !verify_password(password, &creds.password_hash) {
            warn!("Failed login attempt for {}", creds.user.email);
            return Err(invalid());
        }

        if !creds.user.is_active() {
            warn!("Login rejected for inactive user {}", creds.user.email);
            return Err(invalid());
        }

        Ok(creds.user)
    }

    /// 用户表为空时创建默认管理员
    pub async fn ensure_bootstrap_admin(&self, config: &BootstrapConfig) -> Result<Option<User>> {
        if !config.enabled || self.storage.count_users().await? > 0 {
            return Ok(None);
        }

        let admin = self
            .create_user(CreateUserRequest {
                name: config.admin_name.clone(),
                email: config.admin_email.clone(),
                password: config.admin_password.clone(),
                role: UserRole::Admin,
                status: UserStatus::Active,
            })
            .await?;

        warn!(
            "No users found, created default admin account {}. Change its password immediately.",
            admin.email
        );
        Ok(Some(admin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert_eq!(
            validate_email("  Admin@Example.COM ").unwrap(),
            "admin@example.com"
        );
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("a@@b.com").is_err());
        assert!(validate_email("a b@c.com").is_err());
        assert!(validate_email("a@.com").is_err());
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  Ana ").unwrap(), "Ana");
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
        assert_eq!(validate_password("").unwrap_err().code(), "E005");
    }
}
