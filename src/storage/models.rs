use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

// ============ 枚举 ============
//
// 数据库中以小写字符串存储，序列化同样为小写。

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum UserRole {
    Admin,
    #[default]
    User,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DevotionalStatus {
    #[default]
    Draft,
    Published,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

// ============ 用户 ============

/// 对外的用户视图（不含密码哈希）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

/// 用户 + 密码哈希，仅用于登录校验
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub status: UserStatus,
}

/// 部分更新，`None` 表示保持不变
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.role.is_none()
            && self.status.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// 模糊匹配 name 或 email
    pub search: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
}

// ============ 点击统计 ============

#[derive(Debug, Clone, Default)]
pub struct NewClick {
    pub platform: String,
    pub url: String,
    pub user_agent: Option<String>,
    pub ip_hash: Option<String>,
    pub referrer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformCount {
    pub platform: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateCount {
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopLink {
    pub platform: String,
    pub url: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub total_clicks: u64,
    pub updated_at: DateTime<Utc>,
}

/// 首页与后台展示的汇总统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsStats {
    pub total_clicks: u64,
    pub clicks_last_24h: u64,
    pub clicks_by_platform: Vec<PlatformCount>,
    pub trend: Vec<DateCount>,
    pub top_links: Vec<TopLink>,
}

// ============ 灵修 ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Devotional {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub devotional_date: NaiveDate,
    pub status: DevotionalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Devotional {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct NewDevotional {
    pub title: String,
    pub content: String,
    pub devotional_date: NaiveDate,
    pub status: DevotionalStatus,
}

#[derive(Debug, Clone, Default)]
pub struct DevotionalUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub devotional_date: Option<NaiveDate>,
    pub status: Option<DevotionalStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct DevotionalFilter {
    pub status: Option<DevotionalStatus>,
    /// 为 true 时包含已软删除的记录
    pub include_deleted: bool,
    /// 模糊匹配 title 或 content
    pub search: Option<String>,
}

// ============ 付款记录 ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub payment_recorder_id: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub description: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub payment_recorder_id: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub description: String,
    pub status: PaymentStatus,
}

#[derive(Debug, Clone, Default)]
pub struct PaymentUpdate {
    pub payment_recorder_id: Option<String>,
    pub amount: Option<f64>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub status: Option<PaymentStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    /// 含当天
    pub start_date: Option<NaiveDate>,
    /// 含当天
    pub end_date: Option<NaiveDate>,
    pub status: Option<PaymentStatus>,
    pub recorder_id: Option<String>,
}

/// 付款汇总，已取消的记录不计入任何金额与计数
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentSummary {
    pub total_amount: f64,
    pub total_completed: f64,
    pub total_pending: f64,
    pub total_count: u64,
    pub completed_count: u64,
    pub pending_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_enum_string_roundtrip_is_lowercase() {
        assert_eq!(UserRole::Admin.as_ref(), "admin");
        assert_eq!(UserStatus::Inactive.to_string(), "inactive");
        assert_eq!(DevotionalStatus::Published.as_ref(), "published");
        assert_eq!(PaymentStatus::Cancelled.as_ref(), "cancelled");
    }

    #[test]
    fn test_enum_parse_case_insensitive() {
        assert_eq!(UserRole::from_str("ADMIN").unwrap(), UserRole::Admin);
        assert_eq!(
            PaymentStatus::from_str("Completed").unwrap(),
            PaymentStatus::Completed
        );
        assert!(PaymentStatus::from_str("refunded").is_err());
        assert!(DevotionalStatus::from_str("archived").is_err());
    }

    #[test]
    fn test_enum_serde_lowercase() {
        let json = serde_json::to_string(&PaymentStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
        let role: UserRole = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, UserRole::Admin);
    }

    #[test]
    fn test_user_update_is_empty() {
        assert!(UserUpdate::default().is_empty());
        let update = UserUpdate {
            name: Some("x".into()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
