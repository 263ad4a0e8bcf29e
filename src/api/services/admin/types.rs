//! Admin API 类型定义

use serde::{Deserialize, Serialize};

use crate::storage::User;

/// 统一响应信封
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PaginatedResponse<T> {
    pub code: i32,
    pub message: String,
    pub data: T,
    pub pagination: PaginationInfo,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PaginationInfo {
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl PaginationInfo {
    pub fn new(page: u64, page_size: u64, total: u64) -> Self {
        let page_size = page_size.max(1);
        Self {
            page,
            page_size,
            total,
            total_pages: total.div_ceil(page_size),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MessageResponse {
    pub message: String,
}

// ============ 会话 ============

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AuthSuccessResponse {
    pub user: User,
    /// access token 有效期（秒）
    pub expires_in: u64,
}

// ============ 用户 ============

#[derive(Deserialize, Clone, Debug, Default)]
pub struct GetUsersQuery {
    pub search: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct PostNewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct UpdateUserBody {
    pub name: Option<String>,
    pub email: Option<String>,
    /// 为空字符串时忽略
    pub password: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
}

// ============ 付款 ============

#[derive(Deserialize, Clone, Debug, Default)]
pub struct GetPaymentsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
    pub recorder_id: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct PostNewPayment {
    pub payment_recorder_id: String,
    pub amount: f64,
    pub date: String,
    pub description: String,
    pub status: Option<String>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct UpdatePaymentBody {
    pub payment_recorder_id: Option<String>,
    pub amount: Option<f64>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

// ============ 灵修内容 ============

#[derive(Deserialize, Clone, Debug, Default)]
pub struct GetDevotionalsQuery {
    pub status: Option<String>,
    pub include_deleted: Option<bool>,
    pub search: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct PostNewDevotional {
    pub title: String,
    pub content: String,
    pub devotional_date: String,
    pub status: Option<String>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct UpdateDevotionalBody {
    pub title: Option<String>,
    pub content: Option<String>,
    pub devotional_date: Option<String>,
    pub status: Option<String>,
}

// ============ 统计 ============

#[derive(Deserialize, Clone, Debug, Default)]
pub struct DailyStatsQuery {
    pub days: Option<u32>,
}
