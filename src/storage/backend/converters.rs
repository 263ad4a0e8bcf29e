//! SeaORM Model 与领域结构之间的转换

use std::str::FromStr;

use tracing::warn;

use crate::storage::models::{
    DailyStat, Devotional, DevotionalStatus, Payment, PaymentStatus, User, UserCredentials,
    UserRole, UserStatus,
};
use migration::entities::{daily_stat, devotional, payment, user};

/// 解析数据库中的枚举文本，未知值回落到默认值
fn parse_or_default<T>(value: &str, column: &str, id: i64) -> T
where
    T: FromStr + Default,
{
    value.parse().unwrap_or_else(|_| {
        warn!(
            "Unknown {} value '{}' on row {}, falling back to default",
            column, value, id
        );
        T::default()
    })
}

pub fn model_to_user(model: user::Model) -> User {
    User {
        role: parse_or_default::<UserRole>(&model.role, "role", model.id),
        status: parse_or_default::<UserStatus>(&model.status, "status", model.id),
        id: model.id,
        name: model.name,
        email: model.email,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub fn model_to_credentials(model: user::Model) -> UserCredentials {
    let password_hash = model.password_hash.clone();
    UserCredentials {
        user: model_to_user(model),
        password_hash,
    }
}

pub fn model_to_devotional(model: devotional::Model) -> Devotional {
    Devotional {
        status: parse_or_default::<DevotionalStatus>(&model.status, "status", model.id),
        id: model.id,
        title: model.title,
        content: model.content,
        devotional_date: model.devotional_date,
        created_at: model.created_at,
        updated_at: model.updated_at,
        deleted_at: model.deleted_at,
    }
}

pub fn model_to_payment(model: payment::Model) -> Payment {
    Payment {
        status: parse_or_default::<PaymentStatus>(&model.status, "status", model.id),
        id: model.id,
        payment_recorder_id: model.payment_recorder_id,
        amount: model.amount,
        date: model.date,
        description: model.description,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub fn model_to_daily_stat(model: daily_stat::Model) -> DailyStat {
    DailyStat {
        date: model.date,
        total_clicks: model.total_clicks.max(0) as u64,
        updated_at: model.updated_at,
    }
}
