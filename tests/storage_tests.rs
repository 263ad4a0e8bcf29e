//! Storage 层集成测试（临时 SQLite）

use std::sync::{Arc, Once};

use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue::Set};
use tempfile::TempDir;

use linkhub::config::{StaticConfig, update_config};
use linkhub::storage::{
    DevotionalFilter, DevotionalStatus, NewClick, NewDevotional, NewPayment, NewUser,
    PaymentFilter, PaymentStatus, SeaOrmStorage, UserFilter, UserRole, UserStatus, UserUpdate,
};

static INIT: Once = Once::new();

fn init_static_config() {
    INIT.call_once(|| {
        update_config(StaticConfig::default());
    });
}

async fn create_storage() -> (TempDir, Arc<SeaOrmStorage>) {
    init_static_config();
    let temp_dir = TempDir::new().expect("创建临时目录失败");
    let analytics_url = format!(
        "sqlite://{}?mode=rwc",
        temp_dir.path().join("analytics.db").display()
    );
    let users_url = format!(
        "sqlite://{}?mode=rwc",
        temp_dir.path().join("users.db").display()
    );
    let storage = SeaOrmStorage::new(&analytics_url, &users_url)
        .await
        .expect("创建存储失败");
    (temp_dir, Arc::new(storage))
}

fn new_user(name: &str, email: &str, role: UserRole) -> NewUser {
    NewUser {
        name: name.to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$placeholder".to_string(),
        role,
        status: UserStatus::Active,
    }
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[tokio::test]
async fn test_storage_ping_and_backend_name() {
    let (_dir, storage) = create_storage().await;
    storage.ping().await.unwrap();
    assert_eq!(storage.backend_name(), "sqlite");
}

#[tokio::test]
async fn test_user_crud() {
    let (_dir, storage) = create_storage().await;

    let user = storage
        .create_user(new_user("Ana", "ana@example.com", UserRole::Admin))
        .await
        .unwrap();
    assert!(user.id > 0);
    assert_eq!(user.role, UserRole::Admin);

    let creds = storage
        .get_user_by_email("ana@example.com")
        .await
        .unwrap()
        .expect("user by email");
    assert_eq!(creds.user.id, user.id);
    assert_eq!(creds.password_hash, "$argon2id$placeholder");

    let updated = storage
        .update_user(
            user.id,
            UserUpdate {
                name: Some("Ana Maria".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.name, "Ana Maria");
    assert_eq!(updated.email, "ana@example.com");

    let inactive = storage
        .set_user_status(user.id, UserStatus::Inactive)
        .await
        .unwrap()
        .unwrap();
    assert!(!inactive.is_active());

    assert!(storage.delete_user(user.id).await.unwrap());
    assert!(!storage.delete_user(user.id).await.unwrap());
    assert!(storage.get_user(user.id).await.unwrap().is_none());
    assert!(storage.update_user(user.id, UserUpdate::default()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_empty_user_update_leaves_row_untouched() {
    let (_dir, storage) = create_storage().await;

    let user = storage
        .create_user(new_user("Dora", "dora@example.com", UserRole::User))
        .await
        .unwrap();

    let same = storage
        .update_user(user.id, UserUpdate::default())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(same.name, "Dora");
    assert_eq!(same.updated_at, user.updated_at);
}

#[tokio::test]
async fn test_list_users_filter_and_count() {
    let (_dir, storage) = create_storage().await;

    for (name, email, role) in [
        ("Ana", "ana@example.com", UserRole::Admin),
        ("Bruno", "bruno@example.com", UserRole::User),
        ("Carla", "carla@sample.org", UserRole::User),
    ] {
        storage.create_user(new_user(name, email, role)).await.unwrap();
    }

    let (all, total) = storage.list_users(&UserFilter::default(), 2, 0).await.unwrap();
    assert_eq!(total, 3);
    assert_eq!(all.len(), 2);

    let filter = UserFilter {
        search: Some("example.com".to_string()),
        role: Some(UserRole::User),
        ..Default::default()
    };
    let (users, total) = storage.list_users(&filter, 10, 0).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(users[0].name, "Bruno");

    // 写入后 COUNT 缓存失效
    storage
        .create_user(new_user("Davi", "davi@example.com", UserRole::User))
        .await
        .unwrap();
    let (_, total) = storage.list_users(&UserFilter::default(), 10, 0).await.unwrap();
    assert_eq!(total, 4);
    assert_eq!(storage.count_users().await.unwrap(), 4);
}

#[tokio::test]
async fn test_click_stats() {
    let (_dir, storage) = create_storage().await;

    let click = |platform: &str, url: &str| NewClick {
        platform: platform.to_string(),
        url: url.to_string(),
        ..Default::default()
    };

    for _ in 0..3 {
        storage
            .register_click(click("twitch", "https://twitch.tv/example"))
            .await
            .unwrap();
    }
    storage
        .register_click(click("youtube", "https://youtube.com/@example"))
        .await
        .unwrap();

    assert_eq!(storage.total_clicks().await.unwrap(), 4);
    assert_eq!(storage.recent_clicks().await.unwrap(), 4);

    let by_platform = storage.clicks_by_platform().await.unwrap();
    assert_eq!(by_platform[0].platform, "twitch");
    assert_eq!(by_platform[0].count, 3);

    let top = storage.top_links(1).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].url, "https://twitch.tv/example");

    // 每次点击同步累加当天的日汇总
    let daily = storage.daily_stats(7).await.unwrap();
    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0].total_clicks, 4);

    let stats = storage.all_stats(7, 5).await.unwrap();
    assert_eq!(stats.total_clicks, 4);
    assert_eq!(stats.top_links.len(), 2);
}

#[tokio::test]
async fn test_click_time_windows() {
    use migration::entities::click;

    let (_dir, storage) = create_storage().await;
    let now = Utc::now();
    let ages = [
        Duration::zero(),
        Duration::hours(30),
        Duration::days(3),
        Duration::days(10),
    ];

    for age in ages {
        click::ActiveModel {
            platform: Set("twitch".to_string()),
            url: Set("https://twitch.tv/example".to_string()),
            clicked_at: Set(now - age),
            ..Default::default()
        }
        .insert(storage.analytics_db())
        .await
        .unwrap();
    }

    assert_eq!(storage.total_clicks().await.unwrap(), 4);
    // 只有刚才那次在 24 小时内
    assert_eq!(storage.recent_clicks().await.unwrap(), 1);

    // 10 天前的点击不在 7 天趋势里，其余三次各占一个 UTC 日期
    let expected: Vec<String> = [Duration::days(3), Duration::hours(30), Duration::zero()]
        .iter()
        .map(|age| (now - *age).format("%Y-%m-%d").to_string())
        .collect();
    let trend = storage.clicks_last_days(7).await.unwrap();
    let dates: Vec<String> = trend.iter().map(|d| d.date.clone()).collect();
    assert_eq!(dates, expected);
    assert!(trend.iter().all(|d| d.count == 1));

    let stats = storage.all_stats(7, 5).await.unwrap();
    assert_eq!(stats.total_clicks, 4);
    assert_eq!(stats.clicks_last_24h, 1);
    assert_eq!(stats.trend, trend);
}

#[tokio::test]
async fn test_devotional_soft_delete_and_feed() {
    let (_dir, storage) = create_storage().await;

    let devotional = |title: &str, day: &str, status: DevotionalStatus| NewDevotional {
        title: title.to_string(),
        content: "Content".to_string(),
        devotional_date: date(day),
        status,
    };

    let published = storage
        .create_devotional(devotional("Grace", "2024-01-10", DevotionalStatus::Published))
        .await
        .unwrap();
    storage
        .create_devotional(devotional("Draft", "2024-01-11", DevotionalStatus::Draft))
        .await
        .unwrap();
    storage
        .create_devotional(devotional("Future", "2099-01-01", DevotionalStatus::Published))
        .await
        .unwrap();

    let feed = storage
        .published_devotionals(date("2024-06-01"), 10)
        .await
        .unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].id, published.id);

    assert!(storage.soft_delete_devotional(published.id).await.unwrap());
    assert!(!storage.soft_delete_devotional(published.id).await.unwrap());

    let visible = storage
        .list_devotionals(&DevotionalFilter::default())
        .await
        .unwrap();
    assert_eq!(visible.len(), 2);

    let with_deleted = storage
        .list_devotionals(&DevotionalFilter {
            include_deleted: true,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(with_deleted.len(), 3);

    // 软删除后仍可按 id 读取
    let deleted = storage.get_devotional(published.id).await.unwrap().unwrap();
    assert!(deleted.is_deleted());

    assert!(storage.restore_devotional(published.id).await.unwrap());
    assert!(!storage.restore_devotional(published.id).await.unwrap());
}

#[tokio::test]
async fn test_payments_filter_and_summary() {
    let (_dir, storage) = create_storage().await;

    let payment = |amount: f64, day: &str, status: PaymentStatus| NewPayment {
        payment_recorder_id: "rec-1".to_string(),
        amount,
        date: date(day),
        description: "Donation".to_string(),
        status,
    };

    storage
        .create_payment(payment(100.0, "2024-01-01", PaymentStatus::Completed))
        .await
        .unwrap();
    storage
        .create_payment(payment(50.0, "2024-01-15", PaymentStatus::Pending))
        .await
        .unwrap();
    let cancelled = storage
        .create_payment(payment(999.0, "2024-01-31", PaymentStatus::Cancelled))
        .await
        .unwrap();

    let january = storage
        .list_payments(&PaymentFilter {
            start_date: Some(date("2024-01-01")),
            end_date: Some(date("2024-01-15")),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(january.len(), 2);
    // date desc
    assert_eq!(january[0].date, date("2024-01-15"));

    let summary = storage.payment_summary().await.unwrap();
    assert_eq!(summary.total_amount, 150.0);
    assert_eq!(summary.total_count, 2);

    assert!(storage.delete_payment(cancelled.id).await.unwrap());
    assert!(storage.get_payment(cancelled.id).await.unwrap().is_none());
}
