//! Service 层集成测试

use std::sync::{Arc, Once};

use tempfile::TempDir;

use linkhub::config::{BootstrapConfig, StaticConfig, update_config};
use linkhub::errors::LinkhubError;
use linkhub::services::{
    AnalyticsService, ClickRequest, CreateDevotionalRequest, CreatePaymentRequest,
    CreateUserRequest, DevotionalService, PaymentService, UpdateUserRequest, UserService,
};
use linkhub::storage::{DevotionalFilter, PaymentFilter, SeaOrmStorage, UserRole, UserStatus};

static INIT: Once = Once::new();

fn init_static_config() {
    INIT.call_once(|| {
        let mut config = StaticConfig::default();
        config.analytics.ip_hash_salt = "test-salt".to_string();
        update_config(config);
    });
}

async fn create_storage() -> (TempDir, Arc<SeaOrmStorage>) {
    init_static_config();
    let temp_dir = TempDir::new().expect("创建临时目录失败");
    let url = |name: &str| {
        format!(
            "sqlite://{}?mode=rwc",
            temp_dir.path().join(name).display()
        )
    };
    let storage = SeaOrmStorage::new(&url("analytics.db"), &url("users.db"))
        .await
        .expect("创建存储失败");
    (temp_dir, Arc::new(storage))
}

fn user_request(email: &str, role: UserRole) -> CreateUserRequest {
    CreateUserRequest {
        name: "Test User".to_string(),
        email: email.to_string(),
        password: "password123".to_string(),
        role,
        status: UserStatus::Active,
    }
}

// =============================================================================
// UserService
// =============================================================================

#[tokio::test]
async fn test_create_user_normalizes_email_and_rejects_duplicates() {
    let (_dir, storage) = create_storage().await;
    let service = UserService::new(storage);

    let user = service
        .create_user(user_request("  Ana@Example.COM ", UserRole::User))
        .await
        .unwrap();
    assert_eq!(user.email, "ana@example.com");

    let err = service
        .create_user(user_request("ana@example.com", UserRole::Admin))
        .await
        .unwrap_err();
    assert!(matches!(err, LinkhubError::Conflict(_)));
}

#[tokio::test]
async fn test_create_user_validation() {
    let (_dir, storage) = create_storage().await;
    let service = UserService::new(storage);

    let mut short = user_request("short@example.com", UserRole::User);
    short.password = "123".to_string();
    assert!(matches!(
        service.create_user(short).await,
        Err(LinkhubError::Validation(_))
    ));

    assert!(matches!(
        service
            .create_user(user_request("not-an-email", UserRole::User))
            .await,
        Err(LinkhubError::Validation(_))
    ));
}

#[tokio::test]
async fn test_login_flow() {
    let (_dir, storage) = create_storage().await;
    let service = UserService::new(storage);

    let user = service
        .create_user(user_request("login@example.com", UserRole::User))
        .await
        .unwrap();

    let logged_in = service.login("login@example.com", "password123").await.unwrap();
    assert_eq!(logged_in.id, user.id);

    assert!(matches!(
        service.login("login@example.com", "wrong-password").await,
        Err(LinkhubError::Unauthorized(_))
    ));
    assert!(matches!(
        service.login("nobody@example.com", "password123").await,
        Err(LinkhubError::Unauthorized(_))
    ));

    service.deactivate_user(user.id).await.unwrap();
    assert!(matches!(
        service.login("login@example.com", "password123").await,
        Err(LinkhubError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn test_change_password_and_update() {
    let (_dir, storage) = create_storage().await;
    let service = UserService::new(storage);

    let user = service
        .create_user(user_request("pw@example.com", UserRole::User))
        .await
        .unwrap();

    service.change_password(user.id, "new-password").await.unwrap();
    assert!(service.login("pw@example.com", "password123").await.is_err());
    assert!(service.login("pw@example.com", "new-password").await.is_ok());

    let updated = service
        .update_user(
            user.id,
            UpdateUserRequest {
                role: Some(UserRole::Admin),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(updated.is_admin());

    assert!(matches!(
        service.change_password(9999, "new-password").await,
        Err(LinkhubError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_bootstrap_admin_only_when_empty() {
    let (_dir, storage) = create_storage().await;
    let service = UserService::new(storage);

    let config = BootstrapConfig {
        enabled: true,
        admin_name: "Admin".to_string(),
        admin_email: "admin@example.com".to_string(),
        admin_password: "change-me-now".to_string(),
    };

    let admin = service
        .ensure_bootstrap_admin(&config)
        .await
        .unwrap()
        .expect("admin created");
    assert_eq!(admin.role, UserRole::Admin);

    assert!(service.ensure_bootstrap_admin(&config).await.unwrap().is_none());
}

// =============================================================================
// AnalyticsService
// =============================================================================

#[tokio::test]
async fn test_track_click_and_stats() {
    let (_dir, storage) = create_storage().await;
    let service = AnalyticsService::new(storage);

    let id = service
        .track_click(ClickRequest {
            platform: "twitch".to_string(),
            url: "https://twitch.tv/example".to_string(),
            ip: Some("203.0.113.7".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(id > 0);

    let stats = service.stats().await.unwrap();
    assert_eq!(stats.total_clicks, 1);
    assert_eq!(stats.clicks_by_platform[0].platform, "twitch");

    assert!(matches!(
        service
            .track_click(ClickRequest {
                platform: "twitch".to_string(),
                ..Default::default()
            })
            .await,
        Err(LinkhubError::Validation(_))
    ));

    assert!(service.daily_stats(0).await.is_err());
    assert_eq!(service.daily_stats(30).await.unwrap().len(), 1);
}

// =============================================================================
// DevotionalService / PaymentService
// =============================================================================

#[tokio::test]
async fn test_devotional_lifecycle() {
    let (_dir, storage) = create_storage().await;
    let service = DevotionalService::new(storage);

    let created = service
        .create(CreateDevotionalRequest {
            title: "Morning".to_string(),
            content: "Psalm 23".to_string(),
            devotional_date: "2024-03-01".to_string(),
            status: Some("published".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(service.published_feed(None).await.unwrap().len(), 1);

    service.soft_delete(created.id).await.unwrap();
    assert!(service.published_feed(None).await.unwrap().is_empty());
    assert!(matches!(
        service.soft_delete(created.id).await,
        Err(LinkhubError::NotFound(_))
    ));

    let restored = service.restore(created.id).await.unwrap();
    assert!(!restored.is_deleted());
    assert_eq!(
        service.list(DevotionalFilter::default()).await.unwrap().len(),
        1
    );

    assert!(matches!(
        service
            .create(CreateDevotionalRequest {
                title: "Bad date".to_string(),
                content: "x".to_string(),
                devotional_date: "01/03/2024".to_string(),
                status: None,
            })
            .await,
        Err(LinkhubError::DateParse(_))
    ));
}

#[tokio::test]
async fn test_payment_validation_and_range() {
    let (_dir, storage) = create_storage().await;
    let service = PaymentService::new(storage);

    let request = |amount: f64, date: &str| CreatePaymentRequest {
        payment_recorder_id: "rec-1".to_string(),
        amount,
        date: date.to_string(),
        description: "Donation".to_string(),
        status: Some("completed".to_string()),
    };

    service.create(request(25.0, "2024-02-01")).await.unwrap();
    assert!(service.create(request(-1.0, "2024-02-01")).await.is_err());

    let summary = service.summary().await.unwrap();
    assert_eq!(summary.total_completed, 25.0);

    let inverted = PaymentFilter {
        start_date: chrono::NaiveDate::from_ymd_opt(2024, 3, 1),
        end_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1),
        ..Default::default()
    };
    assert!(matches!(
        service.list(inverted).await,
        Err(LinkhubError::Validation(_))
    ));
}
