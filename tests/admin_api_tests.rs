//! Admin API 与会话端点集成测试

use std::sync::{Arc, Once};

use actix_web::body::MessageBody;
use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use serde_json::{Value, json};
use tempfile::TempDir;

use linkhub::api::{configure_routes, extractor_configs};
use linkhub::config::{StaticConfig, update_config};
use linkhub::services::{
    AnalyticsService, CreateUserRequest, DevotionalService, LiveStatusService, PaymentService,
    UserService,
};
use linkhub::storage::{SeaOrmStorage, User, UserRole, UserStatus};

// =============================================================================
// 测试环境初始化
// =============================================================================

static INIT: Once = Once::new();

const ADMIN_EMAIL: &str = "admin@example.com";
const MEMBER_EMAIL: &str = "member@example.com";
const PASSWORD: &str = "password123";

fn init_static_config() {
    INIT.call_once(|| {
        let mut config = StaticConfig::default();
        config.auth.jwt_secret = "admin-api-test-secret-with-enough-length".to_string();
        config.auth.cookie_secure = false;
        update_config(config);
    });
}

struct TestEnv {
    _dir: TempDir,
    storage: Arc<SeaOrmStorage>,
    users: Arc<UserService>,
    admin: User,
}

async fn setup() -> TestEnv {
    init_static_config();
    let dir = TempDir::new().expect("创建临时目录失败");
    let url = |name: &str| format!("sqlite://{}?mode=rwc", dir.path().join(name).display());
    let storage = Arc::new(
        SeaOrmStorage::new(&url("analytics.db"), &url("users.db"))
            .await
            .expect("创建存储失败"),
    );

    let users = Arc::new(UserService::new(storage.clone()));
    let create = |email: &str, role: UserRole| CreateUserRequest {
        name: email.split('@').next().unwrap_or_default().to_string(),
        email: email.to_string(),
        password: PASSWORD.to_string(),
        role,
        status: UserStatus::Active,
    };
    let admin = users.create_user(create(ADMIN_EMAIL, UserRole::Admin)).await.unwrap();
    users.create_user(create(MEMBER_EMAIL, UserRole::User)).await.unwrap();

    TestEnv {
        _dir: dir,
        storage,
        users,
        admin,
    }
}

macro_rules! init_app {
    ($env:expr) => {{
        let storage = $env.storage.clone();
        test::init_service(
            App::new()
                .app_data(web::Data::new(storage.clone()))
                .app_data(web::Data::new($env.users.clone()))
                .app_data(web::Data::new(Arc::new(AnalyticsService::new(storage.clone()))))
                .app_data(web::Data::new(Arc::new(DevotionalService::new(storage.clone()))))
                .app_data(web::Data::new(Arc::new(PaymentService::new(storage.clone()))))
                .app_data(web::Data::new(Arc::new(LiveStatusService::new(
                    &Default::default(),
                ))))
                .configure(extractor_configs)
                .configure(configure_routes),
        )
        .await
    }};
}

/// 登录并返回 (access, refresh) cookies
macro_rules! login {
    ($app:expr, $email:expr) => {{
        let req = TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": $email, "password": PASSWORD }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cookies: Vec<Cookie<'static>> = resp
            .response()
            .cookies()
            .map(|c| c.into_owned())
            .collect();
        let find = |name: &str| {
            cookies
                .iter()
                .find(|c| c.name() == name)
                .cloned()
                .expect("session cookie missing")
        };
        (find("linkhub_access"), find("linkhub_refresh"))
    }};
}

async fn body_json<B: MessageBody>(resp: ServiceResponse<B>) -> Value {
    let bytes = test::read_body(resp).await;
    serde_json::from_slice(&bytes).expect("response is JSON")
}

// =============================================================================
// 会话
// =============================================================================

#[actix_rt::test]
async fn test_login_sets_http_only_cookies() {
    let env = setup().await;
    let app = init_app!(env);

    let (access, refresh) = login!(app, ADMIN_EMAIL);
    assert_eq!(access.http_only(), Some(true));
    assert_eq!(access.path(), Some("/"));
    assert_eq!(refresh.path(), Some("/api/auth"));

    let req = TestRequest::get()
        .uri("/api/auth/me")
        .cookie(access)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["email"], ADMIN_EMAIL);
    assert!(body["data"].get("password_hash").is_none());
}

#[actix_rt::test]
async fn test_login_failure_is_generic() {
    let env = setup().await;
    let app = init_app!(env);

    for (email, password) in [(ADMIN_EMAIL, "wrong"), ("ghost@example.com", PASSWORD)] {
        let req = TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": email, "password": password }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(resp).await;
        assert_eq!(body["code"], 2000);
        assert_eq!(body["message"], "Invalid email or password");
    }
}

#[actix_rt::test]
async fn test_refresh_and_logout() {
    let env = setup().await;
    let app = init_app!(env);

    let (_, refresh) = login!(app, MEMBER_EMAIL);

    let req = TestRequest::post()
        .uri("/api/auth/refresh")
        .cookie(refresh)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.response().cookies().any(|c| c.name() == "linkhub_access"));

    let req = TestRequest::post().uri("/api/auth/refresh").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = TestRequest::post().uri("/api/auth/logout").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cleared = resp
        .response()
        .cookies()
        .find(|c| c.name() == "linkhub_access")
        .map(|c| c.value().to_string());
    assert_eq!(cleared.as_deref(), Some(""));
}

// =============================================================================
// Admin 门禁
// =============================================================================

#[actix_rt::test]
async fn test_admin_gate() {
    let env = setup().await;
    let app = init_app!(env);

    let req = TestRequest::get().uri("/api/admin/users").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["code"], 1001);

    let (member_access, _) = login!(app, MEMBER_EMAIL);
    let req = TestRequest::get()
        .uri("/api/admin/users")
        .cookie(member_access)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(resp).await["code"], 2006);

    let (admin_access, _) = login!(app, ADMIN_EMAIL);
    let req = TestRequest::get()
        .uri("/api/admin/users?page=1&page_size=1")
        .cookie(admin_access)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["pagination"]["total"], 2);
    assert_eq!(body["pagination"]["total_pages"], 2);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
}

#[actix_rt::test]
async fn test_deactivated_admin_loses_access_immediately() {
    let env = setup().await;
    let app = init_app!(env);

    let (access, _) = login!(app, ADMIN_EMAIL);
    env.users.deactivate_user(env.admin.id).await.unwrap();

    let req = TestRequest::get()
        .uri("/api/admin/users")
        .cookie(access)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// 用户管理
// =============================================================================

#[actix_rt::test]
async fn test_user_management() {
    let env = setup().await;
    let app = init_app!(env);
    let (access, _) = login!(app, ADMIN_EMAIL);

    let req = TestRequest::post()
        .uri("/api/admin/users")
        .cookie(access.clone())
        .set_json(json!({
            "name": "Carla",
            "email": "carla@example.com",
            "password": "secret-pass",
            "role": "user"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    let id = created["data"]["id"].as_i64().unwrap();

    // 重复邮箱
    let req = TestRequest::post()
        .uri("/api/admin/users")
        .cookie(access.clone())
        .set_json(json!({
            "name": "Carla 2",
            "email": "CARLA@example.com",
            "password": "secret-pass"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(resp).await["code"], 3001);

    let req = TestRequest::post()
        .uri(&format!("/api/admin/users/{}/deactivate", id))
        .cookie(access.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["data"]["status"], "inactive");

    let req = TestRequest::delete()
        .uri(&format!("/api/admin/users/{}", id))
        .cookie(access.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = TestRequest::get()
        .uri(&format!("/api/admin/users/{}", id))
        .cookie(access)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["code"], 3000);
}

#[actix_rt::test]
async fn test_admin_cannot_remove_or_demote_self() {
    let env = setup().await;
    let app = init_app!(env);
    let (access, _) = login!(app, ADMIN_EMAIL);

    let req = TestRequest::delete()
        .uri(&format!("/api/admin/users/{}", env.admin.id))
        .cookie(access.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["code"], 3002);

    let req = TestRequest::put()
        .uri(&format!("/api/admin/users/{}", env.admin.id))
        .cookie(access)
        .set_json(json!({ "role": "user" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// 付款 / 灵修 / 统计
// =============================================================================

#[actix_rt::test]
async fn test_payments_endpoints() {
    let env = setup().await;
    let app = init_app!(env);
    let (access, _) = login!(app, ADMIN_EMAIL);

    for (amount, date, status) in [
        (100.0, "2024-01-05", "completed"),
        (40.0, "2024-02-05", "pending"),
        (7.5, "2024-02-06", "cancelled"),
    ] {
        let req = TestRequest::post()
            .uri("/api/admin/payments")
            .cookie(access.clone())
            .set_json(json!({
                "payment_recorder_id": "rec-1",
                "amount": amount,
                "date": date,
                "description": "Donation",
                "status": status
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = TestRequest::get()
        .uri("/api/admin/payments?start_date=2024-02-01&end_date=2024-02-28")
        .cookie(access.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["data"].as_array().map(Vec::len), Some(2));

    let req = TestRequest::get()
        .uri("/api/admin/payments?start_date=02/01/2024")
        .cookie(access.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = TestRequest::get()
        .uri("/api/admin/payments/summary")
        .cookie(access)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["total_amount"], 140.0);
    assert_eq!(body["data"]["total_count"], 2);
}

#[actix_rt::test]
async fn test_devotional_soft_delete_and_restore() {
    let env = setup().await;
    let app = init_app!(env);
    let (access, _) = login!(app, ADMIN_EMAIL);

    let req = TestRequest::post()
        .uri("/api/admin/devotionals")
        .cookie(access.clone())
        .set_json(json!({
            "title": "Morning",
            "content": "Psalm 23",
            "devotional_date": "2024-03-01",
            "status": "published"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let id = body_json(resp).await["data"]["id"].as_i64().unwrap();

    let req = TestRequest::delete()
        .uri(&format!("/api/admin/devotionals/{}", id))
        .cookie(access.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = TestRequest::get()
        .uri("/api/admin/devotionals")
        .cookie(access.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(body_json(resp).await["data"].as_array().map(Vec::len), Some(0));

    let req = TestRequest::get()
        .uri("/api/admin/devotionals?include_deleted=true")
        .cookie(access.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(body_json(resp).await["data"].as_array().map(Vec::len), Some(1));

    let req = TestRequest::post()
        .uri(&format!("/api/admin/devotionals/{}/restore", id))
        .cookie(access)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_json(resp).await["data"]["deleted_at"].is_null());
}

#[actix_rt::test]
async fn test_analytics_endpoints_and_bad_json() {
    let env = setup().await;
    let app = init_app!(env);
    let (access, _) = login!(app, ADMIN_EMAIL);

    let req = TestRequest::get()
        .uri("/api/admin/analytics/daily?days=7")
        .cookie(access.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = TestRequest::get()
        .uri("/api/admin/analytics/stats")
        .cookie(access.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["data"]["total_clicks"], 0);

    let req = TestRequest::post()
        .uri("/api/admin/payments")
        .cookie(access)
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["code"], 1000);
}
