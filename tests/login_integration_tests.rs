use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use user_gateway::auth::jwt::{Identity, TOKEN_VALIDITY_DAYS};
use user_gateway::auth::JwtService;
use user_gateway::backend::client::HttpUserBackend;
use user_gateway::backend::{PageRequest, RpcFailure, UserBackend};
use user_gateway::clock::FixedClock;
use user_gateway::mocks::{BackendCall, MockUserBackend};
use user_gateway::types::{Locale, UserSrvConfig};
use user_gateway::{configure_user_routes, AppState};

const SECRET: &str = "integration-test-signing-key";

fn jwt() -> Arc<JwtService> {
    Arc::new(JwtService::new(SECRET, "user-gateway"))
}

fn state_with(backend: Arc<dyn UserBackend>, locale: Locale) -> AppState {
    AppState::new(backend, jwt(), locale)
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new().app_data(web::Data::new($state)).configure(configure_user_routes(jwt())),
        )
        .await
    };
}

#[actix_web::test]
async fn test_login_unknown_mobile() {
    let backend = MockUserBackend::new()
        .with_lookup_result(Err(RpcFailure::NotFound("no such user".to_string())));
    let app = app!(state_with(Arc::new(backend.clone()), Locale::En));

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({"mobile": "13800000000", "password": "x"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"mobile": "user not found"}));
    assert_eq!(backend.calls(), vec![BackendCall::GetUserByMobile("13800000000".to_string())]);
}

#[actix_web::test]
async fn test_login_wrong_password() {
    let backend = MockUserBackend::new()
        .with_lookup_result(Ok(MockUserBackend::user(42, "bob", "13800000000", 1)))
        .with_password_result(Ok(false));
    let app = app!(state_with(Arc::new(backend.clone()), Locale::En));

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({"mobile": "13800000000", "password": "wrong"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"msg": "login failed"}));
    assert_eq!(backend.calls().len(), 2);
}

#[actix_web::test]
async fn test_login_success_issues_token() {
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
    let backend = MockUserBackend::new()
        .with_lookup_result(Ok(MockUserBackend::user(42, "bob", "13800000000", 1)))
        .with_password_result(Ok(true));
    let state = state_with(Arc::new(backend.clone()), Locale::En)
        .with_clock(Arc::new(FixedClock(now)));
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({"mobile": "13800000000", "password": "secret"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["id"], 42);
    assert_eq!(body["nick_name"], "bob");
    assert!(!body["token"].as_str().unwrap().is_empty());
    let expected = (now + chrono::Duration::days(TOKEN_VALIDITY_DAYS)).timestamp() * 1000;
    assert_eq!(body["expired_at"], expected);

    assert_eq!(backend.calls()[1], BackendCall::CheckPassword {
        encrypted_password: "$pbkdf2-sha512$mock$42".to_string(),
    });
}

#[actix_web::test]
async fn test_login_accepts_form_body() {
    let backend = MockUserBackend::new()
        .with_lookup_result(Ok(MockUserBackend::user(7, "amy", "13912345678", 2)))
        .with_password_result(Ok(true));
    let app = app!(state_with(Arc::new(backend), Locale::En));

    let req = test::TestRequest::post()
        .uri("/login")
        .set_form([("mobile", "13912345678"), ("password", "secret")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["nick_name"], "amy");
}

#[actix_web::test]
async fn test_login_backend_unreachable() {
    let backend = HttpUserBackend::new(&UserSrvConfig {
        host: "127.0.0.1".to_string(),
        port: 1,
        timeout_ms: 500,
    })
    .unwrap();
    let app = app!(state_with(Arc::new(backend), Locale::En));

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({"mobile": "13800000000", "password": "secret"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"msg": "service unavailable"}));
}

#[actix_web::test]
async fn test_login_password_check_failure() {
    let backend = MockUserBackend::new()
        .with_lookup_result(Ok(MockUserBackend::user(42, "bob", "13800000000", 1)))
        .with_password_result(Err(RpcFailure::Internal("hash mismatch format".to_string())));
    let app = app!(state_with(Arc::new(backend), Locale::En));

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({"mobile": "13800000000", "password": "secret"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"password": "login failed"}));
}

#[actix_web::test]
async fn test_login_validation_errors_are_flattened() {
    let backend = MockUserBackend::new();
    let app = app!(state_with(Arc::new(backend.clone()), Locale::En));

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({"mobile": "123", "password": ""}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({
            "mobile": "mobile is not a valid mobile number",
            "password": "password is a required field"
        })
    );
    assert!(backend.calls().is_empty());
}

#[actix_web::test]
async fn test_login_validation_localized() {
    let app = app!(state_with(Arc::new(MockUserBackend::new()), Locale::Zh));

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({"password": "secret"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"mobile": "mobile为必填字段"}));
}

#[actix_web::test]
async fn test_login_malformed_body() {
    let app = app!(state_with(Arc::new(MockUserBackend::new()), Locale::En));

    let req = test::TestRequest::post()
        .uri("/login")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["msg"].is_string());
}

#[actix_web::test]
async fn test_list_users_requires_session() {
    let app = app!(state_with(Arc::new(MockUserBackend::new()), Locale::En));

    let req = test::TestRequest::get().uri("/users").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"msg": "please log in"}));
}

#[actix_web::test]
async fn test_list_users_with_session() {
    let mut user = MockUserBackend::user(42, "bob", "13800000000", 1);
    user.birthday = 946_684_800;
    let backend = MockUserBackend::new().with_list_result(Ok(vec![user]));
    let app = app!(state_with(Arc::new(backend.clone()), Locale::En));

    let token = jwt()
        .issue(
            &Identity {
                id: 42,
                name: "bob".to_string(),
                role: 1,
            },
            Utc::now(),
        )
        .unwrap()
        .token;

    let req = test::TestRequest::get()
        .uri("/users?pn=2&psize=abc")
        .insert_header(("x-token", token))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!([{
            "id": 42,
            "name": "bob",
            "birthday": "2000-01-01",
            "gender": "male",
            "mobile": "13800000000"
        }])
    );
    assert_eq!(backend.calls(), vec![BackendCall::ListUsers(PageRequest {
        pn: 2,
        psize: 0,
    })]);
}

#[actix_web::test]
async fn test_list_users_backend_failure() {
    let backend = MockUserBackend::new()
        .with_list_result(Err(RpcFailure::Unavailable("connection refused".to_string())));
    let app = app!(state_with(Arc::new(backend), Locale::En));

    let token = jwt()
        .issue(
            &Identity {
                id: 1,
                name: "root".to_string(),
                role: 2,
            },
            Utc::now(),
        )
        .unwrap()
        .token;

    let req = test::TestRequest::get()
        .uri("/users")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"msg": "service unavailable"}));
}
