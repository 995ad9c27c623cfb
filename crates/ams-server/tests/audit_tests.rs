//! Integration tests for the audit recorder and location-scoped access
//!
//! Requests are driven through the full router with `tower::ServiceExt`;
//! audit entries land via a detached write, so assertions poll briefly.

use ams_server::api::{create_router, AppState};
use ams_server::audit::AuditLayer;
use ams_server::auth::token::Claims;
use ams_server::config::{AuthConfig, Config};
use ams_server::error::AppError;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    routing::{get, post},
    Router,
};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use std::time::Duration;
use tower::ServiceExt;

fn issue_token(username: &str) -> String {
    let secret = AuthConfig::from_env().jwt_secret;
    let claims = Claims {
        sub: username.to_string(),
        exp: chrono::Utc::now().timestamp() + 3600,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("token encodes")
}

/// Poll until the audit trail holds `expected` rows or time runs out.
async fn wait_for_entries(pool: &PgPool, expected: i64) -> i64 {
    for _ in 0..40 {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_trail")
            .fetch_one(pool)
            .await
            .unwrap();
        if count >= expected {
            return count;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    sqlx::query_scalar("SELECT COUNT(*) FROM audit_trail")
        .fetch_one(pool)
        .await
        .unwrap()
}

fn recorder_test_app(pool: PgPool) -> Router {
    async fn ok_handler() -> &'static str {
        "ok"
    }

    async fn failing_handler() -> Result<Response, AppError> {
        Err(AppError::Internal("boom".to_string()))
    }

    let secret = AuthConfig::from_env().jwt_secret;
    Router::new()
        .route("/api/v1/assets", get(ok_handler))
        .route("/api/v1/assets", post(failing_handler))
        .route("/health", get(ok_handler))
        .layer(AuditLayer::new(pool, secret, Duration::from_secs(5)))
}

#[sqlx::test(migrations = "../../migrations")]
async fn successful_request_writes_one_entry(pool: PgPool) {
    let app = recorder_test_app(pool.clone());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/assets")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let count = wait_for_entries(&pool, 1).await;
    assert_eq!(count, 1);

    let (action, method, path, status): (String, String, String, i32) = sqlx::query_as(
        "SELECT action, request_method, request_path, response_status FROM audit_trail",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(action, "LIST");
    assert_eq!(method, "GET");
    assert_eq!(path, "/api/v1/assets");
    assert_eq!(status, 200);
}

#[sqlx::test(migrations = "../../migrations")]
async fn failing_request_still_writes_entry_and_surfaces_error(pool: PgPool) {
    let app = recorder_test_app(pool.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/assets")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"name": "X", "password": "hunter2"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    // The failure reaches the caller untouched
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let count = wait_for_entries(&pool, 1).await;
    assert_eq!(count, 1);

    let (action, status, error_message, new_values): (String, i32, Option<String>, JsonValue) =
        sqlx::query_as(
            "SELECT action, response_status, error_message, new_values FROM audit_trail",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(action, "CREATE");
    assert_eq!(status, 500);
    assert!(error_message.unwrap_or_default().contains("INTERNAL_ERROR"));
    // The captured body snapshot is redacted
    assert_eq!(new_values["password"], "***MASKED***");
    assert_eq!(new_values["name"], "X");
}

#[sqlx::test(migrations = "../../migrations")]
async fn health_checks_are_not_audited(pool: PgPool) {
    let app = recorder_test_app(pool.clone());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(200)).await;
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_trail")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

async fn seed_user(pool: &PgPool, username: &str, role: &str, locations: Option<JsonValue>) {
    sqlx::query(
        r#"
        INSERT INTO users (username, email, first_name, last_name, role, asset_access)
        VALUES ($1, $1 || '@example.com', 'Test', $1, $2, $3)
        "#,
    )
    .bind(username)
    .bind(role)
    .bind(locations)
    .execute(pool)
    .await
    .unwrap();
}

async fn seed_asset(pool: &PgPool, name: &str, location: &str) {
    sqlx::query("INSERT INTO assets (name, location) VALUES ($1, $2)")
        .bind(name)
        .bind(location)
        .execute(pool)
        .await
        .unwrap();
}

async fn list_assets_as(app: &Router, username: &str) -> Vec<JsonValue> {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/assets")
                .header(
                    header::AUTHORIZATION,
                    format!("Bearer {}", issue_token(username)),
                )
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    body["data"].as_array().cloned().unwrap_or_default()
}

#[sqlx::test(migrations = "../../migrations")]
async fn maintenance_manager_sees_only_own_locations(pool: PgPool) {
    seed_user(&pool, "root", "admin", None).await;
    seed_user(
        &pool,
        "lagos-mm",
        "maintenance_manager",
        Some(serde_json::json!(["Lagos"])),
    )
    .await;
    seed_asset(&pool, "Lagos Printer", "Lagos").await;
    seed_asset(&pool, "Abuja Printer", "Abuja").await;

    let state = AppState { db: pool.clone() };
    let mut config = Config::default();
    config.auth = AuthConfig::from_env();
    let app = create_router(state, &config);

    // Admin sees every location
    let all = list_assets_as(&app, "root").await;
    assert_eq!(all.len(), 2);

    // The scoped manager sees Lagos only
    let scoped = list_assets_as(&app, "lagos-mm").await;
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0]["location"], "Lagos");

    // No bearer credential at all is rejected by the handler (the audit
    // recorder still observed the request)
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/assets")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
