#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use cinema_api::auth::jwt::{generate_access_token, JwtConfig};
use cinema_api::config::ServerConfig;
use cinema_api::router::build_app_router;
use cinema_api::state::AppState;
use cinema_core::roles::{ROLE_ADMIN, ROLE_CUSTOMER};
use cinema_core::types::DbId;

/// Staff user id embedded in [`admin_token`].
pub const ADMIN_ID: DbId = 1;

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        db_max_connections: 5,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router, middleware included, over `pool`.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

pub fn admin_token() -> String {
    generate_access_token(ADMIN_ID, ROLE_ADMIN, &test_config().jwt)
        .expect("token generation should succeed")
}

pub fn customer_token(user_id: DbId) -> String {
    generate_access_token(user_id, ROLE_CUSTOMER, &test_config().jwt)
        .expect("token generation should succeed")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("request should complete")
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    json_request(app, "POST", uri, body, token).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    json_request(app, "PUT", uri, body, token).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn json_request(
    app: Router,
    method: &str,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    send(app, request).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a movie and a one-room theater through the API; returns
/// `(movie_id, room_id)`.
pub async fn seed_catalog(app: &Router, duration_minutes: i32, rows: i32, seats: i32) -> (i64, i64) {
    let admin = admin_token();

    let movie = post_json_auth(
        app.clone(),
        "/api/v1/movies",
        serde_json::json!({ "title": "Arrival", "duration_minutes": duration_minutes }),
        &admin,
    )
    .await;
    assert_eq!(movie.status(), StatusCode::CREATED);
    let movie_id = body_json(movie).await["data"]["id"].as_i64().unwrap();

    let theater = post_json_auth(
        app.clone(),
        "/api/v1/theaters",
        serde_json::json!({ "name": "Odeon", "row_count": rows, "seats_per_row": seats }),
        &admin,
    )
    .await;
    assert_eq!(theater.status(), StatusCode::CREATED);
    let room_id = body_json(theater).await["data"]["rooms"][0]["id"]
        .as_i64()
        .unwrap();

    (movie_id, room_id)
}

/// Create a screening at `show_time` (RFC 3339) priced at 20.00.
pub async fn create_screening(app: &Router, movie_id: i64, room_id: i64, show_time: &str) -> Response {
    post_json_auth(
        app.clone(),
        "/api/v1/screenings",
        serde_json::json!({
            "movie_id": movie_id,
            "room_id": room_id,
            "show_time": show_time,
            "price": "20.00",
        }),
        &admin_token(),
    )
    .await
}
