//! HTTP-level tests: routing, extractors, status codes and JSON shapes.

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{account, state, store, PASSWORD};
use rateboard_api::build_router;
use rateboard_core::Role;

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn post(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn login(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        post(
            "/api/auth/login",
            None,
            json!({ "email": email, "password": PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_banner_and_health() {
    let app = build_router(state().await);

    let (status, body) = send(&app, get("/", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    let (status, body) = send(&app, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_signup_login_rate_list_flow() {
    let state = state().await;
    let shop = store(&state, "Fresh Mart", None).await;
    let app = build_router(state);

    let (status, body) = send(
        &app,
        post(
            "/api/auth/signup",
            None,
            json!({
                "name": "Normal User Sample XXX YYY",
                "email": "user@demo.com",
                "address": "User Address",
                "password": "User@1234"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["email"], "user@demo.com");

    let (status, body) = send(
        &app,
        post(
            "/api/auth/login",
            None,
            json!({ "email": "user@demo.com", "password": "User@1234" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "USER");
    let token = body["token"].as_str().unwrap().to_string();

    let uri = format!("/api/stores/{}/rate", shop.id);
    let (status, body) = send(&app, post(&uri, Some(&token), json!({ "rating": 4 }))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body, json!({ "ok": true, "rating": 4 }));

    let (status, body) = send(&app, get("/api/stores?q=fresh", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["overallRating"], 4.0);
    assert_eq!(body["items"][0]["myRating"], 4);

    let (status, body) = send(&app, get("/api/stores", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["myRating"], Value::Null);
}

#[tokio::test]
async fn test_error_bodies_carry_code_and_message() {
    let state = state().await;
    account(&state, "taken@example.com", Role::User).await;
    let shop = store(&state, "Fresh Mart", None).await;
    let app = build_router(state);

    let (status, body) = send(
        &app,
        post(
            "/api/auth/signup",
            None,
            json!({
                "name": "Someone Else Entirely Here",
                "email": "TAKEN@example.com",
                "password": "User@1234"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
    assert!(body["message"].is_string());

    let (status, body) = send(&app, post("/api/auth/signup", None, json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = send(
        &app,
        post(
            "/api/auth/login",
            None,
            json!({ "email": "taken@example.com", "password": "Nope@nope1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_CREDENTIALS");

    let uri = format!("/api/stores/{}/rate", shop.id);
    let (status, body) = send(&app, post(&uri, None, json!({ "rating": 4 }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_malformed_json_is_a_validation_error() {
    let app = build_router(state().await);

    let request = Request::post("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_bad_bearer_token_is_rejected_even_on_public_listing() {
    let app = build_router(state().await);

    let (status, body) = send(&app, get("/api/stores", Some("not-a-jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let request = Request::get("/api/stores")
        .header(header::AUTHORIZATION, "Basic abc")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_role_gates_on_admin_and_owner_routes() {
    let state = state().await;
    account(&state, "user@example.com", Role::User).await;
    account(&state, "owner@example.com", Role::Owner).await;
    account(&state, "admin@example.com", Role::Admin).await;
    let app = build_router(state);

    let user = login(&app, "user@example.com").await;
    let owner = login(&app, "owner@example.com").await;
    let admin = login(&app, "admin@example.com").await;

    let (status, _) = send(&app, get("/api/owner/dashboard", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, body) = send(&app, get("/api/owner/dashboard", Some(&user))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
    let (status, body) = send(&app, get("/api/owner/dashboard", Some(&owner))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stores"], json!([]));

    let (status, _) = send(&app, get("/api/admin/stats", Some(&owner))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = send(&app, get("/api/admin/stats", Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "users": 3, "stores": 0, "ratings": 0 }));
}

#[tokio::test]
async fn test_admin_routes_create_and_list() {
    let state = state().await;
    account(&state, "admin@example.com", Role::Admin).await;
    let app = build_router(state);
    let admin = login(&app, "admin@example.com").await;

    let (status, created) = send(
        &app,
        post(
            "/api/admin/users",
            Some(&admin),
            json!({
                "name": "Store Owner Example QQQ RRR",
                "email": "owner@demo.com",
                "password": "Owner@123",
                "role": "OWNER"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{created}");
    assert_eq!(created["role"], "OWNER");
    let owner_id = created["id"].as_str().unwrap().to_string();

    let (status, store) = send(
        &app,
        post(
            "/api/admin/stores",
            Some(&admin),
            json!({
                "name": "Tech Hub",
                "email": "tech@store.com",
                "address": "42 Silicon Road",
                "ownerId": owner_id
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{store}");
    assert_eq!(store["ownerId"], owner_id.as_str());

    let (status, body) = send(&app, get("/api/admin/stores?sortBy=name", Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["ratingCount"], 0);
    assert_eq!(body["items"][0]["rating"], Value::Null);

    let (status, body) = send(&app, get("/api/admin/users?role=OWNER", Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);

    let (status, body) = send(
        &app,
        get(&format!("/api/admin/users/{owner_id}"), Some(&admin)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ownerRatings"]["stores"][0]["name"], "Tech Hub");

    let (status, body) = send(&app, get("/api/admin/users?sortBy=passwordHash", Some(&admin))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_change_password_route() {
    let state = state().await;
    account(&state, "user@example.com", Role::User).await;
    let app = build_router(state);
    let token = login(&app, "user@example.com").await;

    let (status, body) = send(
        &app,
        post(
            "/api/auth/change-password",
            Some(&token),
            json!({ "newPassword": "Brand@new1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));

    let (status, _) = send(
        &app,
        post(
            "/api/auth/login",
            None,
            json!({ "email": "user@example.com", "password": "Brand@new1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
