//! Integration tests for registration, login and route guards.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use common::spawn_app;
use serde_json::json;

#[tokio::test]
async fn test_register_returns_token_and_member_profile() {
    let app = spawn_app().await;

    let (status, body) = app
        .send_json(
            "POST",
            "/api/auth/register",
            None,
            &json!({
                "name": "  Jane Doe ",
                "email": "Jane@Example.com",
                "password": "secret123",
                "phone": "5550001111",
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["name"], "Jane Doe");
    assert_eq!(body["user"]["email"], "jane@example.com");
    assert_eq!(body["user"]["role"], "user");
    assert!(body["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_duplicate_registration_is_rejected() {
    let app = spawn_app().await;
    app.register_member("Jane Doe", "jane@example.com").await;

    let (status, body) = app
        .send_json(
            "POST",
            "/api/auth/register",
            None,
            &json!({
                "name": "Other Jane",
                "email": "JANE@example.com",
                "password": "secret123",
                "phone": "5550001111",
            }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "success": false, "message": "User already exists" }));
}

#[tokio::test]
async fn test_register_validates_fields() {
    let app = spawn_app().await;

    let cases = [
        json!({ "name": "J", "email": "j@example.com", "password": "secret123", "phone": "5550001111" }),
        json!({ "name": "Jane", "email": "not-an-email", "password": "secret123", "phone": "5550001111" }),
        json!({ "name": "Jane", "email": "j@example.com", "password": "123", "phone": "5550001111" }),
        json!({ "name": "Jane", "email": "j@example.com", "password": "secret123", "phone": "555-0001" }),
    ];

    for case in cases {
        let (status, body) = app
            .send_json("POST", "/api/auth/register", None, &case)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {case}");
        assert_eq!(body["success"], false);
    }
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let app = spawn_app().await;
    app.register_member("Jane Doe", "jane@example.com").await;

    let (status, body) = app
        .send_json(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "email": "jane@example.com", "password": "wrong-password" }),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");

    let (status, _) = app
        .send_json(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "email": "nobody@example.com", "password": "secret123" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_rejects_malformed_email() {
    let app = spawn_app().await;

    let (status, body) = app
        .send_json(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "email": "admin", "password": "admin123" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please include a valid email");
}

#[tokio::test]
async fn test_unparseable_body_gets_error_envelope() {
    let app = spawn_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/register")
        .body(Body::from(r#"{"email":"jane@example.com"}"#))
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_seeded_admin_can_log_in() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    let (status, body) = app.get("/api/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "admin@gym.com");
    assert_eq!(body["data"]["role"], "admin");
    assert_eq!(body["data"]["membershipType"], "Staff");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = spawn_app().await;

    let (status, body) = app.get("/api/auth/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authorized, no token");

    let (status, body) = app.get("/api/auth/me", Some("not.a.jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authorized, token failed");

    let (status, _) = app.get("/api/notifications", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_forbid_members() {
    let app = spawn_app().await;
    let (token, _) = app.register_member("Jane Doe", "jane@example.com").await;

    for uri in ["/api/admin/stats", "/api/claims", "/api/metrics"] {
        let (status, body) = app.get(uri, Some(&token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(body["message"], "Not authorized as an admin");
    }

    let (status, _) = app.delete("/api/items/1", &token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
