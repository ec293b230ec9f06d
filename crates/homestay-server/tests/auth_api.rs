mod common;

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, Method, Request, StatusCode};
use common::{TestApp, PASSWORD};
use serde_json::json;

#[tokio::test]
async fn register_login_me_logout() {
    let app = TestApp::new();
    let first = app.register("Mia@Example.com").await;

    let res = app.get("/api/auth/me", Some(&first)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["email"], "mia@example.com");
    assert_eq!(res.body["userType"], "guest");
    assert_eq!(res.body["favourites"], json!([]));
    assert!(res.body.get("passwordHash").is_none());

    let res = app
        .post(
            "/api/auth/login",
            None,
            Some(json!({ "email": "mia@example.com", "password": PASSWORD })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let second = res.session_cookie.expect("cookie");

    let res = app.post("/api/auth/logout", Some(&second), None).await;
    assert_eq!(res.body, json!({ "ok": true }));
    assert_eq!(app.get("/api/auth/me", Some(&second)).await.status, StatusCode::UNAUTHORIZED);
    // Other sessions survive.
    assert_eq!(app.get("/api/auth/me", Some(&first)).await.status, StatusCode::OK);
}

#[tokio::test]
async fn wrong_credentials_are_unauthorized() {
    let app = TestApp::new();
    app.register("mia@example.com").await;

    for (email, password) in [("mia@example.com", "wrong-password"), ("who@example.com", PASSWORD)] {
        let res = app
            .post("/api/auth/login", None, Some(json!({ "email": email, "password": password })))
            .await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let app = TestApp::new();
    app.register("mia@example.com").await;
    let res = app
        .post(
            "/api/auth/register",
            None,
            Some(json!({ "firstName": "Mia", "email": "mia@example.com", "password": PASSWORD })),
        )
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn registration_validates_input() {
    let app = TestApp::new();
    let cases = [
        json!({ "firstName": "Mia", "email": "no-at-sign", "password": PASSWORD }),
        json!({ "firstName": "", "email": "mia@example.com", "password": PASSWORD }),
        json!({ "firstName": "Mia", "email": "mia@example.com", "password": "short" }),
    ];
    for body in cases {
        let res = app.post("/api/auth/register", None, Some(body)).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
    }

    let res = app
        .post(
            "/api/auth/register",
            None,
            Some(json!({
                "firstName": "Hal",
                "email": "hal@example.com",
                "password": PASSWORD,
                "userType": "host"
            })),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["userType"], "host");
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new();
    let res = app.get("/health", None).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn sessions_record_peer_address_and_user_agent() {
    let app = TestApp::new();
    app.register("mia@example.com").await;

    let peer: SocketAddr = "203.0.113.7:52100".parse().unwrap();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::USER_AGENT, "homestay-test/1.0")
        .extension(ConnectInfo(peer))
        .body(Body::from(
            json!({ "email": "mia@example.com", "password": PASSWORD }).to_string(),
        ))
        .unwrap();
    let res = app.dispatch(request).await;
    assert_eq!(res.status, StatusCode::OK);

    let token = res.session_cookie.unwrap();
    let token = token.split_once('=').unwrap().1.to_string();
    let conn = app.state.db.get().unwrap();
    let (ip, agent): (Option<String>, Option<String>) = conn
        .query_row(
            "SELECT ip_address, user_agent FROM sessions WHERE token = ?1",
            [&token],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(ip.as_deref(), Some("203.0.113.7"));
    assert_eq!(agent.as_deref(), Some("homestay-test/1.0"));
}

#[tokio::test]
async fn sessions_without_client_details_store_nulls() {
    let app = TestApp::new();
    app.register("mia@example.com").await;

    let conn = app.state.db.get().unwrap();
    let (ip, agent): (Option<String>, Option<String>) = conn
        .query_row("SELECT ip_address, user_agent FROM sessions", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .unwrap();
    assert_eq!((ip, agent), (None, None));
}
