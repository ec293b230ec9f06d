#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use homestay_server::db::homes::{self, HomeFields};
use homestay_server::models::ObjectId;
use homestay_server::{create_router, db, AppState, Config};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

pub const PASSWORD: &str = "password123";

pub struct TestApp {
    pub state: AppState,
    router: Router,
    _dir: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub session_cookie: Option<String>,
}

impl TestApp {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let sqlite_path = dir.path().join("homestay.db").to_string_lossy().into_owned();
        let config = Config {
            server_port: 0,
            sqlite_path: sqlite_path.clone(),
            cors_origin: "http://localhost".into(),
            secure_cookies: false,
            rate_limit: false,
        };
        let pool = db::create_pool(&sqlite_path).expect("pool");
        let state = AppState { db: pool, config };
        let router = create_router(state.clone());
        Self {
            state,
            router,
            _dir: dir,
        }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");
        self.dispatch(request).await
    }

    pub async fn dispatch(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let session_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            body,
            session_cookie,
        }
    }

    pub async fn post(&self, uri: &str, cookie: Option<&str>, body: Option<Value>) -> TestResponse {
        self.send(Method::POST, uri, cookie, body).await
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, cookie, None).await
    }

    /// Register a user and return its session cookie (`name=value`).
    pub async fn register(&self, email: &str) -> String {
        let res = self
            .post(
                "/api/auth/register",
                None,
                Some(json!({
                    "firstName": "Test",
                    "email": email,
                    "password": PASSWORD,
                })),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "register: {}", res.body);
        res.session_cookie.expect("session cookie")
    }

    pub fn seed_home(&self, name: &str) -> ObjectId {
        let conn = self.state.db.get().expect("conn");
        homes::insert(
            &conn,
            &HomeFields {
                house_name: name.into(),
                price: 150.0,
                location: "Porto".into(),
                rating: 4.8,
                description: "Sunny flat".into(),
                photo: Some("/uploads/flat.png".into()),
            },
        )
        .expect("seed home")
        .id
    }

    pub fn stored_favourites(&self, email: &str) -> String {
        let conn = self.state.db.get().expect("conn");
        conn.query_row(
            "SELECT favourites FROM users WHERE email = ?1",
            [email],
            |row| row.get(0),
        )
        .expect("favourites")
    }

    pub fn write_raw_favourites(&self, email: &str, doc: &str) {
        let conn = self.state.db.get().expect("conn");
        conn.execute(
            "UPDATE users SET favourites = ?1 WHERE email = ?2",
            [doc, email],
        )
        .expect("write favourites");
    }
}
