// SPDX-License-Identifier: MIT

//! Shared test harness: in-memory app with a scriptable mock model.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use companion_chat::{
    auth::SessionStore,
    config::Config,
    conversation::Turn,
    db::Db,
    routes::create_router,
    services::{GenerativeModel, ModelError},
    AppState,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Scriptable stand-in for the external model.
pub struct MockModel {
    fail: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl MockModel {
    fn new() -> Self {
        Self {
            fail: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Make every subsequent call fail.
    #[allow(dead_code)]
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Messages sent to the model so far, in order.
    #[allow(dead_code)]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeModel for MockModel {
    async fn generate(&self, _history: &[Turn], message: &str) -> Result<String, ModelError> {
        self.calls.lock().unwrap().push(message.to_string());
        if self.fail.load(Ordering::SeqCst) {
            return Err(ModelError::RateLimited);
        }
        Ok(format!("mock reply to: {message}"))
    }
}

/// Create a test app over in-memory SQLite with a mock model client.
pub async fn create_test_app() -> (Router, Arc<AppState>, Arc<MockModel>) {
    let config = Config::test_default();
    let db = Db::connect(&config.database_url)
        .await
        .expect("Failed to open in-memory database");
    let sessions = SessionStore::new(config.session_secret.clone());
    let model = Arc::new(MockModel::new());

    let state = Arc::new(AppState {
        config,
        db,
        sessions,
        model: model.clone(),
    });

    (create_router(state.clone()), state, model)
}

/// Encode form fields as an application/x-www-form-urlencoded body.
pub fn form_body(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Issue a GET, optionally with a session cookie.
#[allow(dead_code)]
pub async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Issue a form POST, optionally with a session cookie.
pub async fn post_form(
    app: &Router,
    uri: &str,
    cookie: Option<&str>,
    fields: &[(&str, &str)],
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::from(form_body(fields))).unwrap())
        .await
        .unwrap()
}

/// Extract the `name=value` pair of the session cookie from Set-Cookie.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("companion_session="))
        .map(|value| value.split(';').next().unwrap().to_string())
}

/// Read the full response body as a string.
#[allow(dead_code)]
pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Register a user through the form endpoint.
#[allow(dead_code)]
pub async fn register(app: &Router, name: &str, email: &str, password: &str) -> Response<Body> {
    post_form(
        app,
        "/register",
        None,
        &[
            ("name", name),
            ("email", email),
            ("pswd", password),
            ("confirm_pswd", password),
        ],
    )
    .await
}

/// Log in and return the session cookie to send on later requests.
#[allow(dead_code)]
pub async fn login(app: &Router, email: &str, password: &str) -> String {
    let response = post_form(
        app,
        "/login",
        None,
        &[("email", email), ("pswd", password)],
    )
    .await;
    session_cookie(&response).expect("login should set a session cookie")
}
