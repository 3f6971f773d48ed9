// SPDX-License-Identifier: MIT

//! Login, registration, and logout routes.

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::session::SESSION_COOKIE;
use crate::error::{AppError, Result};
use crate::middleware::auth::current_principal;
use crate::models::Principal;
use crate::views;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", get(login_page).post(login_submit))
        .route("/register", get(register_page).post(register_submit))
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "Email is required"))]
    email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pswd: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "Name is required"))]
    name: String,
    #[serde(default)]
    #[validate(email(message = "A valid email is required"))]
    email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pswd: String,
    #[serde(default)]
    #[validate(must_match(other = "pswd", message = "Passwords must match"))]
    confirm_pswd: String,
}

/// Flatten validator output into one user-visible message.
fn first_validation_message(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .filter_map(|err| err.message.as_ref())
        .map(|msg| msg.to_string())
        .next()
        .unwrap_or_else(|| "Invalid input".to_string())
}

/// Render the login form; authenticated visitors go straight to the menu.
async fn login_page(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    if current_principal(&state, &jar).is_some() {
        return Redirect::to("/choose").into_response();
    }
    Html(views::login_page(None)).into_response()
}

/// Verify credentials and establish a session.
///
/// Unknown email and wrong password get the same generic message, so the
/// form cannot be used to probe which emails are registered.
async fn login_submit(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    if let Err(errors) = form.validate() {
        let message = first_validation_message(&errors);
        return Ok(Html(views::login_page(Some(&message))).into_response());
    }

    let user = match state.db.find_by_email(&form.email).await? {
        Some(user) if verify_password(&form.pswd, &user.password_hash) => user,
        // Unknown email and wrong password fall through together.
        _ => {
            tracing::info!(email = %form.email, "Failed login attempt");
            let message = AppError::AuthenticationFailed.to_string();
            return Ok(Html(views::login_page(Some(&message))).into_response());
        }
    };
    let cookie_value = state.sessions.insert(Principal {
        user_id: user.id,
        name: user.name.clone(),
    });

    let cookie = Cookie::build((SESSION_COOKIE, cookie_value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    tracing::info!(user_id = user.id, "User logged in");
    Ok((jar.add(cookie), Redirect::to("/choose")).into_response())
}

/// Render the registration form.
async fn register_page() -> Html<String> {
    Html(views::register_page(None))
}

/// Create a user with a hashed credential and an empty history.
async fn register_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    if let Err(errors) = form.validate() {
        let message = first_validation_message(&errors);
        return Ok(Html(views::register_page(Some(&message))).into_response());
    }

    let password_hash = hash_password(&form.pswd)?;

    match state
        .db
        .create_user(&form.name, &form.email, &password_hash)
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = user.id, "User registered");
            Ok(Redirect::to("/login").into_response())
        }
        Err(AppError::DuplicateEmail) => {
            let message = AppError::DuplicateEmail.to_string();
            Ok(Html(views::register_page(Some(&message))).into_response())
        }
        Err(err) => Err(err),
    }
}

/// Tear down the session and return to the landing page.
pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.remove(cookie.value());
    }

    let mut removal = Cookie::from(SESSION_COOKIE);
    removal.set_path("/");

    (jar.remove(removal), Redirect::to("/")).into_response()
}
