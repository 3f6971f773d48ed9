// SPDX-License-Identifier: MIT

//! Session authentication middleware.

use crate::auth::session::SESSION_COOKIE;
use crate::models::Principal;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Gate protected routes on an authenticated session.
///
/// A valid session cookie puts the [`Principal`] into request extensions
/// for handlers to extract; anything else redirects to the login entry
/// point instead of erroring.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, Redirect> {
    let principal = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| state.sessions.get(cookie.value()))
        .ok_or_else(|| Redirect::to("/login"))?;

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

/// Resolve the session principal for a public route, if any.
///
/// Public pages like `/login` use this to bounce already-authenticated
/// visitors onward.
pub fn current_principal(state: &AppState, jar: &CookieJar) -> Option<Principal> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| state.sessions.get(cookie.value()))
}
