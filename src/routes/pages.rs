// SPDX-License-Identifier: MIT

//! Public landing page, protected menu, and health check.

use axum::{response::Html, Extension, Json};
use serde::Serialize;

use crate::models::Principal;
use crate::views;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Health check response
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Public landing page.
pub async fn home() -> Html<String> {
    Html(views::landing_page())
}

/// Protected menu page.
pub async fn choose(Extension(principal): Extension<Principal>) -> Html<String> {
    Html(views::choose_page(&principal.name))
}
