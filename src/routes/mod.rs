// SPDX-License-Identifier: MIT

//! HTTP route handlers.

pub mod auth;
pub mod chat;
pub mod pages;

use crate::middleware::auth::require_auth;
use crate::AppState;
use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // Public routes (no session required)
    let public_routes = Router::new()
        .route("/", get(pages::home))
        .route("/health", get(pages::health))
        .merge(auth::routes());

    // Protected routes (session required)
    let protected_routes = Router::new()
        .route("/choose", get(pages::choose))
        .route("/logout", get(auth::logout))
        .merge(chat::routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn(
            crate::middleware::security::add_security_headers,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
