// SPDX-License-Identifier: MIT

//! Companion Chat: a session-gated web chat front end.
//!
//! Persists each user's conversation history and proxies messages to an
//! external generative-language model.

pub mod auth;
pub mod chat;
pub mod config;
pub mod conversation;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod views;

use std::sync::Arc;

use auth::SessionStore;
use config::Config;
use db::Db;
use services::GenerativeModel;

/// Shared application state, injected into every handler.
pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub sessions: SessionStore,
    pub model: Arc<dyn GenerativeModel>,
}
