// SPDX-License-Identifier: MIT

//! Application error types with consistent HTTP responses.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::services::model::ModelError;
use crate::views;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("An account with this email already exists")]
    DuplicateEmail,

    /// One message for unknown email and wrong password alike, so the
    /// login form cannot be used to enumerate accounts.
    #[error("Invalid email or password")]
    AuthenticationFailed,

    #[error("Authentication required")]
    NotAuthenticated,

    #[error("Conversation was modified concurrently")]
    Conflict,

    #[error("Model API error: {0}")]
    Model(#[from] ModelError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::DuplicateEmail => (StatusCode::CONFLICT, self.to_string()),
            AppError::AuthenticationFailed => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::NotAuthenticated => {
                // Protected route without a session: redirect, not an error page.
                return Redirect::to("/login").into_response();
            }
            AppError::Conflict => (
                StatusCode::CONFLICT,
                "Your conversation changed in another tab. Please try again.".to_string(),
            ),
            AppError::Model(err) => {
                tracing::warn!(error = %err, "Model API call failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "The companion is unavailable right now. Please try again.".to_string(),
                )
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong. Please try again.".to_string(),
                )
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong. Please try again.".to_string(),
                )
            }
        };

        (status, Html(views::error_page(&message))).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
