// SPDX-License-Identifier: MIT

//! Chatbox routes.

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Extension, Form, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::chat::ChatOrchestrator;
use crate::error::{AppError, Result};
use crate::models::{Principal, User};
use crate::views;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/chatbox", get(chatbox_page).post(chatbox_submit))
}

#[derive(Debug, Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    msg: String,
}

/// A session principal whose row has vanished gets bounced back through
/// login rather than a server error.
async fn load_user(state: &AppState, principal: &Principal) -> Result<User> {
    state
        .db
        .find_by_id(principal.user_id)
        .await?
        .ok_or(AppError::NotAuthenticated)
}

/// Render the visible history, seeding a fresh conversation first.
async fn chatbox_page(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Html<String>> {
    let user = load_user(&state, &principal).await?;
    let orchestrator = ChatOrchestrator::new(&state.db, state.model.as_ref());
    let session = orchestrator.open_session(&user).await?;

    Ok(Html(views::chatbox_page(
        &user.name,
        session.visible_history(),
    )))
}

/// Handle a chat form post: `clear` resets the history, any other
/// non-empty value is sent to the model. Both redirect back to the
/// chatbox so a refresh never resends (redirect-after-post).
async fn chatbox_submit(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Form(form): Form<ChatForm>,
) -> Result<Response> {
    let message = form.msg.trim();
    if message.is_empty() {
        return Ok(Redirect::to("/chatbox").into_response());
    }

    let user = load_user(&state, &principal).await?;
    let orchestrator = ChatOrchestrator::new(&state.db, state.model.as_ref());

    if message == "clear" {
        orchestrator.clear(&user).await?;
    } else {
        let mut session = orchestrator.open_session(&user).await?;
        orchestrator.send(&mut session, message).await?;
    }

    Ok(Redirect::to("/chatbox").into_response())
}
