// SPDX-License-Identifier: MIT

//! Chatbox flow tests: seeding, sending, clearing, and model failures.

use axum::http::{header, StatusCode};
use companion_chat::conversation::{self, Role};

mod common;

async fn logged_in_app() -> (
    axum::Router,
    std::sync::Arc<companion_chat::AppState>,
    std::sync::Arc<common::MockModel>,
    String,
) {
    let (app, state, model) = common::create_test_app().await;
    common::register(&app, "Alice", "a@x.com", "pw123").await;
    let cookie = common::login(&app, "a@x.com", "pw123").await;
    (app, state, model, cookie)
}

async fn stored_turns(
    state: &companion_chat::AppState,
    email: &str,
) -> Vec<conversation::Turn> {
    let user = state.db.find_by_email(email).await.unwrap().unwrap();
    conversation::decode(&user.conversation_blob).unwrap()
}

#[tokio::test]
async fn test_first_visit_seeds_invisibly() {
    let (app, state, model, cookie) = logged_in_app().await;

    let response = common::get(&app, "/chatbox", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    // The seed went to the model, personalized with the display name.
    let calls = model.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].contains("Alice"));

    // Rendered history is empty; the seed text never reaches the page.
    let body = common::body_string(response).await;
    assert!(!body.contains("Baymax"));
    assert!(!body.contains("<li>"));

    // Stored history holds exactly the hidden seed turn.
    let turns = stored_turns(&state, "a@x.com").await;
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].role, Role::System);
}

#[tokio::test]
async fn test_second_visit_does_not_reseed() {
    let (app, _, model, cookie) = logged_in_app().await;

    common::get(&app, "/chatbox", Some(&cookie)).await;
    common::get(&app, "/chatbox", Some(&cookie)).await;

    assert_eq!(model.calls().len(), 1);
}

#[tokio::test]
async fn test_send_appends_two_turns_and_redirects() {
    let (app, state, _, cookie) = logged_in_app().await;
    common::get(&app, "/chatbox", Some(&cookie)).await; // seed

    let response =
        common::post_form(&app, "/chatbox", Some(&cookie), &[("msg", "hello")]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/chatbox"
    );

    let turns = stored_turns(&state, "a@x.com").await;
    assert_eq!(turns.len(), 3); // seed + user + reply
    assert_eq!(turns[1].role, Role::User);
    assert_eq!(turns[1].text, "hello");
    assert_eq!(turns[2].role, Role::Model);
    assert_eq!(turns[2].text, "mock reply to: hello");

    // The follow-up GET renders both visible turns.
    let response = common::get(&app, "/chatbox", Some(&cookie)).await;
    let body = common::body_string(response).await;
    assert!(body.contains("hello"));
    assert!(body.contains("mock reply to: hello"));
}

#[tokio::test]
async fn test_send_on_fresh_history_seeds_first() {
    let (app, state, model, cookie) = logged_in_app().await;

    // POST without a prior GET: seeding still happens before the send.
    let response =
        common::post_form(&app, "/chatbox", Some(&cookie), &[("msg", "hello")]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    assert_eq!(model.calls().len(), 2); // seed, then the message
    let turns = stored_turns(&state, "a@x.com").await;
    assert_eq!(turns.len(), 3);
}

#[tokio::test]
async fn test_clear_resets_history_and_redirects() {
    let (app, state, _, cookie) = logged_in_app().await;
    common::get(&app, "/chatbox", Some(&cookie)).await;
    common::post_form(&app, "/chatbox", Some(&cookie), &[("msg", "hello")]).await;

    let response =
        common::post_form(&app, "/chatbox", Some(&cookie), &[("msg", "clear")]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/chatbox"
    );

    assert!(stored_turns(&state, "a@x.com").await.is_empty());
}

#[tokio::test]
async fn test_clear_twice_is_idempotent() {
    let (app, state, _, cookie) = logged_in_app().await;
    common::get(&app, "/chatbox", Some(&cookie)).await;

    common::post_form(&app, "/chatbox", Some(&cookie), &[("msg", "clear")]).await;
    let response =
        common::post_form(&app, "/chatbox", Some(&cookie), &[("msg", "clear")]).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(stored_turns(&state, "a@x.com").await.is_empty());
}

#[tokio::test]
async fn test_failed_model_call_leaves_blob_unchanged() {
    let (app, state, model, cookie) = logged_in_app().await;
    common::get(&app, "/chatbox", Some(&cookie)).await; // seed

    let before = state
        .db
        .find_by_email("a@x.com")
        .await
        .unwrap()
        .unwrap()
        .conversation_blob;

    model.set_fail(true);
    let response =
        common::post_form(&app, "/chatbox", Some(&cookie), &[("msg", "hello")]).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let after = state
        .db
        .find_by_email("a@x.com")
        .await
        .unwrap()
        .unwrap()
        .conversation_blob;
    assert_eq!(before, after);

    // Recovery: the process keeps serving and a retry succeeds.
    model.set_fail(false);
    let response =
        common::post_form(&app, "/chatbox", Some(&cookie), &[("msg", "hello")]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(stored_turns(&state, "a@x.com").await.len(), 3);
}

#[tokio::test]
async fn test_empty_message_is_ignored() {
    let (app, _, model, cookie) = logged_in_app().await;
    common::get(&app, "/chatbox", Some(&cookie)).await; // seed

    let response =
        common::post_form(&app, "/chatbox", Some(&cookie), &[("msg", "   ")]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(model.calls().len(), 1); // nothing beyond the seed
}

#[tokio::test]
async fn test_histories_are_private_per_user() {
    let (app, state, _, cookie_alice) = logged_in_app().await;
    common::register(&app, "Bob", "b@x.com", "pw456").await;
    let cookie_bob = common::login(&app, "b@x.com", "pw456").await;

    common::get(&app, "/chatbox", Some(&cookie_alice)).await;
    common::post_form(&app, "/chatbox", Some(&cookie_alice), &[("msg", "alice secret")]).await;

    let response = common::get(&app, "/chatbox", Some(&cookie_bob)).await;
    let body = common::body_string(response).await;
    assert!(!body.contains("alice secret"));

    let bob_turns = stored_turns(&state, "b@x.com").await;
    assert_eq!(bob_turns.len(), 1); // just Bob's own seed
}
