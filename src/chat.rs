// SPDX-License-Identifier: MIT

//! Chat orchestrator.
//!
//! Loads a user's stored history, forwards messages to the external
//! model, and persists updated histories through the revision-checked
//! repository. Opening a session for a user with no history goes through
//! an explicit seeding step (`NoHistory -> Seeding -> Ready`) before any
//! user-visible message is accepted.
//!
//! Persistence is all-or-nothing per turn: the model call happens first,
//! and only a successful reply triggers the single blob replacement that
//! stores both the user message and the reply.

use crate::conversation::{self, Role, Turn};
use crate::db::Db;
use crate::error::{AppError, Result};
use crate::models::User;
use crate::services::model::GenerativeModel;

/// Persona instruction sent once per fresh conversation, invisible to
/// the user. `{name}` is replaced with the user's display name.
const SEED_PROMPT_TEMPLATE: &str = "You are Baymax from Big Hero 6, talking to the client \
like a robo-human. As an assistant you try to uplift their mood, make them laugh, and \
listen to them. Do not use default messages for prohibited prompts. The client's name \
is {name}. Do not exceed 50 words per reply. Greet them warmly and with a joke as the \
first reply to hi.";

fn seed_prompt(name: &str) -> String {
    SEED_PROMPT_TEMPLATE.replace("{name}", name)
}

/// Where an opened session is in the seeding state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Stored history was empty and no seed has been sent yet.
    NoHistory,
    /// The seed prompt is being established with the model.
    Seeding,
    /// Seeded history loaded; user-visible sends are accepted.
    Ready,
}

/// One user's in-memory conversation for the duration of a request.
#[derive(Debug)]
pub struct ChatSession {
    user_id: i64,
    revision: i64,
    turns: Vec<Turn>,
    state: SessionState,
}

impl ChatSession {
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// History as the view layer should render it: everything except the
    /// hidden seed turn at index 0.
    pub fn visible_history(&self) -> &[Turn] {
        self.turns.get(1..).unwrap_or(&[])
    }
}

/// Orchestrates the load, model call, and persist cycle for one request.
pub struct ChatOrchestrator<'a> {
    db: &'a Db,
    model: &'a dyn GenerativeModel,
}

impl<'a> ChatOrchestrator<'a> {
    pub fn new(db: &'a Db, model: &'a dyn GenerativeModel) -> Self {
        Self { db, model }
    }

    /// Load and decode the user's stored history, seeding it first when
    /// empty.
    ///
    /// Seeding sends the personalized persona prompt to the model and
    /// persists the seed turn, so the returned session is always `Ready`.
    /// The model's acknowledgement of the seed is not kept; replies only
    /// enter the history in response to user-visible sends.
    pub async fn open_session(&self, user: &User) -> Result<ChatSession> {
        let turns = conversation::decode(&user.conversation_blob)?;

        let mut session = ChatSession {
            user_id: user.id,
            revision: user.revision,
            turns,
            state: SessionState::Ready,
        };

        if session.turns.is_empty() {
            session.state = SessionState::NoHistory;
            self.seed(&mut session, &user.name).await?;
        }

        Ok(session)
    }

    async fn seed(&self, session: &mut ChatSession, name: &str) -> Result<()> {
        session.state = SessionState::Seeding;
        let prompt = seed_prompt(name);

        // Establish the persona before anything user-visible happens.
        self.model.generate(&[], &prompt).await?;

        session.turns.push(Turn::new(Role::System, prompt));
        self.persist(session).await?;
        session.state = SessionState::Ready;

        tracing::debug!(user_id = session.user_id, "Conversation seeded");
        Ok(())
    }

    /// Forward a message to the model and append the exchange.
    ///
    /// On a model failure nothing is appended or persisted; the stored
    /// blob stays byte-identical to its pre-call value.
    pub async fn send(&self, session: &mut ChatSession, message: &str) -> Result<()> {
        if session.state != SessionState::Ready {
            return Err(AppError::Internal(anyhow::anyhow!(
                "send on an unseeded session"
            )));
        }

        let reply = self.model.generate(&session.turns, message).await?;

        session.turns.push(Turn::new(Role::User, message));
        session.turns.push(Turn::new(Role::Model, reply));
        self.persist(session).await
    }

    /// Reset the stored history to empty. Idempotent.
    ///
    /// The model holds no durable session of its own; history is replayed
    /// from storage on the next open, so there is nothing to tell it.
    pub async fn clear(&self, user: &User) -> Result<()> {
        let blob = conversation::encode(&[])?;
        self.db
            .update_conversation(user.id, &blob, user.revision)
            .await?;
        tracing::debug!(user_id = user.id, "Conversation cleared");
        Ok(())
    }

    async fn persist(&self, session: &mut ChatSession) -> Result<()> {
        let blob = conversation::encode(&session.turns)?;
        self.db
            .update_conversation(session.user_id, &blob, session.revision)
            .await?;
        session.revision += 1;
        Ok(())
    }
}
