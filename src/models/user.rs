//! User model for storage and session state.

use serde::{Deserialize, Serialize};

/// Registered user row from the `users` table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Row id (primary key)
    pub id: i64,
    /// Display name, used to personalize the seed prompt
    pub name: String,
    /// Login identifier, unique per row
    pub email: String,
    /// Argon2 PHC-string hash of the credential
    pub password_hash: String,
    /// Opaque versioned encoding of the conversation history
    pub conversation_blob: Vec<u8>,
    /// Optimistic-concurrency counter for conversation writes
    pub revision: i64,
    /// When the user registered (RFC 3339)
    pub created_at: String,
}

/// Authenticated identity tracked for a browser session.
///
/// Carries only the user id and display name, never credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: i64,
    pub name: String,
}
