// SPDX-License-Identifier: MIT

//! Conversation history codec.
//!
//! A user's history is stored as one opaque blob in the `users` table.
//! The payload is a versioned document so the stored format can evolve
//! without silently misparsing old rows.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Current encoding version written by [`encode`].
pub const CODEC_VERSION: u32 = 1;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Hidden persona instruction, always the first turn of a seeded history.
    System,
    User,
    Model,
}

/// One message exchange unit in a conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Versioned on-disk representation of a turn sequence.
#[derive(Serialize, Deserialize)]
struct ConversationDoc {
    version: u32,
    turns: Vec<Turn>,
}

/// Encode an ordered turn sequence into the stored blob format.
pub fn encode(turns: &[Turn]) -> Result<Vec<u8>, AppError> {
    let doc = ConversationDoc {
        version: CODEC_VERSION,
        turns: turns.to_vec(),
    };
    serde_json::to_vec(&doc)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("encode conversation: {}", e)))
}

/// Decode a stored blob back into an ordered turn sequence.
///
/// An empty blob is the registration-time state and decodes as an empty
/// history. Unknown versions are rejected rather than guessed at.
pub fn decode(blob: &[u8]) -> Result<Vec<Turn>, AppError> {
    if blob.is_empty() {
        return Ok(Vec::new());
    }

    let doc: ConversationDoc = serde_json::from_slice(blob)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("decode conversation: {}", e)))?;

    if doc.version != CODEC_VERSION {
        return Err(AppError::Internal(anyhow::anyhow!(
            "unsupported conversation encoding version {}",
            doc.version
        )));
    }

    Ok(doc.turns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_history() -> Vec<Turn> {
        vec![
            Turn::new(Role::System, "You are a helpful companion."),
            Turn::new(Role::User, "hi"),
            Turn::new(Role::Model, "Hello! How can I help?"),
        ]
    }

    #[test]
    fn test_round_trip() {
        let history = sample_history();
        let blob = encode(&history).unwrap();
        let decoded = decode(&blob).unwrap();
        assert_eq!(decoded, history);
    }

    #[test]
    fn test_empty_history_round_trip() {
        let blob = encode(&[]).unwrap();
        assert_eq!(decode(&blob).unwrap(), Vec::<Turn>::new());
    }

    #[test]
    fn test_empty_blob_decodes_as_empty_history() {
        assert_eq!(decode(b"").unwrap(), Vec::<Turn>::new());
    }

    #[test]
    fn test_unknown_version_rejected() {
        let blob = serde_json::to_vec(&serde_json::json!({
            "version": 99,
            "turns": []
        }))
        .unwrap();
        assert!(decode(&blob).is_err());
    }

    #[test]
    fn test_garbage_blob_rejected() {
        assert!(decode(b"not json at all").is_err());
    }

    #[test]
    fn test_turn_text_survives_unicode() {
        let history = vec![Turn::new(Role::User, "héllo 世界 \"quotes\" \n newline")];
        let blob = encode(&history).unwrap();
        assert_eq!(decode(&blob).unwrap(), history);
    }
}
