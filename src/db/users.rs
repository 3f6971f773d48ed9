// SPDX-License-Identifier: MIT

//! User repository: CRUD over the `users` table.

use chrono::Utc;

use crate::conversation;
use crate::db::Db;
use crate::error::AppError;
use crate::models::User;

impl Db {
    /// Look up a user by login email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, conversation_blob, revision, created_at \
             FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(self.pool())
        .await?;
        Ok(user)
    }

    /// Look up a user by row id.
    ///
    /// Absence is the caller's problem to handle; it is distinct from an
    /// authentication failure.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, conversation_blob, revision, created_at \
             FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(user)
    }

    /// Create a user with an empty conversation history.
    ///
    /// The UNIQUE constraint on email is the duplicate check; a violation
    /// maps to [`AppError::DuplicateEmail`] and leaves the table unchanged.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, AppError> {
        let empty_blob = conversation::encode(&[])?;
        let created_at = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO users (name, email, password_hash, conversation_blob, revision, created_at) \
             VALUES (?, ?, ?, ?, 0, ?)",
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(&empty_blob)
        .bind(&created_at)
        .execute(self.pool())
        .await;

        let result = match result {
            Ok(r) => r,
            Err(e) => {
                if e.as_database_error()
                    .is_some_and(|db_err| db_err.is_unique_violation())
                {
                    return Err(AppError::DuplicateEmail);
                }
                return Err(e.into());
            }
        };

        Ok(User {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            conversation_blob: empty_blob,
            revision: 0,
            created_at,
        })
    }

    /// Replace a user's stored conversation, guarded by a revision check.
    ///
    /// Two concurrent writers cannot both commit against the same
    /// revision; the loser gets [`AppError::Conflict`] and the stored
    /// history stays whole.
    pub async fn update_conversation(
        &self,
        id: i64,
        blob: &[u8],
        expected_revision: i64,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE users SET conversation_blob = ?, revision = revision + 1 \
             WHERE id = ? AND revision = ?",
        )
        .bind(blob)
        .bind(id)
        .bind(expected_revision)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict);
        }
        Ok(())
    }
}
