/// Note feedback (like/dislike) records
///
/// # Schema
///
/// ```sql
/// CREATE TYPE feedback_type AS ENUM ('like', 'dislike');
///
/// CREATE TABLE note_feedback (
///     feedback_id BIGSERIAL PRIMARY KEY,
///     note_id BIGINT NOT NULL REFERENCES notes ON DELETE CASCADE,
///     user_id BIGINT NOT NULL REFERENCES users ON DELETE CASCADE,
///     feedback_type feedback_type NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT note_feedback_note_user_key UNIQUE (note_id, user_id)
/// );
/// ```
///
/// A user gives feedback on a note at most once, ever. Rows are never updated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use std::fmt;

/// Kind of feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "feedback_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FeedbackType {
    Like,
    Dislike,
}

impl FeedbackType {
    /// Change applied to both the note's likes and the author's score
    pub fn delta(&self) -> i32 {
        match self {
            FeedbackType::Like => 1,
            FeedbackType::Dislike => -1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackType::Like => "like",
            FeedbackType::Dislike => "dislike",
        }
    }
}

impl fmt::Display for FeedbackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Feedback row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct NoteFeedback {
    pub feedback_id: i64,
    pub note_id: i64,
    pub user_id: i64,
    pub feedback_type: FeedbackType,
    pub created_at: DateTime<Utc>,
}

impl NoteFeedback {
    /// Finds the feedback a user gave on a note
    pub async fn find(
        executor: impl PgExecutor<'_>,
        note_id: i64,
        user_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let feedback = sqlx::query_as::<_, NoteFeedback>(
            r#"
            SELECT feedback_id, note_id, user_id, feedback_type, created_at
            FROM note_feedback
            WHERE note_id = $1 AND user_id = $2
            "#,
        )
        .bind(note_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(feedback)
    }

    /// Inserts feedback unless the pair already has some
    ///
    /// # Returns
    ///
    /// The new row, or `None` if `note_feedback_note_user_key` already holds
    /// a row for the pair. A concurrent insert of the same pair waits for the
    /// other transaction and then returns `None` if it committed.
    pub async fn insert_if_absent(
        executor: impl PgExecutor<'_>,
        note_id: i64,
        user_id: i64,
        feedback_type: FeedbackType,
    ) -> Result<Option<Self>, sqlx::Error> {
        let feedback = sqlx::query_as::<_, NoteFeedback>(
            r#"
            INSERT INTO note_feedback (note_id, user_id, feedback_type)
            VALUES ($1, $2, $3)
            ON CONFLICT ON CONSTRAINT note_feedback_note_user_key DO NOTHING
            RETURNING feedback_id, note_id, user_id, feedback_type, created_at
            "#,
        )
        .bind(note_id)
        .bind(user_id)
        .bind(feedback_type)
        .fetch_optional(executor)
        .await?;

        Ok(feedback)
    }

    /// Counts feedback rows on a note
    pub async fn count_for_note(executor: impl PgExecutor<'_>, note_id: i64) -> Result<i64, sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM note_feedback WHERE note_id = $1")
            .bind(note_id)
            .fetch_one(executor)
            .await?;

        Ok(count)
    }
}
