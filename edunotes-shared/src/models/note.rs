/// Note model
///
/// Only the columns feedback needs are modelled here: the author, the owning
/// organization and the `likes` counter. The counter is written exclusively by
/// [`ReputationEngine::give_feedback`](crate::reputation::ReputationEngine::give_feedback).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

/// Note row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Note {
    pub note_id: i64,
    pub title: String,
    pub content: Option<String>,

    /// Author
    pub user_id: i64,

    pub organization_id: i64,

    /// Likes minus dislikes
    pub likes: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a note
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNote {
    pub title: String,
    pub content: Option<String>,
    pub user_id: i64,
    pub organization_id: i64,
}

impl Note {
    /// Inserts a note with zero likes
    pub async fn create(executor: impl PgExecutor<'_>, data: CreateNote) -> Result<Self, sqlx::Error> {
        let note = sqlx::query_as::<_, Note>(
            r#"
            INSERT INTO notes (title, content, user_id, organization_id)
            VALUES ($1, $2, $3, $4)
            RETURNING note_id, title, content, user_id, organization_id, likes,
                      created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.content)
        .bind(data.user_id)
        .bind(data.organization_id)
        .fetch_one(executor)
        .await?;

        Ok(note)
    }

    /// Finds a note by ID
    pub async fn find_by_id(executor: impl PgExecutor<'_>, note_id: i64) -> Result<Option<Self>, sqlx::Error> {
        let note = sqlx::query_as::<_, Note>(
            r#"
            SELECT note_id, title, content, user_id, organization_id, likes,
                   created_at, updated_at
            FROM notes
            WHERE note_id = $1
            "#,
        )
        .bind(note_id)
        .fetch_optional(executor)
        .await?;

        Ok(note)
    }
}
