/// Reputation engine: feedback, score and rank
///
/// A user's score is the net feedback received on the notes they authored,
/// plus any operator adjustments. Rank is derived from score (see [`rank`])
/// and rewritten in the same transaction as every score change. This module
/// is the only writer of `users.score`, `users.rank` and `notes.likes`.
///
/// # Feedback
///
/// [`ReputationEngine::give_feedback`] runs as one transaction:
///
/// 1. Reject if the caller already gave feedback on the note
/// 2. Adjust `notes.likes` by the feedback delta, locking the note row
/// 3. Insert the feedback row (`ON CONFLICT DO NOTHING`)
/// 4. Adjust the author's score and rewrite their rank
///
/// The note row lock serializes concurrent feedback on the same note, so
/// counter increments are never lost. Two concurrent calls for the same
/// `(note, user)` pair meet at step 3: exactly one inserts, the other rolls
/// back with `Conflict`.
///
/// # Example
///
/// ```no_run
/// use edunotes_shared::models::feedback::FeedbackType;
/// use edunotes_shared::reputation::{ReputationEngine, ScoreAdjustment};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let engine = ReputationEngine::new(pool);
///
/// let outcome = engine.give_feedback(10, 2, FeedbackType::Like).await?;
/// println!("author now at {} ({})", outcome.author_score, outcome.author_rank);
///
/// engine.adjust_score_direct(3, ScoreAdjustment::Increase).await?;
/// # Ok(())
/// # }
/// ```

pub mod rank;

pub use rank::Rank;

use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use tracing::{debug, info};

use crate::error::{is_foreign_key_violation, DomainError, DomainResult};
use crate::models::feedback::{FeedbackType, NoteFeedback};
use crate::models::user::{RankingEntry, User};

pub const ALREADY_GAVE_FEEDBACK: &str = "You have already like/disliked this note";
pub const NOTE_NOT_FOUND: &str = "Note not found";
pub const USER_NOT_FOUND: &str = "User not found";
pub const NO_USERS: &str = "No users found";

/// Result of a successful feedback event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackOutcome {
    /// Note's likes after the event
    pub likes: i32,

    /// Author's score after the event
    pub author_score: i32,

    /// Author's rank after the event
    pub author_rank: Rank,
}

/// Direction of an operator score adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreAdjustment {
    Increase,
    Decrease,
}

impl ScoreAdjustment {
    pub fn delta(&self) -> i32 {
        match self {
            ScoreAdjustment::Increase => 1,
            ScoreAdjustment::Decrease => -1,
        }
    }
}

/// Result of an operator score adjustment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreChange {
    pub username: String,
    pub new_score: i32,
    pub current_rank: Rank,
}

/// Reputation engine service
#[derive(Debug, Clone)]
pub struct ReputationEngine {
    db: PgPool,
}

impl ReputationEngine {
    /// Creates a new reputation engine
    pub fn new(db: PgPool) -> Self {
        ReputationEngine { db }
    }

    /// Records a like or dislike by `acting_user_id` on `note_id`
    ///
    /// Feedback is permanent: there is no retraction and no switching between
    /// like and dislike. A `Conflict` means the feedback is already recorded
    /// and must not be retried.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the user already gave feedback on this note
    /// - `NotFound` if the note does not exist
    /// - `Unauthenticated` if the acting user no longer exists
    pub async fn give_feedback(
        &self,
        note_id: i64,
        acting_user_id: i64,
        feedback_type: FeedbackType,
    ) -> DomainResult<FeedbackOutcome> {
        let delta = feedback_type.delta();
        let mut tx = self.db.begin().await?;

        if NoteFeedback::find(&mut *tx, note_id, acting_user_id).await?.is_some() {
            return Err(DomainError::conflict(ALREADY_GAVE_FEEDBACK));
        }

        let (author_id, likes): (i64, i32) = sqlx::query_as(
            r#"
            UPDATE notes
            SET likes = likes + $2, updated_at = NOW()
            WHERE note_id = $1
            RETURNING user_id, likes
            "#,
        )
        .bind(note_id)
        .bind(delta)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DomainError::not_found(NOTE_NOT_FOUND))?;

        // Dropping `tx` on any early return below undoes the likes change.
        // The note row is locked above, so a foreign-key failure here is the user.
        let inserted = NoteFeedback::insert_if_absent(&mut *tx, note_id, acting_user_id, feedback_type)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    DomainError::Unauthenticated
                } else {
                    DomainError::Database(e)
                }
            })?;

        if inserted.is_none() {
            return Err(DomainError::conflict(ALREADY_GAVE_FEEDBACK));
        }

        let (_, author_score, author_rank) = apply_score_delta(&mut tx, author_id, delta)
            .await?
            .ok_or_else(|| DomainError::not_found(USER_NOT_FOUND))?;

        tx.commit().await?;

        info!(
            note_id,
            user_id = acting_user_id,
            author_id,
            feedback = %feedback_type,
            likes,
            author_score,
            author_rank = %author_rank,
            "Feedback recorded"
        );

        Ok(FeedbackOutcome {
            likes,
            author_score,
            author_rank,
        })
    }

    /// Applies a ±1 score change without touching notes or feedback
    ///
    /// Privileged and intentionally unguarded: every call changes the score.
    ///
    /// # Errors
    ///
    /// `NotFound` if the user does not exist
    pub async fn adjust_score_direct(&self, user_id: i64, adjustment: ScoreAdjustment) -> DomainResult<ScoreChange> {
        let mut tx = self.db.begin().await?;

        let (username, new_score, current_rank) = apply_score_delta(&mut tx, user_id, adjustment.delta())
            .await?
            .ok_or_else(|| DomainError::not_found(USER_NOT_FOUND))?;

        tx.commit().await?;

        info!(user_id, new_score, current_rank = %current_rank, "Score adjusted by operator");

        Ok(ScoreChange {
            username,
            new_score,
            current_rank,
        })
    }

    /// Gets a user's score and rank
    pub async fn standing(&self, user_id: i64) -> DomainResult<RankingEntry> {
        let user = User::find_by_id(&self.db, user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(USER_NOT_FOUND))?;

        Ok(RankingEntry::from(&user))
    }

    /// Returns all users ordered by score, highest first
    ///
    /// # Errors
    ///
    /// `DomainError::NotFound` when there are no users
    pub async fn leaderboard(&self) -> DomainResult<Vec<RankingEntry>> {
        let entries = User::leaderboard(&self.db).await?;

        if entries.is_empty() {
            return Err(DomainError::not_found(NO_USERS));
        }

        Ok(entries)
    }
}

/// Adds `delta` to a user's score and rewrites the cached rank
///
/// Two statements on `conn`, which must be inside a transaction. The first
/// takes the row lock, so the rank written always matches the score it was
/// computed from and no reader sees one without the other.
///
/// # Returns
///
/// The user's `(username, score, rank)`, or `None` if the user does not exist
async fn apply_score_delta(
    conn: &mut PgConnection,
    user_id: i64,
    delta: i32,
) -> Result<Option<(String, i32, Rank)>, sqlx::Error> {
    let row: Option<(String, i32)> = sqlx::query_as(
        r#"
        UPDATE users
        SET score = score + $2, updated_at = NOW()
        WHERE user_id = $1
        RETURNING username, score
        "#,
    )
    .bind(user_id)
    .bind(delta)
    .fetch_optional(&mut *conn)
    .await?;

    let Some((username, score)) = row else {
        return Ok(None);
    };

    let rank = Rank::for_score(score);

    sqlx::query("UPDATE users SET rank = $2 WHERE user_id = $1")
        .bind(user_id)
        .bind(rank)
        .execute(&mut *conn)
        .await?;

    debug!(user_id, score, rank = %rank, "Score updated");
    Ok(Some((username, score, rank)))
}
