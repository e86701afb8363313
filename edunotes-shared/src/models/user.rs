/// User model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     user_id BIGSERIAL PRIMARY KEY,
///     username VARCHAR(50) NOT NULL UNIQUE,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     first_name VARCHAR(100) NOT NULL,
///     last_name VARCHAR(100) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     avatar_url VARCHAR(512),
///     score INTEGER NOT NULL DEFAULT 0,
///     rank user_rank NOT NULL DEFAULT 'incompetent',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// `score` and `rank` are read-only here. The only writer is
/// [`ReputationEngine`](crate::reputation::ReputationEngine), which updates
/// both columns in one transaction under the row lock.
///
/// Deleting a user cascades memberships, authored notes, feedback,
/// notifications and sent invitations through foreign keys.
///
/// # Example
///
/// ```no_run
/// use edunotes_shared::models::user::{CreateUser, User};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, CreateUser {
///     username: "alice".to_string(),
///     email: "alice@example.com".to_string(),
///     first_name: "Alice".to_string(),
///     last_name: "Liddell".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// }).await?;
///
/// let found = User::find_by_login(&pool, "alice@example.com").await?;
/// assert_eq!(found.map(|u| u.user_id), Some(user.user_id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

use crate::reputation::Rank;

const USER_COLUMNS: &str = "user_id, username, email, first_name, last_name, password_hash, \
                            avatar_url, score, rank, created_at, updated_at";

/// Registered user account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub user_id: i64,

    /// Unique login name
    pub username: String,

    /// Unique email address, stored lowercase
    pub email: String,

    pub first_name: String,

    pub last_name: String,

    /// Argon2id PHC hash; never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    pub avatar_url: Option<String>,

    /// Net feedback received on authored notes plus operator adjustments
    pub score: i32,

    /// Cached `Rank::for_score(score)`
    pub rank: Rank,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,

    /// Argon2id password hash (not the plaintext password)
    pub password_hash: String,
}

/// One row of the score leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RankingEntry {
    pub user_id: i64,
    pub username: String,
    pub score: i32,
    pub rank: Rank,
}

impl User {
    /// Creates a new user with score 0 and the lowest rank
    ///
    /// The email is lowercased before insert.
    ///
    /// # Errors
    ///
    /// Returns a unique violation (`users_username_key` / `users_email_key`)
    /// when the username or email is taken.
    pub async fn create(executor: impl PgExecutor<'_>, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, first_name, last_name, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(data.username)
        .bind(data.email.to_lowercase())
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.password_hash)
        .fetch_one(executor)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(executor: impl PgExecutor<'_>, user_id: i64) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(user)
    }

    /// Finds a user by email, case-insensitively
    pub async fn find_by_email(executor: impl PgExecutor<'_>, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(executor)
        .await?;

        Ok(user)
    }

    /// Finds a user by username or email
    ///
    /// Used by login, which accepts either in the same field.
    pub async fn find_by_login(executor: impl PgExecutor<'_>, login: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE username = $1 OR email = LOWER($1)
            LIMIT 1
            "#
        ))
        .bind(login)
        .fetch_optional(executor)
        .await?;

        Ok(user)
    }

    /// Deletes a user and everything that cascades from it
    ///
    /// # Returns
    ///
    /// `true` if a row was deleted
    pub async fn delete(executor: impl PgExecutor<'_>, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Returns every user ordered by score (highest first), ties by user ID
    pub async fn leaderboard(executor: impl PgExecutor<'_>) -> Result<Vec<RankingEntry>, sqlx::Error> {
        let entries = sqlx::query_as::<_, RankingEntry>(
            r#"
            SELECT user_id, username, score, rank
            FROM users
            ORDER BY score DESC, user_id ASC
            "#,
        )
        .fetch_all(executor)
        .await?;

        Ok(entries)
    }
}

impl From<&User> for RankingEntry {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username.clone(),
            score: user.score,
            rank: user.rank,
        }
    }
}
