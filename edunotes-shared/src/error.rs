/// Domain error taxonomy
///
/// Every engine in this crate reports failures through [`DomainError`]. The
/// variants carry the human-readable detail that is surfaced to callers
/// unchanged; the API layer maps each variant to a status code.
///
/// Empty collections and cross-user lookups are reported as
/// [`DomainError::NotFound`] on purpose, so callers cannot distinguish
/// "nothing here" from "not yours".

/// Result alias used throughout the engines
pub type DomainResult<T> = Result<T, DomainError>;

/// Error type for membership, invitation, reputation and notification operations
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// No verified identity was supplied
    #[error("Not authenticated")]
    Unauthenticated,

    /// Authenticated but the caller's role does not permit the action
    #[error("{0}")]
    Forbidden(String),

    /// Missing entity, empty collection, or another user's entity
    #[error("{0}")]
    NotFound(String),

    /// Uniqueness violation (duplicate membership, feedback, invitation, name)
    #[error("{0}")]
    Conflict(String),

    /// Malformed enum/role value
    #[error("{0}")]
    InvalidInput(String),

    /// Transition not allowed from the entity's current state
    #[error("{0}")]
    InvalidState(String),

    /// Underlying store failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl DomainError {
    pub fn forbidden(detail: impl Into<String>) -> Self {
        DomainError::Forbidden(detail.into())
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        DomainError::NotFound(detail.into())
    }

    pub fn conflict(detail: impl Into<String>) -> Self {
        DomainError::Conflict(detail.into())
    }
}

/// Returns true when `err` is a unique-constraint violation
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

/// Returns true when `err` is a foreign-key violation
pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_foreign_key_violation(),
        _ => false,
    }
}

/// Converts a unique-constraint violation into [`DomainError::Conflict`]
///
/// Any other error is passed through as [`DomainError::Database`].
pub fn conflict_on_unique(err: sqlx::Error, detail: &str) -> DomainError {
    if is_unique_violation(&err) {
        DomainError::Conflict(detail.to_string())
    } else {
        DomainError::Database(err)
    }
}
