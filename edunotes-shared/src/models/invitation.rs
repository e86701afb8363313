/// Invitation model and the pending/accepted/declined state machine
///
/// # Schema
///
/// ```sql
/// CREATE TYPE invitation_status AS ENUM ('pending', 'accepted', 'declined');
///
/// CREATE TABLE invitations (
///     invitation_id BIGSERIAL PRIMARY KEY,
///     organization_id BIGINT NOT NULL REFERENCES organizations ON DELETE CASCADE,
///     email VARCHAR(255) NOT NULL,
///     role membership_role NOT NULL DEFAULT 'user',
///     status invitation_status NOT NULL DEFAULT 'pending',
///     invited_by_user_id BIGINT NOT NULL REFERENCES users ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE UNIQUE INDEX invitations_pending_target_key
///     ON invitations (organization_id, email) WHERE status = 'pending';
/// ```
///
/// # State Machine
///
/// ```text
/// pending --accept--> accepted
/// pending --decline-> declined
/// ```
///
/// Both outcomes are terminal. Only `status` ever changes after insert.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use std::fmt;

use super::membership::MembershipRole;
use crate::error::DomainError;

/// Invitation lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "invitation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
}

/// Transition requested by the invitation's recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitationAction {
    Accept,
    Decline,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Declined => "declined",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, InvitationStatus::Pending)
    }

    /// Applies `action` and returns the resulting status
    ///
    /// # Errors
    ///
    /// `DomainError::InvalidState` when the invitation has already left `pending`
    pub fn transition(self, action: InvitationAction) -> Result<InvitationStatus, DomainError> {
        match (self, action) {
            (InvitationStatus::Pending, InvitationAction::Accept) => Ok(InvitationStatus::Accepted),
            (InvitationStatus::Pending, InvitationAction::Decline) => Ok(InvitationStatus::Declined),
            (status, _) => Err(DomainError::InvalidState(format!(
                "Invitation is already {}",
                status
            ))),
        }
    }
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invitation row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Invitation {
    pub invitation_id: i64,
    pub organization_id: i64,

    /// Recipient email, lowercase
    pub email: String,

    /// Role granted on acceptance
    pub role: MembershipRole,

    pub status: InvitationStatus,
    pub invited_by_user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an invitation
#[derive(Debug, Clone)]
pub struct CreateInvitation {
    pub organization_id: i64,
    pub email: String,
    pub role: MembershipRole,
    pub invited_by_user_id: i64,
}

impl Invitation {
    /// Inserts a pending invitation
    ///
    /// # Errors
    ///
    /// Returns a unique violation (`invitations_pending_target_key`) when a
    /// pending invitation for the same organization and email exists.
    pub async fn create(executor: impl PgExecutor<'_>, data: CreateInvitation) -> Result<Self, sqlx::Error> {
        let invitation = sqlx::query_as::<_, Invitation>(
            r#"
            INSERT INTO invitations (organization_id, email, role, invited_by_user_id)
            VALUES ($1, LOWER($2), $3, $4)
            RETURNING invitation_id, organization_id, email, role, status,
                      invited_by_user_id, created_at
            "#,
        )
        .bind(data.organization_id)
        .bind(data.email)
        .bind(data.role)
        .bind(data.invited_by_user_id)
        .fetch_one(executor)
        .await?;

        Ok(invitation)
    }

    /// Finds an invitation by ID
    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        invitation_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let invitation = sqlx::query_as::<_, Invitation>(
            r#"
            SELECT invitation_id, organization_id, email, role, status,
                   invited_by_user_id, created_at
            FROM invitations
            WHERE invitation_id = $1
            "#,
        )
        .bind(invitation_id)
        .fetch_optional(executor)
        .await?;

        Ok(invitation)
    }

    /// Finds an invitation addressed to `email` and locks it for update
    ///
    /// Invitations addressed to someone else are indistinguishable from
    /// missing ones.
    pub async fn find_for_recipient_for_update(
        executor: impl PgExecutor<'_>,
        invitation_id: i64,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let invitation = sqlx::query_as::<_, Invitation>(
            r#"
            SELECT invitation_id, organization_id, email, role, status,
                   invited_by_user_id, created_at
            FROM invitations
            WHERE invitation_id = $1 AND email = LOWER($2)
            FOR UPDATE
            "#,
        )
        .bind(invitation_id)
        .bind(email)
        .fetch_optional(executor)
        .await?;

        Ok(invitation)
    }

    /// Writes a new status
    pub async fn set_status(
        executor: impl PgExecutor<'_>,
        invitation_id: i64,
        status: InvitationStatus,
    ) -> Result<Self, sqlx::Error> {
        let invitation = sqlx::query_as::<_, Invitation>(
            r#"
            UPDATE invitations
            SET status = $2
            WHERE invitation_id = $1
            RETURNING invitation_id, organization_id, email, role, status,
                      invited_by_user_id, created_at
            "#,
        )
        .bind(invitation_id)
        .bind(status)
        .fetch_one(executor)
        .await?;

        Ok(invitation)
    }

    /// Lists invitations addressed to an email, newest first
    pub async fn list_by_email(executor: impl PgExecutor<'_>, email: &str) -> Result<Vec<Self>, sqlx::Error> {
        let invitations = sqlx::query_as::<_, Invitation>(
            r#"
            SELECT invitation_id, organization_id, email, role, status,
                   invited_by_user_id, created_at
            FROM invitations
            WHERE email = LOWER($1)
            ORDER BY created_at DESC, invitation_id DESC
            "#,
        )
        .bind(email)
        .fetch_all(executor)
        .await?;

        Ok(invitations)
    }

    /// Lists invitations sent by a user, newest first
    pub async fn list_by_inviter(
        executor: impl PgExecutor<'_>,
        invited_by_user_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let invitations = sqlx::query_as::<_, Invitation>(
            r#"
            SELECT invitation_id, organization_id, email, role, status,
                   invited_by_user_id, created_at
            FROM invitations
            WHERE invited_by_user_id = $1
            ORDER BY created_at DESC, invitation_id DESC
            "#,
        )
        .bind(invited_by_user_id)
        .fetch_all(executor)
        .await?;

        Ok(invitations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_transitions() {
        assert_eq!(
            InvitationStatus::Pending.transition(InvitationAction::Accept).unwrap(),
            InvitationStatus::Accepted
        );
        assert_eq!(
            InvitationStatus::Pending.transition(InvitationAction::Decline).unwrap(),
            InvitationStatus::Declined
        );
    }

    #[test]
    fn test_terminal_states_reject_transitions() {
        for status in [InvitationStatus::Accepted, InvitationStatus::Declined] {
            assert!(status.is_terminal());
            for action in [InvitationAction::Accept, InvitationAction::Decline] {
                let err = status.transition(action).unwrap_err();
                assert!(matches!(err, DomainError::InvalidState(_)));
                assert_eq!(err.to_string(), format!("Invitation is already {}", status));
            }
        }
        assert!(!InvitationStatus::Pending.is_terminal());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&InvitationStatus::Declined).unwrap(),
            "\"declined\""
        );
    }
}
