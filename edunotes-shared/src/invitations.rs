/// Invitation engine
///
/// Owners invite registered users by email. The recipient, identified by the
/// email in their verified identity, either accepts (creating the membership)
/// or declines. Both outcomes are terminal.
///
/// Invitations addressed to someone else are reported as `NotFound`, so a
/// caller cannot probe for invitation IDs belonging to other users.
///
/// # Example
///
/// ```no_run
/// use edunotes_shared::auth::middleware::Identity;
/// use edunotes_shared::invitations::InvitationEngine;
/// use edunotes_shared::models::membership::MembershipRole;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, bob: Identity) -> Result<(), Box<dyn std::error::Error>> {
/// let engine = InvitationEngine::new(pool);
///
/// let invitation = engine.invite(1, 10, "bob@example.com", MembershipRole::User).await?;
/// engine.accept(invitation.invitation_id, &bob).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use tracing::info;

use crate::auth::authorization::require_role;
use crate::auth::middleware::Identity;
use crate::error::{conflict_on_unique, DomainError, DomainResult};
use crate::models::invitation::{CreateInvitation, Invitation, InvitationAction};
use crate::models::membership::{CreateMembership, Membership, MembershipRole};
use crate::models::user::User;

pub const INVITATION_NOT_FOUND: &str = "Invitation not found";
pub const INVITEE_NOT_REGISTERED: &str = "User with this email does not exist";
pub const ALREADY_MEMBER: &str = "User is already a member of this organization";
pub const ALREADY_INVITED: &str = "User already has a pending invitation to this organization";
pub const NO_INVITATIONS: &str = "No invitations found";
pub const NO_SENT_INVITATIONS: &str = "No sent invitations found";

/// Invitation engine service
#[derive(Debug, Clone)]
pub struct InvitationEngine {
    db: PgPool,
}

impl InvitationEngine {
    /// Creates a new invitation engine
    pub fn new(db: PgPool) -> Self {
        InvitationEngine { db }
    }

    /// Sends a pending invitation
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the inviter is not an owner of the organization
    /// - `NotFound` if no user is registered with `email`
    /// - `Conflict` if that user is already a member, or already has a
    ///   pending invitation to this organization
    pub async fn invite(
        &self,
        inviter_user_id: i64,
        organization_id: i64,
        email: &str,
        role: MembershipRole,
    ) -> DomainResult<Invitation> {
        let mut tx = self.db.begin().await?;

        require_role(&mut *tx, organization_id, inviter_user_id, MembershipRole::Owner)
            .await
            .map_err(|e| e.forbidden("No permission to invite users to this organization"))?;

        let invitee = User::find_by_email(&mut *tx, email)
            .await?
            .ok_or_else(|| DomainError::not_found(INVITEE_NOT_REGISTERED))?;

        if Membership::exists(&mut *tx, organization_id, invitee.user_id).await? {
            return Err(DomainError::conflict(ALREADY_MEMBER));
        }

        let invitation = Invitation::create(
            &mut *tx,
            CreateInvitation {
                organization_id,
                email: invitee.email,
                role,
                invited_by_user_id: inviter_user_id,
            },
        )
        .await
        .map_err(|e| conflict_on_unique(e, ALREADY_INVITED))?;

        tx.commit().await?;

        info!(
            invitation_id = invitation.invitation_id,
            organization_id,
            inviter_user_id,
            "Invitation sent"
        );

        Ok(invitation)
    }

    /// Accepts an invitation addressed to the caller
    ///
    /// Creates the membership with the invitation's role and marks the
    /// invitation accepted in one transaction.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the invitation does not exist or is addressed to someone else
    /// - `InvalidState` if it is no longer pending
    /// - `Conflict` if the caller already became a member; the invitation stays pending
    pub async fn accept(&self, invitation_id: i64, caller: &Identity) -> DomainResult<(Invitation, Membership)> {
        let mut tx = self.db.begin().await?;

        let invitation = Invitation::find_for_recipient_for_update(&mut *tx, invitation_id, &caller.email)
            .await?
            .ok_or_else(|| DomainError::not_found(INVITATION_NOT_FOUND))?;

        let next = invitation.status.transition(InvitationAction::Accept)?;

        if Membership::exists(&mut *tx, invitation.organization_id, caller.user_id).await? {
            return Err(DomainError::conflict(ALREADY_MEMBER));
        }

        let membership = Membership::create(
            &mut *tx,
            CreateMembership {
                organization_id: invitation.organization_id,
                user_id: caller.user_id,
                role: invitation.role,
            },
        )
        .await
        .map_err(|e| conflict_on_unique(e, ALREADY_MEMBER))?;

        let invitation = Invitation::set_status(&mut *tx, invitation_id, next).await?;

        tx.commit().await?;

        info!(
            invitation_id,
            organization_id = invitation.organization_id,
            user_id = caller.user_id,
            "Invitation accepted"
        );

        Ok((invitation, membership))
    }

    /// Declines an invitation addressed to the caller
    ///
    /// # Errors
    ///
    /// - `NotFound` if the invitation does not exist or is addressed to someone else
    /// - `InvalidState` if it is no longer pending
    pub async fn decline(&self, invitation_id: i64, caller: &Identity) -> DomainResult<Invitation> {
        let mut tx = self.db.begin().await?;

        let invitation = Invitation::find_for_recipient_for_update(&mut *tx, invitation_id, &caller.email)
            .await?
            .ok_or_else(|| DomainError::not_found(INVITATION_NOT_FOUND))?;

        let next = invitation.status.transition(InvitationAction::Decline)?;
        let invitation = Invitation::set_status(&mut *tx, invitation_id, next).await?;

        tx.commit().await?;

        info!(invitation_id, user_id = caller.user_id, "Invitation declined");
        Ok(invitation)
    }

    /// Lists invitations addressed to the caller's email
    ///
    /// # Errors
    ///
    /// `DomainError::NotFound` when there are none
    pub async fn list_mine(&self, caller: &Identity) -> DomainResult<Vec<Invitation>> {
        let invitations = Invitation::list_by_email(&self.db, &caller.email).await?;

        if invitations.is_empty() {
            return Err(DomainError::not_found(NO_INVITATIONS));
        }

        Ok(invitations)
    }

    /// Lists invitations sent by `inviter_user_id`
    ///
    /// # Errors
    ///
    /// `DomainError::NotFound` when there are none
    pub async fn list_sent(&self, inviter_user_id: i64) -> DomainResult<Vec<Invitation>> {
        let invitations = Invitation::list_by_inviter(&self.db, inviter_user_id).await?;

        if invitations.is_empty() {
            return Err(DomainError::not_found(NO_SENT_INVITATIONS));
        }

        Ok(invitations)
    }
}
