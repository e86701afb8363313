/// Membership store and organization lifecycle
///
/// The membership relation is the authorization ground truth. Every mutation
/// here runs in one transaction that first takes the locks it needs and then
/// checks the caller's role on the same connection:
///
/// 1. The organization row (`FOR NO KEY UPDATE`) for removals, role changes,
///    renames and deletes, which serializes owner-count checks
/// 2. The caller's membership row (`FOR SHARE`) via the authorization guard
///
/// Removing a member writes the removal notification inside the same
/// transaction.
///
/// # Last owner
///
/// By default nothing prevents an organization from losing its last owner.
/// Set [`MembershipPolicy::protect_last_owner`] to reject removals and
/// demotions that would leave zero owners.
///
/// # Example
///
/// ```no_run
/// use edunotes_shared::membership::{MembershipPolicy, MembershipStore};
/// use edunotes_shared::models::membership::MembershipRole;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let store = MembershipStore::new(pool, MembershipPolicy::default());
///
/// let organization = store.create_organization(1, "Physics 101").await?;
/// store.add_member(1, organization.organization_id, 2, MembershipRole::User).await?;
/// store.remove_member(1, organization.organization_id, 2).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use tracing::{debug, info, warn};

use crate::auth::authorization::require_role;
use crate::error::{conflict_on_unique, DomainError, DomainResult};
use crate::models::membership::{CreateMembership, Membership, MembershipRole};
use crate::models::organization::Organization;
use crate::models::user::User;
use crate::notifications::NotificationDispatcher;

pub const ORGANIZATION_NOT_FOUND: &str = "Organization not found";
pub const ORGANIZATION_NAME_TAKEN: &str = "Organization with this name already exists";
pub const NO_ORGANIZATIONS: &str = "No organizations found";
pub const NO_ORGANIZATIONS_FOR_USER: &str = "No organizations found for this user";
pub const USER_DOES_NOT_EXIST: &str = "User does not exist";
pub const USER_ALREADY_MEMBER: &str = "User already exists in the organization";
pub const MEMBER_NOT_FOUND: &str = "User not found in the organization";
pub const NO_MEMBERS: &str = "No users found in the organization";
pub const NOT_PART_OF_ANY_ORGANIZATION: &str = "User is not part of any organization";
pub const LAST_OWNER: &str = "Organization must keep at least one owner";

/// Invariants enforced on top of the membership relation
#[derive(Debug, Clone, Copy, Default)]
pub struct MembershipPolicy {
    /// Reject removals and demotions that leave an organization without owners
    pub protect_last_owner: bool,
}

/// Membership store service
#[derive(Debug, Clone)]
pub struct MembershipStore {
    db: PgPool,
    policy: MembershipPolicy,
}

impl MembershipStore {
    /// Creates a new membership store
    pub fn new(db: PgPool, policy: MembershipPolicy) -> Self {
        MembershipStore { db, policy }
    }

    pub fn policy(&self) -> MembershipPolicy {
        self.policy
    }

    /// Creates an organization with `creator_user_id` as its owner
    ///
    /// # Errors
    ///
    /// `DomainError::Conflict` if the name is taken
    pub async fn create_organization(&self, creator_user_id: i64, name: &str) -> DomainResult<Organization> {
        let mut tx = self.db.begin().await?;

        let organization = Organization::create(&mut *tx, name)
            .await
            .map_err(|e| conflict_on_unique(e, ORGANIZATION_NAME_TAKEN))?;

        Membership::create(
            &mut *tx,
            CreateMembership {
                organization_id: organization.organization_id,
                user_id: creator_user_id,
                role: MembershipRole::Owner,
            },
        )
        .await?;

        tx.commit().await?;

        info!(
            organization_id = organization.organization_id,
            owner_id = creator_user_id,
            "Organization created"
        );

        Ok(organization)
    }

    /// Gets an organization by ID
    pub async fn get_organization(&self, organization_id: i64) -> DomainResult<Organization> {
        Organization::find_by_id(&self.db, organization_id)
            .await?
            .ok_or_else(|| DomainError::not_found(ORGANIZATION_NOT_FOUND))
    }

    /// Lists every organization
    ///
    /// # Errors
    ///
    /// `DomainError::NotFound` when there are none
    pub async fn list_organizations(&self) -> DomainResult<Vec<Organization>> {
        let organizations = Organization::list(&self.db).await?;

        if organizations.is_empty() {
            return Err(DomainError::not_found(NO_ORGANIZATIONS));
        }

        Ok(organizations)
    }

    /// Lists the organizations `user_id` belongs to
    ///
    /// # Errors
    ///
    /// `DomainError::NotFound` when the user has no memberships
    pub async fn list_organizations_for(&self, user_id: i64) -> DomainResult<Vec<Organization>> {
        let organizations = Organization::list_for_user(&self.db, user_id).await?;

        if organizations.is_empty() {
            return Err(DomainError::not_found(NO_ORGANIZATIONS_FOR_USER));
        }

        Ok(organizations)
    }

    /// Renames an organization (owner only)
    pub async fn rename_organization(
        &self,
        acting_user_id: i64,
        organization_id: i64,
        name: &str,
    ) -> DomainResult<Organization> {
        let mut tx = self.db.begin().await?;

        Organization::find_by_id_for_update(&mut *tx, organization_id)
            .await?
            .ok_or_else(|| DomainError::not_found(ORGANIZATION_NOT_FOUND))?;

        require_role(&mut *tx, organization_id, acting_user_id, MembershipRole::Owner)
            .await
            .map_err(|e| e.forbidden("No permission to update this organization"))?;

        let organization = Organization::rename(&mut *tx, organization_id, name)
            .await
            .map_err(|e| conflict_on_unique(e, ORGANIZATION_NAME_TAKEN))?
            .ok_or_else(|| DomainError::not_found(ORGANIZATION_NOT_FOUND))?;

        tx.commit().await?;

        info!(organization_id, acting_user_id, "Organization renamed");
        Ok(organization)
    }

    /// Deletes an organization and everything it owns (owner only)
    pub async fn delete_organization(&self, acting_user_id: i64, organization_id: i64) -> DomainResult<()> {
        let mut tx = self.db.begin().await?;

        Organization::find_by_id_for_update(&mut *tx, organization_id)
            .await?
            .ok_or_else(|| DomainError::not_found(ORGANIZATION_NOT_FOUND))?;

        require_role(&mut *tx, organization_id, acting_user_id, MembershipRole::Owner)
            .await
            .map_err(|e| e.forbidden("No permission to delete this organization"))?;

        Organization::delete(&mut *tx, organization_id).await?;

        tx.commit().await?;

        info!(organization_id, acting_user_id, "Organization deleted");
        Ok(())
    }

    /// Adds `user_id` to an organization with `role` (owner only)
    ///
    /// # Errors
    ///
    /// - `NotFound` if the organization or the user does not exist
    /// - `Forbidden` if the caller is not an owner
    /// - `Conflict` if the pair already exists
    pub async fn add_member(
        &self,
        acting_user_id: i64,
        organization_id: i64,
        user_id: i64,
        role: MembershipRole,
    ) -> DomainResult<Membership> {
        let mut tx = self.db.begin().await?;

        Organization::find_by_id(&mut *tx, organization_id)
            .await?
            .ok_or_else(|| DomainError::not_found(ORGANIZATION_NOT_FOUND))?;

        require_role(&mut *tx, organization_id, acting_user_id, MembershipRole::Owner)
            .await
            .map_err(|e| e.forbidden("No permission to add users to this organization"))?;

        User::find_by_id(&mut *tx, user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(USER_DOES_NOT_EXIST))?;

        if Membership::exists(&mut *tx, organization_id, user_id).await? {
            return Err(DomainError::conflict(USER_ALREADY_MEMBER));
        }

        // A concurrent add of the same pair surfaces as a unique violation
        let membership = Membership::create(
            &mut *tx,
            CreateMembership {
                organization_id,
                user_id,
                role,
            },
        )
        .await
        .map_err(|e| conflict_on_unique(e, USER_ALREADY_MEMBER))?;

        tx.commit().await?;

        info!(organization_id, user_id, role = %role, "Member added");
        Ok(membership)
    }

    /// Gets a user's role in an organization, `None` if not a member
    pub async fn get_role(&self, organization_id: i64, user_id: i64) -> DomainResult<Option<MembershipRole>> {
        Ok(Membership::get_role(&self.db, organization_id, user_id).await?)
    }

    /// Gets a membership, reporting a missing pair as `NotFound`
    pub async fn get_membership(&self, organization_id: i64, user_id: i64) -> DomainResult<Membership> {
        Membership::find(&self.db, organization_id, user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(MEMBER_NOT_FOUND))
    }

    /// Changes a member's role (owner only)
    pub async fn update_role(
        &self,
        acting_user_id: i64,
        organization_id: i64,
        user_id: i64,
        role: MembershipRole,
    ) -> DomainResult<Membership> {
        let mut tx = self.db.begin().await?;

        Organization::find_by_id_for_update(&mut *tx, organization_id)
            .await?
            .ok_or_else(|| DomainError::not_found(ORGANIZATION_NOT_FOUND))?;

        require_role(&mut *tx, organization_id, acting_user_id, MembershipRole::Owner)
            .await
            .map_err(|e| e.forbidden("No permission to update user roles in this organization"))?;

        let membership = Membership::update_role(&mut *tx, organization_id, user_id, role)
            .await?
            .ok_or_else(|| DomainError::not_found(MEMBER_NOT_FOUND))?;

        if self.policy.protect_last_owner && Membership::count_owners(&mut *tx, organization_id).await? == 0 {
            warn!(organization_id, user_id, "Rejected demotion of last owner");
            return Err(DomainError::InvalidState(LAST_OWNER.to_string()));
        }

        tx.commit().await?;

        info!(organization_id, user_id, role = %role, "Member role updated");
        Ok(membership)
    }

    /// Removes `user_id` from an organization (owner only)
    ///
    /// The removed user receives exactly one notification naming the
    /// organization, written in the same transaction as the delete.
    ///
    /// # Returns
    ///
    /// The ID of the removal notification
    ///
    /// # Errors
    ///
    /// - `NotFound` if the organization or the membership does not exist
    /// - `Forbidden` if the caller is not an owner
    /// - `InvalidState` if the last owner would be removed and the policy forbids it
    pub async fn remove_member(
        &self,
        acting_user_id: i64,
        organization_id: i64,
        user_id: i64,
    ) -> DomainResult<i64> {
        let mut tx = self.db.begin().await?;

        let organization = Organization::find_by_id_for_update(&mut *tx, organization_id)
            .await?
            .ok_or_else(|| DomainError::not_found(ORGANIZATION_NOT_FOUND))?;

        require_role(&mut *tx, organization_id, acting_user_id, MembershipRole::Owner)
            .await
            .map_err(|e| e.forbidden("No permission to remove users from this organization"))?;

        if !Membership::delete(&mut *tx, organization_id, user_id).await? {
            return Err(DomainError::not_found(MEMBER_NOT_FOUND));
        }

        if self.policy.protect_last_owner && Membership::count_owners(&mut *tx, organization_id).await? == 0 {
            warn!(organization_id, user_id, "Rejected removal of last owner");
            return Err(DomainError::InvalidState(LAST_OWNER.to_string()));
        }

        let notification_id = NotificationDispatcher::notify_with(
            &mut *tx,
            user_id,
            &NotificationDispatcher::removal_message(&organization.organization_name),
        )
        .await?;

        tx.commit().await?;

        info!(organization_id, user_id, acting_user_id, "Member removed");
        Ok(notification_id)
    }

    /// Lists the members of an organization
    ///
    /// # Errors
    ///
    /// `DomainError::NotFound` when the organization has no members
    pub async fn list_members(&self, organization_id: i64) -> DomainResult<Vec<Membership>> {
        let members = Membership::list_by_organization(&self.db, organization_id).await?;

        if members.is_empty() {
            return Err(DomainError::not_found(NO_MEMBERS));
        }

        debug!(organization_id, count = members.len(), "Listed members");
        Ok(members)
    }

    /// Lists a user's memberships
    ///
    /// # Errors
    ///
    /// `DomainError::NotFound` when the user belongs to no organization
    pub async fn list_memberships_for(&self, user_id: i64) -> DomainResult<Vec<Membership>> {
        let memberships = Membership::list_by_user(&self.db, user_id).await?;

        if memberships.is_empty() {
            return Err(DomainError::not_found(NOT_PART_OF_ANY_ORGANIZATION));
        }

        Ok(memberships)
    }
}
