/// Integration tests for the membership store and authorization guard
///
/// These tests require a running PostgreSQL database (DATABASE_URL).

mod common;

use common::{add_member, create_organization, create_user, unique};
use edunotes_shared::auth::authorization::{require_role, AuthzError};
use edunotes_shared::error::DomainError;
use edunotes_shared::membership::{MembershipPolicy, MembershipStore};
use edunotes_shared::models::membership::MembershipRole;
use edunotes_shared::models::notification::{Notification, NotificationStatus};
use edunotes_shared::models::organization::Organization;
use edunotes_shared::models::user::User;

fn store(pool: &sqlx::PgPool) -> MembershipStore {
    MembershipStore::new(pool.clone(), MembershipPolicy::default())
}

#[tokio::test]
async fn test_creator_becomes_owner() {
    let Some(pool) = common::test_pool().await else { return };
    let owner = create_user(&pool, "owner").await;

    let organization = store(&pool)
        .create_organization(owner.user_id, &unique("Physics"))
        .await
        .unwrap();

    let role = store(&pool)
        .get_role(organization.organization_id, owner.user_id)
        .await
        .unwrap();
    assert_eq!(role, Some(MembershipRole::Owner));
}

#[tokio::test]
async fn test_duplicate_organization_name_conflicts() {
    let Some(pool) = common::test_pool().await else { return };
    let owner = create_user(&pool, "owner").await;
    let name = unique("Chemistry");

    store(&pool).create_organization(owner.user_id, &name).await.unwrap();
    let err = store(&pool).create_organization(owner.user_id, &name).await.unwrap_err();

    assert!(matches!(err, DomainError::Conflict(_)));
    assert_eq!(err.to_string(), "Organization with this name already exists");
}

#[tokio::test]
async fn test_add_member_and_duplicate_conflict() {
    let Some(pool) = common::test_pool().await else { return };
    let owner = create_user(&pool, "owner").await;
    let member = create_user(&pool, "member").await;
    let organization = create_organization(&pool, &owner).await;

    let membership = store(&pool)
        .add_member(owner.user_id, organization.organization_id, member.user_id, MembershipRole::User)
        .await
        .unwrap();
    assert_eq!(membership.role, MembershipRole::User);

    let err = store(&pool)
        .add_member(owner.user_id, organization.organization_id, member.user_id, MembershipRole::Owner)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));
    assert_eq!(err.to_string(), "User already exists in the organization");

    // Role unchanged by the rejected add
    let role = store(&pool)
        .get_role(organization.organization_id, member.user_id)
        .await
        .unwrap();
    assert_eq!(role, Some(MembershipRole::User));
}

#[tokio::test]
async fn test_add_member_requires_owner() {
    let Some(pool) = common::test_pool().await else { return };
    let owner = create_user(&pool, "owner").await;
    let member = create_user(&pool, "member").await;
    let outsider = create_user(&pool, "outsider").await;
    let organization = create_organization(&pool, &owner).await;
    add_member(&pool, &organization, &member, MembershipRole::User).await;

    let err = store(&pool)
        .add_member(member.user_id, organization.organization_id, outsider.user_id, MembershipRole::User)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Forbidden(_)));
    assert_eq!(
        store(&pool)
            .get_role(organization.organization_id, outsider.user_id)
            .await
            .unwrap(),
        None
    );
}

#[tokio::test]
async fn test_add_missing_user() {
    let Some(pool) = common::test_pool().await else { return };
    let owner = create_user(&pool, "owner").await;
    let organization = create_organization(&pool, &owner).await;

    let err = store(&pool)
        .add_member(owner.user_id, organization.organization_id, i64::MAX, MembershipRole::User)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::NotFound(_)));
    assert_eq!(err.to_string(), "User does not exist");
}

#[tokio::test]
async fn test_remove_member_notifies_exactly_once() {
    let Some(pool) = common::test_pool().await else { return };
    let owner = create_user(&pool, "owner").await;
    let member = create_user(&pool, "member").await;
    let organization = create_organization(&pool, &owner).await;
    add_member(&pool, &organization, &member, MembershipRole::User).await;

    let before = Notification::list_for_user(&pool, member.user_id).await.unwrap().len();

    let notification_id = store(&pool)
        .remove_member(owner.user_id, organization.organization_id, member.user_id)
        .await
        .unwrap();

    let notifications = Notification::list_for_user(&pool, member.user_id).await.unwrap();
    assert_eq!(notifications.len(), before + 1);

    let notification = notifications
        .iter()
        .find(|n| n.notification_id == notification_id)
        .expect("removal notification missing");
    assert_eq!(
        notification.message,
        format!("You have been removed from organization {}.", organization.organization_name)
    );
    assert_eq!(notification.status, NotificationStatus::Unread);

    assert_eq!(
        store(&pool)
            .get_role(organization.organization_id, member.user_id)
            .await
            .unwrap(),
        None
    );
}

#[tokio::test]
async fn test_remove_missing_member_is_not_found() {
    let Some(pool) = common::test_pool().await else { return };
    let owner = create_user(&pool, "owner").await;
    let stranger = create_user(&pool, "stranger").await;
    let organization = create_organization(&pool, &owner).await;

    let err = store(&pool)
        .remove_member(owner.user_id, organization.organization_id, stranger.user_id)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "User not found in the organization");

    // Nothing was written for the stranger
    assert!(Notification::list_for_user(&pool, stranger.user_id).await.unwrap().is_empty());

    let err = store(&pool)
        .remove_member(owner.user_id, i64::MAX, stranger.user_id)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Organization not found");
}

#[tokio::test]
async fn test_non_owner_cannot_remove() {
    let Some(pool) = common::test_pool().await else { return };
    let owner = create_user(&pool, "owner").await;
    let member = create_user(&pool, "member").await;
    let organization = create_organization(&pool, &owner).await;
    add_member(&pool, &organization, &member, MembershipRole::User).await;

    let err = store(&pool)
        .remove_member(member.user_id, organization.organization_id, owner.user_id)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Forbidden(_)));
    assert_eq!(err.to_string(), "No permission to remove users from this organization");
    assert_eq!(
        store(&pool)
            .get_role(organization.organization_id, owner.user_id)
            .await
            .unwrap(),
        Some(MembershipRole::Owner)
    );
}

#[tokio::test]
async fn test_last_owner_removal_allowed_by_default() {
    let Some(pool) = common::test_pool().await else { return };
    let owner = create_user(&pool, "owner").await;
    let organization = create_organization(&pool, &owner).await;

    store(&pool)
        .remove_member(owner.user_id, organization.organization_id, owner.user_id)
        .await
        .unwrap();

    // The organization survives without members
    assert!(Organization::find_by_id(&pool, organization.organization_id)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_last_owner_protection() {
    let Some(pool) = common::test_pool().await else { return };
    let owner = create_user(&pool, "owner").await;
    let organization = create_organization(&pool, &owner).await;
    let protected = MembershipStore::new(
        pool.clone(),
        MembershipPolicy {
            protect_last_owner: true,
        },
    );

    let err = protected
        .remove_member(owner.user_id, organization.organization_id, owner.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidState(_)));
    assert_eq!(err.to_string(), "Organization must keep at least one owner");

    let err = protected
        .update_role(owner.user_id, organization.organization_id, owner.user_id, MembershipRole::User)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidState(_)));

    // Both rolled back
    assert_eq!(
        protected.get_role(organization.organization_id, owner.user_id).await.unwrap(),
        Some(MembershipRole::Owner)
    );
    assert!(Notification::list_for_user(&pool, owner.user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_role() {
    let Some(pool) = common::test_pool().await else { return };
    let owner = create_user(&pool, "owner").await;
    let member = create_user(&pool, "member").await;
    let organization = create_organization(&pool, &owner).await;
    add_member(&pool, &organization, &member, MembershipRole::User).await;

    let updated = store(&pool)
        .update_role(owner.user_id, organization.organization_id, member.user_id, MembershipRole::Owner)
        .await
        .unwrap();
    assert_eq!(updated.role, MembershipRole::Owner);

    // The promoted member may now act as owner
    require_role(&pool, organization.organization_id, member.user_id, MembershipRole::Owner)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_require_role_is_exact_match() {
    let Some(pool) = common::test_pool().await else { return };
    let owner = create_user(&pool, "owner").await;
    let member = create_user(&pool, "member").await;
    let outsider = create_user(&pool, "outsider").await;
    let organization = create_organization(&pool, &owner).await;
    add_member(&pool, &organization, &member, MembershipRole::User).await;

    let result = require_role(&pool, organization.organization_id, member.user_id, MembershipRole::Owner).await;
    assert!(matches!(result, Err(AuthzError::InsufficientRole { .. })));

    let result = require_role(&pool, organization.organization_id, outsider.user_id, MembershipRole::User).await;
    assert!(matches!(result, Err(AuthzError::NotMember(_))));
}

#[tokio::test]
async fn test_listings_and_empty_collections() {
    let Some(pool) = common::test_pool().await else { return };
    let owner = create_user(&pool, "owner").await;
    let loner = create_user(&pool, "loner").await;
    let organization = create_organization(&pool, &owner).await;

    let members = store(&pool).list_members(organization.organization_id).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].user_id, owner.user_id);

    let organizations = store(&pool).list_organizations_for(owner.user_id).await.unwrap();
    assert!(organizations
        .iter()
        .any(|o| o.organization_id == organization.organization_id));

    let err = store(&pool).list_organizations_for(loner.user_id).await.unwrap_err();
    assert_eq!(err.to_string(), "No organizations found for this user");

    let err = store(&pool).list_memberships_for(loner.user_id).await.unwrap_err();
    assert_eq!(err.to_string(), "User is not part of any organization");

    store(&pool)
        .remove_member(owner.user_id, organization.organization_id, owner.user_id)
        .await
        .unwrap();
    let err = store(&pool).list_members(organization.organization_id).await.unwrap_err();
    assert_eq!(err.to_string(), "No users found in the organization");
}

#[tokio::test]
async fn test_delete_organization_cascades() {
    let Some(pool) = common::test_pool().await else { return };
    let owner = create_user(&pool, "owner").await;
    let member = create_user(&pool, "member").await;
    let organization = create_organization(&pool, &owner).await;
    add_member(&pool, &organization, &member, MembershipRole::User).await;
    let note = common::create_note(&pool, &organization, &member).await;

    let err = store(&pool)
        .delete_organization(member.user_id, organization.organization_id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    store(&pool)
        .delete_organization(owner.user_id, organization.organization_id)
        .await
        .unwrap();

    assert_eq!(
        store(&pool).get_role(organization.organization_id, member.user_id).await.unwrap(),
        None
    );
    assert!(edunotes_shared::models::note::Note::find_by_id(&pool, note.note_id)
        .await
        .unwrap()
        .is_none());
    assert!(User::find_by_id(&pool, member.user_id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_rename_organization() {
    let Some(pool) = common::test_pool().await else { return };
    let owner = create_user(&pool, "owner").await;
    let organization = create_organization(&pool, &owner).await;
    let other = create_organization(&pool, &owner).await;
    let name = unique("Renamed");

    let renamed = store(&pool)
        .rename_organization(owner.user_id, organization.organization_id, &name)
        .await
        .unwrap();
    assert_eq!(renamed.organization_name, name);

    let err = store(&pool)
        .rename_organization(owner.user_id, other.organization_id, &name)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));
}
