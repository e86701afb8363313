/// Integration tests for the invitation engine
///
/// These tests require a running PostgreSQL database (DATABASE_URL).

mod common;

use common::{add_member, create_organization, create_user, identity_of};
use edunotes_shared::error::DomainError;
use edunotes_shared::invitations::InvitationEngine;
use edunotes_shared::models::invitation::{Invitation, InvitationStatus};
use edunotes_shared::models::membership::{Membership, MembershipRole};

#[tokio::test]
async fn test_invite_then_decline() {
    let Some(pool) = common::test_pool().await else { return };
    let engine = InvitationEngine::new(pool.clone());
    let owner = create_user(&pool, "owner").await;
    let user2 = create_user(&pool, "user2").await;
    let organization = create_organization(&pool, &owner).await;

    let invitation = engine
        .invite(owner.user_id, organization.organization_id, &user2.email, MembershipRole::User)
        .await
        .unwrap();
    assert_eq!(invitation.status, InvitationStatus::Pending);
    assert_eq!(invitation.invited_by_user_id, owner.user_id);

    let sent = engine.list_sent(owner.user_id).await.unwrap();
    assert!(sent.iter().any(|i| i.invitation_id == invitation.invitation_id));

    let mine = engine.list_mine(&identity_of(&user2)).await.unwrap();
    assert!(mine.iter().any(|i| i.invitation_id == invitation.invitation_id));

    let declined = engine
        .decline(invitation.invitation_id, &identity_of(&user2))
        .await
        .unwrap();
    assert_eq!(declined.status, InvitationStatus::Declined);

    // A declined invitation can no longer be accepted
    let err = engine
        .accept(invitation.invitation_id, &identity_of(&user2))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidState(_)));
    assert_eq!(err.to_string(), "Invitation is already declined");

    assert!(!Membership::exists(&pool, organization.organization_id, user2.user_id)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_accept_creates_membership() {
    let Some(pool) = common::test_pool().await else { return };
    let engine = InvitationEngine::new(pool.clone());
    let owner = create_user(&pool, "owner").await;
    let invitee = create_user(&pool, "invitee").await;
    let organization = create_organization(&pool, &owner).await;

    let invitation = engine
        .invite(owner.user_id, organization.organization_id, &invitee.email, MembershipRole::Owner)
        .await
        .unwrap();

    let (accepted, membership) = engine
        .accept(invitation.invitation_id, &identity_of(&invitee))
        .await
        .unwrap();

    assert_eq!(accepted.status, InvitationStatus::Accepted);
    assert_eq!(membership.organization_id, organization.organization_id);
    assert_eq!(membership.user_id, invitee.user_id);
    assert_eq!(membership.role, MembershipRole::Owner);

    let err = engine
        .decline(invitation.invitation_id, &identity_of(&invitee))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invitation is already accepted");
}

#[tokio::test]
async fn test_other_identity_sees_not_found() {
    let Some(pool) = common::test_pool().await else { return };
    let engine = InvitationEngine::new(pool.clone());
    let owner = create_user(&pool, "owner").await;
    let invitee = create_user(&pool, "invitee").await;
    let snoop = create_user(&pool, "snoop").await;
    let organization = create_organization(&pool, &owner).await;

    let invitation = engine
        .invite(owner.user_id, organization.organization_id, &invitee.email, MembershipRole::User)
        .await
        .unwrap();

    for result in [
        engine.decline(invitation.invitation_id, &identity_of(&snoop)).await.map(|_| ()),
        engine.accept(invitation.invitation_id, &identity_of(&snoop)).await.map(|_| ()),
        engine.decline(i64::MAX, &identity_of(&invitee)).await.map(|_| ()),
    ] {
        let err = result.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        assert_eq!(err.to_string(), "Invitation not found");
    }

    let unchanged = Invitation::find_by_id(&pool, invitation.invitation_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.status, InvitationStatus::Pending);
}

#[tokio::test]
async fn test_inviting_existing_member_conflicts() {
    let Some(pool) = common::test_pool().await else { return };
    let engine = InvitationEngine::new(pool.clone());
    let owner = create_user(&pool, "owner").await;
    let member = create_user(&pool, "member").await;
    let organization = create_organization(&pool, &owner).await;
    add_member(&pool, &organization, &member, MembershipRole::User).await;

    let err = engine
        .invite(owner.user_id, organization.organization_id, &member.email, MembershipRole::User)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Conflict(_)));
    assert_eq!(err.to_string(), "User is already a member of this organization");
    assert!(Invitation::list_by_email(&pool, &member.email).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_non_owner_cannot_invite() {
    let Some(pool) = common::test_pool().await else { return };
    let engine = InvitationEngine::new(pool.clone());
    let owner = create_user(&pool, "owner").await;
    let member = create_user(&pool, "member").await;
    let target = create_user(&pool, "target").await;
    let organization = create_organization(&pool, &owner).await;
    add_member(&pool, &organization, &member, MembershipRole::User).await;

    let err = engine
        .invite(member.user_id, organization.organization_id, &target.email, MembershipRole::User)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Forbidden(_)));
    assert_eq!(err.to_string(), "No permission to invite users to this organization");
    assert!(Invitation::list_by_email(&pool, &target.email).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invite_unregistered_email() {
    let Some(pool) = common::test_pool().await else { return };
    let engine = InvitationEngine::new(pool.clone());
    let owner = create_user(&pool, "owner").await;
    let organization = create_organization(&pool, &owner).await;

    let err = engine
        .invite(
            owner.user_id,
            organization.organization_id,
            &format!("{}@nowhere.example", common::unique("ghost")),
            MembershipRole::User,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::NotFound(_)));
    assert_eq!(err.to_string(), "User with this email does not exist");
}

#[tokio::test]
async fn test_second_pending_invitation_conflicts() {
    let Some(pool) = common::test_pool().await else { return };
    let engine = InvitationEngine::new(pool.clone());
    let owner = create_user(&pool, "owner").await;
    let invitee = create_user(&pool, "invitee").await;
    let organization = create_organization(&pool, &owner).await;

    engine
        .invite(owner.user_id, organization.organization_id, &invitee.email, MembershipRole::User)
        .await
        .unwrap();

    // Email comparison ignores case
    let err = engine
        .invite(
            owner.user_id,
            organization.organization_id,
            &invitee.email.to_uppercase(),
            MembershipRole::User,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));
}

#[tokio::test]
async fn test_empty_listings_are_not_found() {
    let Some(pool) = common::test_pool().await else { return };
    let engine = InvitationEngine::new(pool.clone());
    let loner = create_user(&pool, "loner").await;

    let err = engine.list_mine(&identity_of(&loner)).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
    assert_eq!(err.to_string(), "No invitations found");

    let err = engine.list_sent(loner.user_id).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
    assert_eq!(err.to_string(), "No sent invitations found");
}

#[tokio::test]
async fn test_deleting_inviter_deletes_sent_invitations() {
    let Some(pool) = common::test_pool().await else { return };
    let engine = InvitationEngine::new(pool.clone());
    let owner = create_user(&pool, "owner").await;
    let co_owner = create_user(&pool, "coowner").await;
    let invitee = create_user(&pool, "invitee").await;
    let organization = create_organization(&pool, &owner).await;
    add_member(&pool, &organization, &co_owner, MembershipRole::Owner).await;

    let invitation = engine
        .invite(co_owner.user_id, organization.organization_id, &invitee.email, MembershipRole::User)
        .await
        .unwrap();

    edunotes_shared::models::user::User::delete(&pool, co_owner.user_id)
        .await
        .unwrap();

    assert!(Invitation::find_by_id(&pool, invitation.invitation_id)
        .await
        .unwrap()
        .is_none());
    assert!(!Membership::exists(&pool, organization.organization_id, co_owner.user_id)
        .await
        .unwrap());
}
