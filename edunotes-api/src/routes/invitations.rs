/// Invitation endpoints
///
/// - `POST /organization-invitations` - Invite a registered user by email (owner only)
/// - `POST /organization-invitations/:invitation_id/accept` - Accept (recipient only)
/// - `POST /organization-invitations/:invitation_id/decline` - Decline (recipient only)
/// - `GET /organization-invitations/my` - Invitations addressed to the caller
/// - `GET /organization-invitations/sent` - Invitations the caller sent
///
/// An invitation addressed to someone else is reported as not found.

use crate::{
    app::AppState,
    error::ApiResult,
    response::{ApiResponse, AppJson, AppPath},
};
use axum::{extract::State, Extension};
use edunotes_shared::{
    auth::middleware::Identity,
    models::{
        invitation::Invitation,
        membership::{Membership, MembershipRole},
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Invite request
#[derive(Debug, Deserialize, Validate)]
pub struct InviteRequest {
    pub organization_id: i64,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Role granted on acceptance; defaults to `user`
    pub role: Option<String>,
}

/// Accepted invitation together with the membership it created
#[derive(Debug, Serialize, Deserialize)]
pub struct AcceptedInvitation {
    pub invitation: Invitation,
    pub membership: Membership,
}

/// Invite a user into an organization
///
/// # Errors
///
/// - `400 Bad Request`: invalid role, already a member, or already invited
/// - `403 Forbidden`: caller is not an owner
/// - `404 Not Found`: no user registered with that email
pub async fn invite(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    AppJson(req): AppJson<InviteRequest>,
) -> ApiResult<ApiResponse<Invitation>> {
    req.validate()?;

    let role = match req.role.as_deref() {
        Some(role) => role.parse::<MembershipRole>()?,
        None => MembershipRole::default(),
    };

    let invitation = state
        .invitations
        .invite(identity.user_id, req.organization_id, req.email.trim(), role)
        .await?;

    Ok(ApiResponse::ok("Invitation sent successfully", invitation))
}

/// Accept an invitation and join the organization
pub async fn accept_invitation(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    AppPath(invitation_id): AppPath<i64>,
) -> ApiResult<ApiResponse<AcceptedInvitation>> {
    let (invitation, membership) = state.invitations.accept(invitation_id, &identity).await?;

    Ok(ApiResponse::ok(
        "Invitation accepted",
        AcceptedInvitation {
            invitation,
            membership,
        },
    ))
}

/// Decline an invitation
pub async fn decline_invitation(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    AppPath(invitation_id): AppPath<i64>,
) -> ApiResult<ApiResponse<Invitation>> {
    let invitation = state.invitations.decline(invitation_id, &identity).await?;
    Ok(ApiResponse::ok("Invitation declined", invitation))
}

pub async fn list_my_invitations(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<ApiResponse<Vec<Invitation>>> {
    let invitations = state.invitations.list_mine(&identity).await?;
    Ok(ApiResponse::ok("Invitations retrieved successfully", invitations))
}

pub async fn list_sent_invitations(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<ApiResponse<Vec<Invitation>>> {
    let invitations = state.invitations.list_sent(identity.user_id).await?;
    Ok(ApiResponse::ok("Sent invitations retrieved successfully", invitations))
}
