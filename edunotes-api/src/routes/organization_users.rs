/// Membership endpoints
///
/// - `GET /organization_users/me` - Caller's memberships
/// - `GET /organization_users/:organization_id` - Members of an organization
/// - `GET /organization_users/:organization_id/:user_id/role` - A member's role
/// - `POST /organization_users` - Add a member (owner only)
/// - `PUT /organization_users/:organization_id/:user_id/role` - Change a role (owner only)
/// - `DELETE /organization_users/:organization_id/:user_id` - Remove a member (owner only)
///
/// Roles arrive as strings and are parsed here, so anything other than
/// `owner` or `user` is a 400 with "Invalid role: {value}".

use crate::{
    app::AppState,
    error::ApiResult,
    response::{ApiResponse, AppJson, AppPath},
};
use axum::{extract::State, Extension};
use edunotes_shared::{
    auth::middleware::Identity,
    models::membership::{Membership, MembershipRole},
};
use serde::{Deserialize, Serialize};

/// Add member request
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub organization_id: i64,
    pub user_id: i64,

    /// Defaults to `user`
    pub role: Option<String>,
}

/// Role update request
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

/// A member's role within one organization
#[derive(Debug, Serialize, Deserialize)]
pub struct RoleResponse {
    pub organization_id: i64,
    pub user_id: i64,
    pub role: MembershipRole,
}

impl From<Membership> for RoleResponse {
    fn from(membership: Membership) -> Self {
        Self {
            organization_id: membership.organization_id,
            user_id: membership.user_id,
            role: membership.role,
        }
    }
}

/// Result of removing a member
#[derive(Debug, Serialize, Deserialize)]
pub struct RemovedMember {
    pub organization_id: i64,
    pub user_id: i64,

    /// Notification delivered to the removed user
    pub notification_id: i64,
}

pub async fn list_my_memberships(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<ApiResponse<Vec<Membership>>> {
    let memberships = state.membership.list_memberships_for(identity.user_id).await?;
    Ok(ApiResponse::ok("User organizations retrieved successfully", memberships))
}

pub async fn list_members(
    State(state): State<AppState>,
    AppPath(organization_id): AppPath<i64>,
) -> ApiResult<ApiResponse<Vec<Membership>>> {
    let members = state.membership.list_members(organization_id).await?;
    Ok(ApiResponse::ok("Organization users retrieved successfully", members))
}

pub async fn get_role(
    State(state): State<AppState>,
    AppPath((organization_id, user_id)): AppPath<(i64, i64)>,
) -> ApiResult<ApiResponse<RoleResponse>> {
    let membership = state.membership.get_membership(organization_id, user_id).await?;
    Ok(ApiResponse::ok("User role retrieved successfully", RoleResponse::from(membership)))
}

/// Add a registered user to an organization
///
/// # Errors
///
/// - `400 Bad Request`: invalid role, or the user is already a member
/// - `403 Forbidden`: caller is not an owner
/// - `404 Not Found`: organization or user does not exist
pub async fn add_member(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    AppJson(req): AppJson<AddMemberRequest>,
) -> ApiResult<ApiResponse<Membership>> {
    let role = match req.role.as_deref() {
        Some(role) => role.parse::<MembershipRole>()?,
        None => MembershipRole::default(),
    };

    let membership = state
        .membership
        .add_member(identity.user_id, req.organization_id, req.user_id, role)
        .await?;

    Ok(ApiResponse::ok("Organization user created successfully", membership))
}

/// Change a member's role
///
/// # Errors
///
/// - `400 Bad Request`: invalid role, or demoting the last owner while protected
/// - `403 Forbidden`: caller is not an owner
/// - `404 Not Found`: organization or membership does not exist
pub async fn update_role(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    AppPath((organization_id, user_id)): AppPath<(i64, i64)>,
    AppJson(req): AppJson<UpdateRoleRequest>,
) -> ApiResult<ApiResponse<RoleResponse>> {
    let role = req.role.parse::<MembershipRole>()?;

    let membership = state
        .membership
        .update_role(identity.user_id, organization_id, user_id, role)
        .await?;

    Ok(ApiResponse::ok("User role updated successfully", RoleResponse::from(membership)))
}

/// Remove a member and notify them
///
/// # Errors
///
/// - `400 Bad Request`: removing the last owner while protected
/// - `403 Forbidden`: caller is not an owner
/// - `404 Not Found`: organization or membership does not exist
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    AppPath((organization_id, user_id)): AppPath<(i64, i64)>,
) -> ApiResult<ApiResponse<RemovedMember>> {
    let notification_id = state
        .membership
        .remove_member(identity.user_id, organization_id, user_id)
        .await?;

    Ok(ApiResponse::ok(
        format!(
            "User {} removed from organization {} successfully",
            user_id, organization_id
        ),
        RemovedMember {
            organization_id,
            user_id,
            notification_id,
        },
    ))
}
