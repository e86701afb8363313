/// Organization endpoints
///
/// - `POST /organizations` - Create an organization (caller becomes owner)
/// - `GET /organizations` - List all organizations
/// - `GET /organizations/my` - List the caller's organizations
/// - `GET /organizations/:organization_id` - Get one organization
/// - `PUT /organizations/:organization_id` - Rename (owner only)
/// - `DELETE /organizations/:organization_id` - Delete (owner only)

use crate::{
    app::AppState,
    error::ApiResult,
    response::{ApiResponse, AppJson, AppPath},
};
use axum::{extract::State, Extension};
use edunotes_shared::{auth::middleware::Identity, models::organization::Organization};
use serde::Deserialize;
use validator::Validate;

/// Create or rename request
#[derive(Debug, Deserialize, Validate)]
pub struct OrganizationRequest {
    #[validate(length(min = 1, max = 100, message = "Organization name must be 1-100 characters"))]
    pub organization_name: String,
}

/// Create an organization with the caller as owner
///
/// # Errors
///
/// - `400 Bad Request`: name already taken
pub async fn create_organization(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    AppJson(req): AppJson<OrganizationRequest>,
) -> ApiResult<ApiResponse<Organization>> {
    req.validate()?;

    let organization = state
        .membership
        .create_organization(identity.user_id, req.organization_name.trim())
        .await?;

    Ok(ApiResponse::ok(
        format!("Organization {} created successfully", organization.organization_name),
        organization,
    ))
}

pub async fn list_organizations(State(state): State<AppState>) -> ApiResult<ApiResponse<Vec<Organization>>> {
    let organizations = state.membership.list_organizations().await?;
    Ok(ApiResponse::ok("Organizations retrieved successfully", organizations))
}

pub async fn list_my_organizations(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<ApiResponse<Vec<Organization>>> {
    let organizations = state.membership.list_organizations_for(identity.user_id).await?;
    Ok(ApiResponse::ok("User organizations retrieved successfully", organizations))
}

pub async fn get_organization(
    State(state): State<AppState>,
    AppPath(organization_id): AppPath<i64>,
) -> ApiResult<ApiResponse<Organization>> {
    let organization = state.membership.get_organization(organization_id).await?;
    Ok(ApiResponse::ok("Organization retrieved successfully", organization))
}

/// Rename an organization
///
/// # Errors
///
/// - `403 Forbidden`: caller is not an owner
/// - `404 Not Found`: no such organization
/// - `400 Bad Request`: name already taken
pub async fn rename_organization(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    AppPath(organization_id): AppPath<i64>,
    AppJson(req): AppJson<OrganizationRequest>,
) -> ApiResult<ApiResponse<Organization>> {
    req.validate()?;

    let organization = state
        .membership
        .rename_organization(identity.user_id, organization_id, req.organization_name.trim())
        .await?;

    Ok(ApiResponse::ok(
        format!("Organization {} updated successfully", organization.organization_name),
        organization,
    ))
}

/// Delete an organization with its memberships, invitations and notes
pub async fn delete_organization(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    AppPath(organization_id): AppPath<i64>,
) -> ApiResult<ApiResponse<()>> {
    state
        .membership
        .delete_organization(identity.user_id, organization_id)
        .await?;

    Ok(ApiResponse::message("Organization deleted successfully"))
}
