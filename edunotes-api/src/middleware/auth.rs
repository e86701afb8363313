/// Request authentication
///
/// - [`require_identity`]: middleware for routes that need a logged-in user.
///   Validates the bearer token, confirms its user still exists and inserts
///   the [`Identity`] into request extensions, where handlers read it with
///   `Extension<Identity>`.
/// - [`OperatorKey`]: extractor guarding the direct score-adjustment routes.
///   Succeeds only when `X-Operator-Key` matches the configured operator key.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use edunotes_shared::{
    auth::{
        middleware::{authenticate, AuthError, Identity},
        operator::verify_operator_key,
    },
    models::user::User,
};

use crate::{app::AppState, error::ApiError};

/// Header carrying the operator key
pub const OPERATOR_KEY_HEADER: &str = "x-operator-key";

pub const OPERATOR_REQUIRED: &str = "Operator privileges required";

/// JWT authentication middleware layer
///
/// Tokens outlive `DELETE /users/me`, so the user row is checked on every
/// request; a deleted user gets the same 401 as a bad token.
pub async fn require_identity(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity: Identity = authenticate(req.headers(), state.jwt_secret())?;

    if User::find_by_id(&state.db, identity.user_id).await?.is_none() {
        return Err(AuthError::UnknownUser(identity.user_id).into());
    }

    tracing::debug!(user_id = identity.user_id, "Authenticated request");
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

/// Proof that the request presented the operator key
#[derive(Debug, Clone, Copy)]
pub struct OperatorKey;

#[axum::async_trait]
impl FromRequestParts<AppState> for OperatorKey {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // No configured key means operator routes are disabled
        let Some(digest) = state.config.operator.key_digest.as_deref() else {
            return Err(ApiError::Forbidden(OPERATOR_REQUIRED.to_string()));
        };

        let presented = parts
            .headers
            .get(OPERATOR_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if presented.is_empty() || !verify_operator_key(presented, digest) {
            tracing::warn!("Rejected operator request");
            return Err(ApiError::Forbidden(OPERATOR_REQUIRED.to_string()));
        }

        Ok(OperatorKey)
    }
}
