/// Authorization guard
///
/// Organization-scoped mutations call [`require_role`] before writing. The
/// check reads the caller's membership row with `FOR SHARE`, so when it runs
/// inside the mutation's transaction a concurrent demotion or removal of the
/// caller cannot slip in between the check and the write.
///
/// Roles compare by equality: `user` never satisfies an `owner` requirement.
///
/// # Example
///
/// ```no_run
/// use edunotes_shared::auth::authorization::require_role;
/// use edunotes_shared::models::membership::MembershipRole;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let mut tx = pool.begin().await?;
/// require_role(&mut *tx, 1, 42, MembershipRole::Owner).await?;
/// // ... guarded writes on &mut *tx ...
/// tx.commit().await?;
/// # Ok(())
/// # }
/// ```

use sqlx::PgExecutor;

use crate::error::DomainError;
use crate::models::membership::{Membership, MembershipRole};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// User holds no membership in the organization
    #[error("Not a member of organization {0}")]
    NotMember(i64),

    /// User is a member with a different role
    #[error("Insufficient permissions: requires {required}, has {actual}")]
    InsufficientRole {
        required: MembershipRole,
        actual: MembershipRole,
    },

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl AuthzError {
    /// Converts a denial into `DomainError::Forbidden` carrying `detail`
    ///
    /// Database failures stay database failures.
    pub fn forbidden(self, detail: &str) -> DomainError {
        match self {
            AuthzError::DatabaseError(e) => DomainError::Database(e),
            AuthzError::NotMember(_) | AuthzError::InsufficientRole { .. } => {
                DomainError::forbidden(detail)
            }
        }
    }
}

/// Requires `user_id` to hold exactly `required` in `organization_id`
///
/// # Returns
///
/// The caller's role on success
///
/// # Errors
///
/// - `AuthzError::NotMember` if the user has no membership
/// - `AuthzError::InsufficientRole` if the role differs
pub async fn require_role(
    executor: impl PgExecutor<'_>,
    organization_id: i64,
    user_id: i64,
    required: MembershipRole,
) -> Result<MembershipRole, AuthzError> {
    let actual = Membership::get_role_for_share(executor, organization_id, user_id)
        .await?
        .ok_or(AuthzError::NotMember(organization_id))?;

    check_role(actual, required)
}

/// Requires any membership in `organization_id`
pub async fn require_membership(
    executor: impl PgExecutor<'_>,
    organization_id: i64,
    user_id: i64,
) -> Result<MembershipRole, AuthzError> {
    Membership::get_role_for_share(executor, organization_id, user_id)
        .await?
        .ok_or(AuthzError::NotMember(organization_id))
}

/// Exact-match role comparison
pub fn check_role(actual: MembershipRole, required: MembershipRole) -> Result<MembershipRole, AuthzError> {
    if actual != required {
        return Err(AuthzError::InsufficientRole { required, actual });
    }

    Ok(actual)
}
