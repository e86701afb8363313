/// Membership model: the `(organization, user) -> role` relation
///
/// # Schema
///
/// ```sql
/// CREATE TYPE membership_role AS ENUM ('owner', 'user');
///
/// CREATE TABLE memberships (
///     organization_id BIGINT NOT NULL REFERENCES organizations ON DELETE CASCADE,
///     user_id BIGINT NOT NULL REFERENCES users ON DELETE CASCADE,
///     role membership_role NOT NULL DEFAULT 'user',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (organization_id, user_id)
/// );
/// ```
///
/// The composite primary key makes each pair unique by construction.
///
/// # Roles
///
/// There are exactly two roles and they are not ordered: owner-gated actions
/// compare for equality with [`MembershipRole::Owner`].
///
/// # Example
///
/// ```no_run
/// use edunotes_shared::models::membership::{CreateMembership, Membership, MembershipRole};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// Membership::create(&pool, CreateMembership {
///     organization_id: 1,
///     user_id: 2,
///     role: MembershipRole::User,
/// }).await?;
///
/// assert_eq!(Membership::get_role(&pool, 1, 2).await?, Some(MembershipRole::User));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Role held within an organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "membership_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MembershipRole {
    /// Manages members, invitations and the organization itself
    Owner,

    /// Regular member
    User,
}

impl MembershipRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipRole::Owner => "owner",
            MembershipRole::User => "user",
        }
    }
}

impl Default for MembershipRole {
    fn default() -> Self {
        MembershipRole::User
    }
}

impl fmt::Display for MembershipRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MembershipRole {
    type Err = DomainError;

    /// Parses `"owner"` or `"user"` exactly
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(MembershipRole::Owner),
            "user" => Ok(MembershipRole::User),
            other => Err(DomainError::InvalidInput(format!("Invalid role: {}", other))),
        }
    }
}

/// Membership row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    pub organization_id: i64,
    pub user_id: i64,
    pub role: MembershipRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a membership
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMembership {
    pub organization_id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub role: MembershipRole,
}

impl Membership {
    /// Inserts a membership
    ///
    /// # Errors
    ///
    /// Returns a unique violation if the pair already exists, or a foreign key
    /// violation if the organization or user does not.
    pub async fn create(executor: impl PgExecutor<'_>, data: CreateMembership) -> Result<Self, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO memberships (organization_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING organization_id, user_id, role, created_at, updated_at
            "#,
        )
        .bind(data.organization_id)
        .bind(data.user_id)
        .bind(data.role)
        .fetch_one(executor)
        .await?;

        Ok(membership)
    }

    /// Finds the membership for a pair
    pub async fn find(
        executor: impl PgExecutor<'_>,
        organization_id: i64,
        user_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            SELECT organization_id, user_id, role, created_at, updated_at
            FROM memberships
            WHERE organization_id = $1 AND user_id = $2
            "#,
        )
        .bind(organization_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(membership)
    }

    /// Gets a user's role in an organization, `None` if not a member
    pub async fn get_role(
        executor: impl PgExecutor<'_>,
        organization_id: i64,
        user_id: i64,
    ) -> Result<Option<MembershipRole>, sqlx::Error> {
        let role = sqlx::query_scalar::<_, MembershipRole>(
            "SELECT role FROM memberships WHERE organization_id = $1 AND user_id = $2",
        )
        .bind(organization_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(role)
    }

    /// Gets a role and holds a share lock on the row until the transaction ends
    ///
    /// A concurrent demotion or removal of this member blocks until the
    /// guarded mutation commits.
    pub async fn get_role_for_share(
        executor: impl PgExecutor<'_>,
        organization_id: i64,
        user_id: i64,
    ) -> Result<Option<MembershipRole>, sqlx::Error> {
        let role = sqlx::query_scalar::<_, MembershipRole>(
            r#"
            SELECT role FROM memberships
            WHERE organization_id = $1 AND user_id = $2
            FOR SHARE
            "#,
        )
        .bind(organization_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(role)
    }

    /// Checks whether a pair exists
    pub async fn exists(
        executor: impl PgExecutor<'_>,
        organization_id: i64,
        user_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM memberships
                WHERE organization_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(organization_id)
        .bind(user_id)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }

    /// Changes a member's role
    ///
    /// # Returns
    ///
    /// The updated membership, or `None` if the pair does not exist
    pub async fn update_role(
        executor: impl PgExecutor<'_>,
        organization_id: i64,
        user_id: i64,
        role: MembershipRole,
    ) -> Result<Option<Self>, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            UPDATE memberships
            SET role = $3, updated_at = NOW()
            WHERE organization_id = $1 AND user_id = $2
            RETURNING organization_id, user_id, role, created_at, updated_at
            "#,
        )
        .bind(organization_id)
        .bind(user_id)
        .bind(role)
        .fetch_optional(executor)
        .await?;

        Ok(membership)
    }

    /// Deletes a membership
    ///
    /// # Returns
    ///
    /// `true` if the pair existed
    pub async fn delete(
        executor: impl PgExecutor<'_>,
        organization_id: i64,
        user_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM memberships WHERE organization_id = $1 AND user_id = $2")
            .bind(organization_id)
            .bind(user_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists the members of an organization, oldest first
    pub async fn list_by_organization(
        executor: impl PgExecutor<'_>,
        organization_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let memberships = sqlx::query_as::<_, Membership>(
            r#"
            SELECT organization_id, user_id, role, created_at, updated_at
            FROM memberships
            WHERE organization_id = $1
            ORDER BY created_at ASC, user_id ASC
            "#,
        )
        .bind(organization_id)
        .fetch_all(executor)
        .await?;

        Ok(memberships)
    }

    /// Lists a user's memberships across organizations
    pub async fn list_by_user(executor: impl PgExecutor<'_>, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let memberships = sqlx::query_as::<_, Membership>(
            r#"
            SELECT organization_id, user_id, role, created_at, updated_at
            FROM memberships
            WHERE user_id = $1
            ORDER BY organization_id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?;

        Ok(memberships)
    }

    /// Counts the owners of an organization
    pub async fn count_owners(executor: impl PgExecutor<'_>, organization_id: i64) -> Result<i64, sqlx::Error> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM memberships WHERE organization_id = $1 AND role = 'owner'",
        )
        .bind(organization_id)
        .fetch_one(executor)
        .await?;

        Ok(count)
    }
}
