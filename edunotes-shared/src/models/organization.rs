/// Organization model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE organizations (
///     organization_id BIGSERIAL PRIMARY KEY,
///     organization_name VARCHAR(255) NOT NULL UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Memberships, invitations and notes reference an organization with
/// `ON DELETE CASCADE`, so deleting the row removes all of them.
///
/// Creating an organization together with its owner membership is done by
/// [`MembershipStore::create_organization`](crate::membership::MembershipStore::create_organization);
/// the functions here are single statements.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

/// Organization (tenant) row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Organization {
    pub organization_id: i64,

    /// Unique display name
    pub organization_name: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Organization {
    /// Inserts a new organization
    ///
    /// # Errors
    ///
    /// Returns a unique violation (`organizations_name_key`) if the name is taken
    pub async fn create(executor: impl PgExecutor<'_>, name: &str) -> Result<Self, sqlx::Error> {
        let organization = sqlx::query_as::<_, Organization>(
            r#"
            INSERT INTO organizations (organization_name)
            VALUES ($1)
            RETURNING organization_id, organization_name, created_at, updated_at
            "#,
        )
        .bind(name)
        .fetch_one(executor)
        .await?;

        Ok(organization)
    }

    /// Finds an organization by ID
    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        organization_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let organization = sqlx::query_as::<_, Organization>(
            r#"
            SELECT organization_id, organization_name, created_at, updated_at
            FROM organizations
            WHERE organization_id = $1
            "#,
        )
        .bind(organization_id)
        .fetch_optional(executor)
        .await?;

        Ok(organization)
    }

    /// Finds an organization and locks its row until the transaction ends
    ///
    /// Membership removals and role changes take this lock so that two of them
    /// on the same organization cannot both observe "another owner remains".
    /// `FOR NO KEY UPDATE` still lets concurrent inserts reference the row.
    pub async fn find_by_id_for_update(
        executor: impl PgExecutor<'_>,
        organization_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let organization = sqlx::query_as::<_, Organization>(
            r#"
            SELECT organization_id, organization_name, created_at, updated_at
            FROM organizations
            WHERE organization_id = $1
            FOR NO KEY UPDATE
            "#,
        )
        .bind(organization_id)
        .fetch_optional(executor)
        .await?;

        Ok(organization)
    }

    /// Lists every organization, oldest first
    pub async fn list(executor: impl PgExecutor<'_>) -> Result<Vec<Self>, sqlx::Error> {
        let organizations = sqlx::query_as::<_, Organization>(
            r#"
            SELECT organization_id, organization_name, created_at, updated_at
            FROM organizations
            ORDER BY organization_id ASC
            "#,
        )
        .fetch_all(executor)
        .await?;

        Ok(organizations)
    }

    /// Lists the organizations a user holds any membership in
    pub async fn list_for_user(
        executor: impl PgExecutor<'_>,
        user_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let organizations = sqlx::query_as::<_, Organization>(
            r#"
            SELECT o.organization_id, o.organization_name, o.created_at, o.updated_at
            FROM organizations o
            INNER JOIN memberships m ON m.organization_id = o.organization_id
            WHERE m.user_id = $1
            ORDER BY o.organization_id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?;

        Ok(organizations)
    }

    /// Renames an organization
    ///
    /// # Returns
    ///
    /// The updated row, or `None` if it does not exist
    pub async fn rename(
        executor: impl PgExecutor<'_>,
        organization_id: i64,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let organization = sqlx::query_as::<_, Organization>(
            r#"
            UPDATE organizations
            SET organization_name = $2, updated_at = NOW()
            WHERE organization_id = $1
            RETURNING organization_id, organization_name, created_at, updated_at
            "#,
        )
        .bind(organization_id)
        .bind(name)
        .fetch_optional(executor)
        .await?;

        Ok(organization)
    }

    /// Deletes an organization and everything it owns
    pub async fn delete(executor: impl PgExecutor<'_>, organization_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM organizations WHERE organization_id = $1")
            .bind(organization_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
