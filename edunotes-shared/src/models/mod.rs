/// Database models for EduNotes
///
/// Row types and single-statement queries. Every function takes
/// `impl PgExecutor<'_>`, so it runs equally against the pool or inside a
/// transaction (`&mut *tx`). Multi-statement operations live in the engines
/// at crate root level.
///
/// # Models
///
/// - `user`: Accounts, with the cached score/rank columns
/// - `organization`: Organizations (tenants)
/// - `membership`: `(organization, user) -> role`
/// - `invitation`: Invitations and their state machine
/// - `note`: The feedback target
/// - `feedback`: One like/dislike per `(note, user)`
/// - `notification`: User-owned messages
///
/// # Example
///
/// ```no_run
/// use edunotes_shared::models::organization::Organization;
/// use edunotes_shared::models::membership::Membership;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let mut tx = pool.begin().await?;
/// let organization = Organization::create(&mut *tx, "Physics 101").await?;
/// let members = Membership::list_by_organization(&mut *tx, organization.organization_id).await?;
/// tx.commit().await?;
/// # Ok(())
/// # }
/// ```

pub mod feedback;
pub mod invitation;
pub mod membership;
pub mod note;
pub mod notification;
pub mod organization;
pub mod user;
