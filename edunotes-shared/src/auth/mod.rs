/// Identity and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing
/// - [`jwt`]: HS256 access tokens carrying `(user_id, username, email)`
/// - [`middleware`]: Bearer-token extraction into an [`middleware::Identity`]
/// - [`operator`]: Operator key digests for privileged score adjustment
/// - [`authorization`]: Role guard over the membership relation
///
/// # Example
///
/// ```no_run
/// use chrono::Duration;
/// use edunotes_shared::auth::jwt::{create_token, Claims};
/// use edunotes_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let claims = Claims::new(1, "alice", "alice@example.com", Duration::minutes(30));
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod operator;
pub mod password;
