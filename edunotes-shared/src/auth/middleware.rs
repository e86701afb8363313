/// Bearer-token identity extraction
///
/// Turns an `Authorization: Bearer <token>` header into the verified
/// [`Identity`] every authenticated request carries. The HTTP layer wraps
/// this in an axum middleware that inserts the identity into request
/// extensions; handlers read it with `Extension<Identity>`.
///
/// # Example
///
/// ```
/// use axum::http::{header, HeaderMap, HeaderValue};
/// use chrono::Duration;
/// use edunotes_shared::auth::jwt::{create_token, Claims};
/// use edunotes_shared::auth::middleware::authenticate;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "your-secret-key-at-least-32-bytes";
/// let token = create_token(&Claims::new(1, "alice", "alice@example.com", Duration::minutes(5)), secret)?;
///
/// let mut headers = HeaderMap::new();
/// headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token))?);
///
/// let identity = authenticate(&headers, secret)?;
/// assert_eq!(identity.username, "alice");
/// # Ok(())
/// # }
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};

use super::jwt::{validate_token, Claims, JwtError};

/// Verified identity attached to each authenticated request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
    pub email: String,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.sub,
            email: claims.email,
        }
    }
}

/// Error type for identity extraction
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header, or not a Bearer credential
    #[error("Not authenticated")]
    MissingCredentials,

    /// Token failed validation
    #[error("Could not validate credentials")]
    InvalidToken(#[from] JwtError),

    /// Token is valid but its user has since been deleted
    #[error("Could not validate credentials")]
    UnknownUser(i64),
}

/// Extracts and validates the bearer token from `headers`
///
/// # Errors
///
/// - `AuthError::MissingCredentials` when the header is absent or not `Bearer`
/// - `AuthError::InvalidToken` when the token is expired, forged or malformed
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<Identity, AuthError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingCredentials)?;

    let claims = validate_token(token, secret)?;

    Ok(Identity::from(claims))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::create_token;
    use axum::http::HeaderValue;
    use chrono::Duration;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_authenticate_valid_token() {
        let claims = Claims::new(9, "carol", "carol@example.com", Duration::minutes(5));
        let token = create_token(&claims, SECRET).unwrap();

        let identity = authenticate(&headers_with(&format!("Bearer {}", token)), SECRET).unwrap();
        assert_eq!(
            identity,
            Identity {
                user_id: 9,
                username: "carol".to_string(),
                email: "carol@example.com".to_string(),
            }
        );
    }

    #[test]
    fn test_authenticate_missing_header() {
        let result = authenticate(&HeaderMap::new(), SECRET);
        assert!(matches!(result, Err(AuthError::MissingCredentials)));
    }

    #[test]
    fn test_authenticate_wrong_scheme() {
        let result = authenticate(&headers_with("Basic dXNlcjpwYXNz"), SECRET);
        assert!(matches!(result, Err(AuthError::MissingCredentials)));

        let result = authenticate(&headers_with("Bearer "), SECRET);
        assert!(matches!(result, Err(AuthError::MissingCredentials)));
    }

    #[test]
    fn test_authenticate_invalid_token() {
        let result = authenticate(&headers_with("Bearer not.a.jwt"), SECRET);
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
        assert_eq!(
            result.unwrap_err().to_string(),
            "Could not validate credentials"
        );
    }
}
