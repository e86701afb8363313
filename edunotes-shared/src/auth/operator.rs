/// Operator key verification
///
/// Direct score adjustment is a privileged operation. Callers prove operator
/// status by presenting a shared key; the server keeps only its SHA-256
/// digest and compares digests in constant time.
///
/// # Example
///
/// ```
/// use edunotes_shared::auth::operator::{hash_operator_key, verify_operator_key};
///
/// let stored = hash_operator_key("operator-secret");
/// assert!(verify_operator_key("operator-secret", &stored));
/// assert!(!verify_operator_key("guess", &stored));
/// ```

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 digest of an operator key (64 characters)
pub fn hash_operator_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Checks a presented key against a stored digest
pub fn verify_operator_key(presented: &str, stored_digest: &str) -> bool {
    constant_time_compare(&hash_operator_key(presented), stored_digest)
}

/// Compares two strings without short-circuiting on the first difference
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
