/// Middleware modules for the API server
///
/// - `auth`: bearer-token identity and operator key checks
/// - `security`: security response headers

pub mod auth;
pub mod security;
