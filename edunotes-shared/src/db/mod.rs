/// Database layer for EduNotes
///
/// - `pool`: PostgreSQL connection pool with a startup health check
/// - `migrations`: Embedded schema migrations
///
/// Row types and queries live in the `models` module at crate root level.

pub mod migrations;
pub mod pool;
