//! # EduNotes Shared Library
//!
//! This crate contains the data model and business logic behind the EduNotes
//! API server: who may act on behalf of an organization, how external users
//! join it, and how a user's standing is derived from peer feedback.
//!
//! ## Module Organization
//!
//! - `db`: Connection pool and embedded migrations
//! - `models`: Row types and single-statement queries
//! - `auth`: Identity (JWT, password hashing, operator key) and the authorization guard
//! - `membership`: Membership store and organization lifecycle
//! - `invitations`: Invitation engine (pending/accepted/declined)
//! - `reputation`: Feedback processing, score and rank
//! - `notifications`: Notification dispatcher
//! - `error`: Domain error taxonomy

pub mod auth;
pub mod db;
pub mod error;
pub mod invitations;
pub mod membership;
pub mod models;
pub mod notifications;
pub mod reputation;

/// Current version of the EduNotes shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
