/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration and login
/// - `users`: Current user profile
/// - `organizations`: Organization lifecycle
/// - `organization_users`: Membership management
/// - `invitations`: Invitation lifecycle
/// - `notes`: Like/dislike feedback
/// - `ranking`: Scores, ranks and operator adjustments
/// - `notifications`: Per-user notifications

pub mod auth;
pub mod health;
pub mod invitations;
pub mod notes;
pub mod notifications;
pub mod organization_users;
pub mod organizations;
pub mod ranking;
pub mod users;
