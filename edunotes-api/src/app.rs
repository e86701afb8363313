/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use edunotes_api::{app::{build_router, AppState}, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let app = build_router(AppState::new(pool, config));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{auth::require_identity, security::SecurityHeadersLayer},
    routes,
};
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use edunotes_shared::{
    invitations::InvitationEngine, membership::MembershipStore,
    notifications::NotificationDispatcher, reputation::ReputationEngine,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request via Axum's `State` extractor. Every field is a
/// pool handle or an `Arc`, so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    pub membership: MembershipStore,
    pub invitations: InvitationEngine,
    pub reputation: ReputationEngine,
    pub notifications: NotificationDispatcher,
}

impl AppState {
    /// Creates new application state, wiring every engine to `db`
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            membership: MembershipStore::new(db.clone(), config.membership_policy()),
            invitations: InvitationEngine::new(db.clone()),
            reputation: ReputationEngine::new(db.clone()),
            notifications: NotificationDispatcher::new(db.clone()),
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Routes
///
/// ```text
/// GET    /health                                          public
/// POST   /auth/register | /auth/login                     public
/// GET    /ranking | /ranking/:user_id                     public
/// POST   /ranking/:user_id/increase_score|decrease_score  X-Operator-Key
///
/// everything below requires a bearer token
/// GET|DELETE /users/me
/// POST|GET   /organizations,  GET /organizations/my
/// GET|PUT|DELETE /organizations/:id
/// POST   /organization_users,  GET /organization_users/me
/// GET    /organization_users/:organization_id
/// DELETE /organization_users/:organization_id/:user_id
/// GET|PUT /organization_users/:organization_id/:user_id/role
/// POST   /organization-invitations
/// GET    /organization-invitations/my | /sent
/// POST   /organization-invitations/:id/accept | /decline
/// POST   /notes/:note_id/like | /dislike
/// GET    /ranking/my
/// GET    /notifications/my,  DELETE /notifications
/// PUT    /notifications/:id/read,  DELETE /notifications/:id
/// ```
///
/// # Middleware Stack
///
/// Outermost first: security headers, CORS, request tracing, then the
/// identity layer on the protected routes only.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/ranking", get(routes::ranking::leaderboard))
        .route("/ranking/:user_id", get(routes::ranking::user_standing))
        .route("/ranking/:user_id/increase_score", post(routes::ranking::increase_score))
        .route("/ranking/:user_id/decrease_score", post(routes::ranking::decrease_score));

    let protected_routes = Router::new()
        .route(
            "/users/me",
            get(routes::users::get_me).delete(routes::users::delete_me),
        )
        .route(
            "/organizations",
            post(routes::organizations::create_organization)
                .get(routes::organizations::list_organizations),
        )
        .route("/organizations/my", get(routes::organizations::list_my_organizations))
        .route(
            "/organizations/:organization_id",
            get(routes::organizations::get_organization)
                .put(routes::organizations::rename_organization)
                .delete(routes::organizations::delete_organization),
        )
        .route("/organization_users", post(routes::organization_users::add_member))
        .route("/organization_users/me", get(routes::organization_users::list_my_memberships))
        .route(
            "/organization_users/:organization_id",
            get(routes::organization_users::list_members),
        )
        .route(
            "/organization_users/:organization_id/:user_id",
            axum::routing::delete(routes::organization_users::remove_member),
        )
        .route(
            "/organization_users/:organization_id/:user_id/role",
            get(routes::organization_users::get_role).put(routes::organization_users::update_role),
        )
        .route("/organization-invitations", post(routes::invitations::invite))
        .route("/organization-invitations/my", get(routes::invitations::list_my_invitations))
        .route("/organization-invitations/sent", get(routes::invitations::list_sent_invitations))
        .route(
            "/organization-invitations/:invitation_id/accept",
            post(routes::invitations::accept_invitation),
        )
        .route(
            "/organization-invitations/:invitation_id/decline",
            post(routes::invitations::decline_invitation),
        )
        .route("/notes/:note_id/like", post(routes::notes::like_note))
        .route("/notes/:note_id/dislike", post(routes::notes::dislike_note))
        .route("/ranking/my", get(routes::ranking::my_standing))
        .route("/notifications/my", get(routes::notifications::list_my_notifications))
        .route(
            "/notifications",
            axum::routing::delete(routes::notifications::delete_all_notifications),
        )
        .route(
            "/notifications/:notification_id/read",
            put(routes::notifications::mark_notification_read),
        )
        .route(
            "/notifications/:notification_id",
            axum::routing::delete(routes::notifications::delete_notification),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_identity,
        ));

    let cors = cors_layer(&state.config);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// CORS: permissive when `*` is configured, otherwise an explicit allow-list
fn cors_layer(config: &Config) -> CorsLayer {
    if config.api.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static(crate::middleware::auth::OPERATOR_KEY_HEADER),
        ])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
