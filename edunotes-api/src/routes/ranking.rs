/// Ranking endpoints
///
/// - `GET /ranking/my` - Caller's score and rank
/// - `GET /ranking` - Leaderboard, highest score first
/// - `GET /ranking/:user_id` - One user's score and rank
/// - `POST /ranking/:user_id/increase_score` - Operator +1
/// - `POST /ranking/:user_id/decrease_score` - Operator -1
///
/// Ranking bodies are plain objects, not the success envelope. The two
/// adjustment routes require `X-Operator-Key` and are not idempotent:
/// every call moves the score.

use crate::{app::AppState, error::ApiResult, middleware::auth::OperatorKey, response::AppPath};
use axum::{extract::State, Extension, Json};
use edunotes_shared::{
    auth::middleware::Identity,
    models::user::RankingEntry,
    reputation::{Rank, ScoreAdjustment},
};
use serde::{Deserialize, Serialize};

/// One user's standing
#[derive(Debug, Serialize, Deserialize)]
pub struct StandingResponse {
    pub username: String,
    pub score: i32,
    pub rank: Rank,
}

impl From<RankingEntry> for StandingResponse {
    fn from(entry: RankingEntry) -> Self {
        Self {
            username: entry.username,
            score: entry.score,
            rank: entry.rank,
        }
    }
}

/// Result of an operator adjustment
#[derive(Debug, Serialize, Deserialize)]
pub struct ScoreChangeResponse {
    pub message: String,
    pub new_score: i32,
    pub current_rank: Rank,
}

pub async fn my_standing(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<StandingResponse>> {
    let entry = state.reputation.standing(identity.user_id).await?;
    Ok(Json(entry.into()))
}

pub async fn leaderboard(State(state): State<AppState>) -> ApiResult<Json<Vec<RankingEntry>>> {
    Ok(Json(state.reputation.leaderboard().await?))
}

pub async fn user_standing(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<i64>,
) -> ApiResult<Json<StandingResponse>> {
    let entry = state.reputation.standing(user_id).await?;
    Ok(Json(entry.into()))
}

pub async fn increase_score(
    _operator: OperatorKey,
    State(state): State<AppState>,
    AppPath(user_id): AppPath<i64>,
) -> ApiResult<Json<ScoreChangeResponse>> {
    adjust(&state, user_id, ScoreAdjustment::Increase).await
}

pub async fn decrease_score(
    _operator: OperatorKey,
    State(state): State<AppState>,
    AppPath(user_id): AppPath<i64>,
) -> ApiResult<Json<ScoreChangeResponse>> {
    adjust(&state, user_id, ScoreAdjustment::Decrease).await
}

async fn adjust(
    state: &AppState,
    user_id: i64,
    adjustment: ScoreAdjustment,
) -> ApiResult<Json<ScoreChangeResponse>> {
    let change = state.reputation.adjust_score_direct(user_id, adjustment).await?;

    let verb = match adjustment {
        ScoreAdjustment::Increase => "increased",
        ScoreAdjustment::Decrease => "decreased",
    };

    Ok(Json(ScoreChangeResponse {
        message: format!("Score for user {} {} successfully", change.username, verb),
        new_score: change.new_score,
        current_rank: change.current_rank,
    }))
}
