/// Note feedback endpoints
///
/// - `POST /notes/:note_id/like`
/// - `POST /notes/:note_id/dislike`
///
/// Feedback is once per user and note, forever: a second call of either
/// kind fails with "You have already like/disliked this note".

use crate::{
    app::AppState,
    error::ApiResult,
    response::{ApiResponse, AppPath},
};
use axum::{extract::State, Extension};
use edunotes_shared::{
    auth::middleware::Identity, models::feedback::FeedbackType, reputation::FeedbackOutcome,
};

pub async fn like_note(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    AppPath(note_id): AppPath<i64>,
) -> ApiResult<ApiResponse<FeedbackOutcome>> {
    give_feedback(&state, &identity, note_id, FeedbackType::Like).await
}

pub async fn dislike_note(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    AppPath(note_id): AppPath<i64>,
) -> ApiResult<ApiResponse<FeedbackOutcome>> {
    give_feedback(&state, &identity, note_id, FeedbackType::Dislike).await
}

async fn give_feedback(
    state: &AppState,
    identity: &Identity,
    note_id: i64,
    feedback_type: FeedbackType,
) -> ApiResult<ApiResponse<FeedbackOutcome>> {
    let outcome = state
        .reputation
        .give_feedback(note_id, identity.user_id, feedback_type)
        .await?;

    let message = match feedback_type {
        FeedbackType::Like => "Note has been liked",
        FeedbackType::Dislike => "Note has been disliked",
    };

    Ok(ApiResponse::ok(message, outcome))
}
