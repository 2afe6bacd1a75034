use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::attempt_dto::{AttemptListQuery, MarkMasteredRequest, SubmitAttemptRequest},
    error::Result,
    middleware::auth::Claims,
    routes::questions::caller_is_pro,
    AppState,
};

#[axum::debug_handler]
pub async fn submit_attempt(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SubmitAttemptRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user_id = claims.user_id()?;
    let is_pro = caller_is_pro(&state, Some(&claims)).await?;

    let result = state
        .attempt_service
        .submit(
            user_id,
            payload.question_id,
            payload.selected,
            payload.time_spent,
            is_pro,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(result)))
}

#[axum::debug_handler]
pub async fn list_my_attempts(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<AttemptListQuery>,
) -> Result<impl IntoResponse> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(50).min(200);
    let attempts = state
        .attempt_service
        .my_attempts(claims.user_id()?, query.question_id, page, limit)
        .await?;
    Ok(Json(attempts))
}

#[axum::debug_handler]
pub async fn list_mistakes(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let mistakes = state.mistake_service.list_mistakes(claims.user_id()?).await?;
    Ok(Json(mistakes))
}

#[axum::debug_handler]
pub async fn mark_mastered(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<MarkMasteredRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let attempt = state
        .mistake_service
        .mark_mastered(claims.user_id()?, payload.question_id)
        .await?;
    Ok((StatusCode::CREATED, Json(attempt)))
}
