use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
};

use crate::{dto::question_dto::LeaderboardQuery, error::Result, AppState};

#[axum::debug_handler]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<impl IntoResponse> {
    let limit = query.limit.unwrap_or(20).min(100);
    let entries = state.leaderboard_service.top(limit).await?;
    Ok(Json(entries))
}
