use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
    Extension,
};

use crate::{
    dto::question_dto::DailyQuery,
    error::Result,
    middleware::auth::Claims,
    utils::time::{parse_day, today_utc},
    AppState,
};

#[axum::debug_handler]
pub async fn get_daily_challenge(
    State(state): State<AppState>,
    claims: Option<Extension<Claims>>,
    Query(query): Query<DailyQuery>,
) -> Result<impl IntoResponse> {
    let date = match query.date {
        Some(raw) => parse_day(&raw)?,
        None => today_utc(),
    };

    let user_id = match claims {
        Some(Extension(claims)) => Some(claims.user_id()?),
        None => None,
    };

    let challenge = state.daily_service.challenge(date, user_id).await?;
    Ok(Json(challenge))
}
