use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{dto::chat_dto::ChatRequest, error::Result, AppState};

#[axum::debug_handler]
pub async fn chat_with_tutor(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let reply = state
        .tutor_service
        .explain(payload.messages, payload.context)
        .await?;
    Ok(Json(reply))
}
