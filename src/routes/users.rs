use axum::{
    extract::State,
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;

use crate::{error::Result, middleware::auth::Claims, AppState};

#[axum::debug_handler]
pub async fn get_progress(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let report = state.user_service.progress(claims.user_id()?).await?;
    Ok(Json(report))
}

#[axum::debug_handler]
pub async fn upgrade_to_pro(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.upgrade(claims.user_id()?).await?;
    Ok(Json(json!({ "message": "Upgrade successful", "user": user })))
}
