use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::favorite_dto::{AddFavoriteRequest, FavoriteListQuery},
    error::Result,
    middleware::auth::Claims,
    AppState,
};

#[axum::debug_handler]
pub async fn add_favorite(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AddFavoriteRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let favorite = state
        .favorite_service
        .add(claims.user_id()?, payload.question_id, payload.notes)
        .await?;
    Ok((StatusCode::CREATED, Json(favorite)))
}

#[axum::debug_handler]
pub async fn list_favorites(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<FavoriteListQuery>,
) -> Result<impl IntoResponse> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).min(100);
    let favorites = state
        .favorite_service
        .list(claims.user_id()?, page, limit)
        .await?;
    Ok(Json(favorites))
}

#[axum::debug_handler]
pub async fn check_favorite(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(question_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let is_favorite = state
        .favorite_service
        .is_favorite(claims.user_id()?, question_id)
        .await?;
    Ok(Json(json!({ "is_favorite": is_favorite })))
}

#[axum::debug_handler]
pub async fn remove_favorite(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(question_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state
        .favorite_service
        .remove(claims.user_id()?, question_id)
        .await?;
    Ok(Json(json!({ "message": "Favorite removed successfully" })))
}
