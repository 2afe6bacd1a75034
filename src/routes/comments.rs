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
    dto::comment_dto::{CommentListQuery, CreateCommentRequest, UpdateCommentRequest},
    error::{Error, Result},
    middleware::auth::Claims,
    AppState,
};

#[axum::debug_handler]
pub async fn list_comments(
    State(state): State<AppState>,
    Query(query): Query<CommentListQuery>,
) -> Result<impl IntoResponse> {
    let Some(question_id) = query.question_id else {
        return Err(Error::BadRequest("question_id is required".into()));
    };
    let comments = state.comment_service.list_for_question(question_id).await?;
    Ok(Json(comments))
}

#[axum::debug_handler]
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let comment = state
        .comment_service
        .create(
            claims.user_id()?,
            payload.question_id,
            &payload.content,
            payload.parent_id,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

#[axum::debug_handler]
pub async fn update_comment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCommentRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let comment = state
        .comment_service
        .update(claims.user_id()?, id, &payload.content)
        .await?;
    Ok(Json(comment))
}

#[axum::debug_handler]
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.comment_service.delete(claims.user_id()?, id).await?;
    Ok(Json(json!({ "message": "Comment deleted successfully" })))
}
