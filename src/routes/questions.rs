use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;

use crate::{
    dto::question_dto::QuestionListQuery,
    error::Result,
    middleware::auth::Claims,
    services::question_service::{QuestionFilter, QuestionService},
    AppState,
};

pub(crate) async fn caller_is_pro(state: &AppState, claims: Option<&Claims>) -> Result<bool> {
    let Some(claims) = claims else {
        return Ok(false);
    };
    let user = state.user_service.get(claims.user_id()?).await?;
    Ok(user.is_pro)
}

#[utoipa::path(
    get,
    path = "/api/questions",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("limit" = Option<i64>, Query, description = "Items per page"),
        ("category_id" = Option<Uuid>, Query, description = "Filter by category"),
        ("difficulty" = Option<String>, Query, description = "easy, medium or hard"),
        ("search" = Option<String>, Query, description = "Title substring search")
    ),
    responses(
        (status = 200, description = "Paginated question list")
    )
)]
#[axum::debug_handler]
pub async fn list_questions(
    State(state): State<AppState>,
    Query(query): Query<QuestionListQuery>,
) -> Result<impl IntoResponse> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).min(100);
    let filter = QuestionFilter {
        category_id: query.category_id,
        difficulty: query.difficulty,
        search: query.search,
        include_inactive: false,
    };
    let result = state.question_service.list(page, limit, filter).await?;
    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/api/questions/{id}",
    params(
        ("id" = Uuid, Path, description = "Question ID")
    ),
    responses(
        (status = 200, description = "Question detail"),
        (status = 403, description = "Premium question and caller is not Pro"),
        (status = 404, description = "Question not found")
    )
)]
#[axum::debug_handler]
pub async fn get_question(
    State(state): State<AppState>,
    claims: Option<Extension<Claims>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let question = state.question_service.get_and_bump_view(id).await?;

    let is_pro = caller_is_pro(&state, claims.as_ref().map(|ext| &ext.0)).await?;
    QuestionService::ensure_readable(&question, is_pro)?;

    Ok(Json(question))
}
