use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CommentListQuery {
    pub question_id: Option<uuid::Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCommentRequest {
    pub question_id: uuid::Uuid,
    #[validate(length(min = 1, max = 1000))]
    pub content: String,
    pub parent_id: Option<uuid::Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    #[validate(length(min = 1, max = 1000))]
    pub content: String,
}
