use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::grading_service::SubmittedAnswer;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitAttemptRequest {
    pub question_id: uuid::Uuid,
    pub selected: SubmittedAnswer,
    pub time_spent: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AttemptListQuery {
    pub question_id: Option<uuid::Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MarkMasteredRequest {
    pub question_id: uuid::Uuid,
}
