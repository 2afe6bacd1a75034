use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One graded submission. Rows are append-only; correcting a mistake means
/// appending a newer attempt, never editing this one.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Attempt {
    pub id: Uuid,
    pub user_id: Uuid,
    pub question_id: Uuid,
    pub user_answer: String,
    pub is_correct: bool,
    pub time_spent: Option<i32>,
    pub created_at: DateTime<Utc>,
}
