use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// Answer-format tag stored in the `type` column. `Fill` questions are
/// free-text and never auto-graded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum QuestionType {
    Single,
    Multiple,
    Boolean,
    Fill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub question_type: QuestionType,
    /// Ordered option labels as a JSONB array; NULL for fill questions.
    pub options: Option<JsonValue>,
    pub correct_answer: String,
    pub explanation: Option<String>,
    pub difficulty: Difficulty,
    pub category_id: Option<Uuid>,
    pub tags: Option<Vec<String>>,
    pub view_count: i32,
    pub attempt_count: i32,
    pub correct_count: i32,
    pub correct_rate: f64,
    pub is_active: bool,
    pub is_premium: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Question {
    /// Option labels in stored order; tolerates non-string entries by
    /// stringifying them, and missing/non-array JSON as empty.
    pub fn option_labels(&self) -> Vec<String> {
        match &self.options {
            Some(JsonValue::Array(items)) => items
                .iter()
                .map(|v| match v {
                    JsonValue::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}
