use serde::{Deserialize, Serialize};

use crate::models::question::Difficulty;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct QuestionListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub category_id: Option<uuid::Uuid>,
    pub difficulty: Option<Difficulty>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DailyQuery {
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LeaderboardQuery {
    pub limit: Option<i64>,
}
