use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddFavoriteRequest {
    pub question_id: uuid::Uuid,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FavoriteListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
