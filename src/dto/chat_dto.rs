use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::tutor_service::{ChatContext, ChatMessage};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub context: Option<ChatContext>,
}
