use crate::error::{Error, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::Duration;

const DEEPSEEK_CHAT_URL: &str = "https://api.deepseek.com/v1/chat/completions";
const DEEPSEEK_MODEL: &str = "deepseek-chat";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Question context the tutor is asked about; all parts optional, anything
/// missing is reported to the model as unknown.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatContext {
    pub title: Option<String>,
    pub content: Option<String>,
    pub user_answer: Option<String>,
    pub correct_answer: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TutorReply {
    pub reply: String,
}

#[derive(Clone)]
pub struct TutorService {
    client: Client,
    api_key: String,
}

impl TutorService {
    pub fn new(api_key: String, client: Client) -> Self {
        Self { client, api_key }
    }

    pub async fn explain(
        &self,
        messages: Vec<ChatMessage>,
        context: Option<ChatContext>,
    ) -> Result<TutorReply> {
        let context = context.unwrap_or_default();
        let system_prompt = build_system_prompt(&context);

        let mut api_messages = vec![serde_json::json!({
            "role": "system",
            "content": system_prompt,
        })];
        // Anything other than the two conversational roles is dropped so a
        // client cannot smuggle in its own system prompt.
        for message in messages
            .into_iter()
            .filter(|m| m.role == "user" || m.role == "assistant")
        {
            api_messages.push(serde_json::json!({
                "role": message.role,
                "content": message.content,
            }));
        }

        let payload = serde_json::json!({
            "model": DEEPSEEK_MODEL,
            "messages": api_messages,
            "stream": false,
        });

        let res = self
            .client
            .post(DEEPSEEK_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .timeout(Duration::from_secs(60))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            tracing::warn!("DeepSeek API returned {}", status);
            return Err(Error::Upstream(format!("DeepSeek API error: {}", status)));
        }

        let body: JsonValue = res.json().await?;
        let reply = body
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| Error::Upstream("Invalid DeepSeek response format".to_string()))?;

        Ok(TutorReply {
            reply: reply.to_string(),
        })
    }
}

fn build_system_prompt(context: &ChatContext) -> String {
    let unknown = || "Unknown".to_string();
    format!(
        "You are an expert Java Technical Interview Tutor.\n\
         Your goal is to help students understand Java concepts, analyze their mistakes, and provide clear explanations.\n\n\
         Context:\n\
         Question Title: {}\n\
         Question Content: {}\n\
         User's Answer: {}\n\
         Correct Answer: {}\n\n\
         Instructions:\n\
         1. Be encouraging and professional.\n\
         2. If the user answered incorrectly, explain WHY their answer is wrong and WHY the correct answer is right.\n\
         3. Provide a short code example if applicable.\n\
         4. Keep your response concise but informative (under 200 words if possible).\n\
         5. Use Markdown formatting.",
        context.title.clone().unwrap_or_else(unknown),
        context.content.clone().unwrap_or_else(unknown),
        context.user_answer.clone().unwrap_or_else(|| "None".to_string()),
        context.correct_answer.clone().unwrap_or_else(|| "None".to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_includes_the_question_context() {
        let prompt = build_system_prompt(&ChatContext {
            title: Some("What does volatile do?".into()),
            content: Some("Pick one".into()),
            user_answer: Some("A".into()),
            correct_answer: Some("B".into()),
        });
        assert!(prompt.contains("Question Title: What does volatile do?"));
        assert!(prompt.contains("User's Answer: A"));
        assert!(prompt.contains("Correct Answer: B"));
    }

    #[test]
    fn prompt_defaults_for_missing_context() {
        let prompt = build_system_prompt(&ChatContext::default());
        assert!(prompt.contains("Question Title: Unknown"));
        assert!(prompt.contains("User's Answer: None"));
    }
}
