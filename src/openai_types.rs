use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OpenAIMessage {
    pub role: String,
    pub content: String,
}

impl OpenAIMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Serialize, Default, Debug)]
pub struct OpenAIPayload {
    pub model: String,
    pub messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Deserialize, Debug)]
pub struct OpenAIBatchResponse {
    pub id: String,
    pub model: String,
    #[serde(default)]
    pub usage: Option<OpenAIUsageStats>,
    pub choices: Vec<OpenAIBatchChoice>,
}

#[derive(Deserialize, Debug)]
pub struct OpenAIBatchChoice {
    pub message: OpenAIMessage,
    pub finish_reason: Option<String>,
    pub index: u32,
}

#[derive(Deserialize, Debug)]
pub struct OpenAIUsageStats {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}
