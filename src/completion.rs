use crate::config::OpenAIConfig;
use crate::consts::{SUGGESTION_MAX_TOKENS, SYSTEM_PROMPT};
use crate::error::AppError;
use crate::openai_types::{OpenAIBatchResponse, OpenAIMessage, OpenAIPayload};

use async_trait::async_trait;
use tracing::{debug, error};

/// Something that turns a customer objection into a suggested reply.
#[async_trait]
pub trait Completer: Send + Sync {
    async fn suggest(&self, objection: &str) -> Result<String, AppError>;
}

pub fn objection_prompt(objection: &str) -> Vec<OpenAIMessage> {
    vec![
        OpenAIMessage::system(SYSTEM_PROMPT),
        OpenAIMessage::user(format!(
            "A prospect just raised this objection: \"{objection}\"\n\nSuggest a response the salesperson can say right now."
        )),
    ]
}

/// Chat completion client for the OpenAI API (or anything speaking its wire format).
pub struct OpenAICompleter {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
    url: String,
}

impl OpenAICompleter {
    pub fn new(http_client: reqwest::Client, config: &OpenAIConfig) -> Self {
        Self {
            http_client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            url: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl Completer for OpenAICompleter {
    async fn suggest(&self, objection: &str) -> Result<String, AppError> {
        let payload = OpenAIPayload {
            model: self.model.clone(),
            messages: objection_prompt(objection),
            max_tokens: Some(SUGGESTION_MAX_TOKENS),
        };
        let key = self.api_key.as_str();
        let resp = self
            .http_client
            .post(&self.url)
            .header(reqwest::header::AUTHORIZATION, format!("Bearer {key}"))
            .json(&payload)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                error!(error=%e, "failed to send request to OpenAI");
                AppError::Http(e)
            })?;
        let resp = resp.json::<OpenAIBatchResponse>().await.map_err(|e| {
            error!(error=%e, "failed to deserialize openai completion response");
            AppError::Http(e)
        })?;
        debug!(id=%resp.id, model=%resp.model, usage=?resp.usage, "got openai completion");

        let content = resp
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .unwrap_or_default();
        if content.is_empty() {
            return Err(AppError::EmptyCompletion);
        }
        Ok(content)
    }
}
