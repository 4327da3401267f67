//! OpenAI-compatible `chat/completions` providers (Groq and OpenAI).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::http::{TEMPERATURE, decode_json};
use crate::domain::error::ProviderError;
use crate::domain::provider::{NarrationProvider, NarrationRequest, ProviderKind};

/// Groq's OpenAI-compatible endpoint.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
/// OpenAI's endpoint.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

const MAX_TOKENS: u32 = 1024;

/// A chat-completions provider.
#[derive(Debug, Clone)]
pub struct OpenAiCompatProvider {
    client: Client,
    kind: ProviderKind,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiCompatProvider {
    /// Groq as the secondary cloud provider.
    #[must_use]
    pub fn groq(client: Client, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new(client, ProviderKind::CloudSecondary, GROQ_BASE_URL, api_key, model)
    }

    /// OpenAI as the tertiary cloud provider.
    #[must_use]
    pub fn openai(client: Client, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new(client, ProviderKind::CloudTertiary, OPENAI_BASE_URL, api_key, model)
    }

    /// A provider of `kind` against any compatible `base_url`.
    #[must_use]
    pub fn new(
        client: Client,
        kind: ProviderKind,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            kind,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl NarrationProvider for OpenAiCompatProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn generate(&self, request: &NarrationRequest) -> Result<String, ProviderError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let reply: ChatResponse = decode_json(response).await?;
        reply
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| ProviderError::Parse("no choices in reply".to_owned()))
    }
}
