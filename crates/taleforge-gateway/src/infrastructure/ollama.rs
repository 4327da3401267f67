//! Local inference through Ollama's `/api/generate`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::http::{TEMPERATURE, decode_json};
use crate::domain::error::ProviderError;
use crate::domain::provider::{NarrationProvider, NarrationRequest, ProviderKind};

/// Token limit for a local reply.
const NUM_PREDICT: u32 = 500;

/// Ollama provider.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    options: Options,
}

#[derive(Debug, Serialize)]
struct Options {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaProvider {
    /// A provider for `model` served at `base_url`.
    #[must_use]
    pub fn new(client: Client, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            model: model.into(),
        }
    }

    fn prompt(request: &NarrationRequest) -> String {
        format!(
            "{}\n\n{}\n\nAssistant:",
            request.system_prompt, request.user_prompt
        )
    }
}

#[async_trait]
impl NarrationProvider for OllamaProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::LocalInference
    }

    async fn generate(&self, request: &NarrationRequest) -> Result<String, ProviderError> {
        let body = GenerateRequest {
            model: &self.model,
            prompt: Self::prompt(request),
            stream: false,
            options: Options {
                temperature: TEMPERATURE,
                num_predict: NUM_PREDICT,
            },
        };
        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await?;
        let reply: GenerateResponse = decode_json(response).await?;
        Ok(reply.response)
    }
}
