//! Builds the provider chain from typed settings.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use taleforge_core::rng::DeterministicRng;
use tracing::{info, warn};

use super::chain::NarrationGateway;
use crate::domain::error::GatewayError;
use crate::domain::provider::{NarrationProvider, ProviderKind};
use crate::domain::retry::RetryPolicy;
use crate::infrastructure::gemini::GeminiProvider;
use crate::infrastructure::http::build_client;
use crate::infrastructure::ollama::OllamaProvider;
use crate::infrastructure::openai_compat::OpenAiCompatProvider;
use crate::infrastructure::stub::StubProvider;

/// Everything needed to assemble the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewaySettings {
    /// Providers in priority order.
    pub order: Vec<ProviderKind>,
    /// Ollama base URL; local inference is enabled only when set.
    pub ollama_base_url: Option<String>,
    /// Ollama model.
    pub ollama_model: String,
    /// Gemini key.
    pub gemini_api_key: Option<String>,
    /// Gemini model.
    pub gemini_model: String,
    /// Groq key.
    pub groq_api_key: Option<String>,
    /// Groq model.
    pub groq_model: String,
    /// OpenAI key.
    pub openai_api_key: Option<String>,
    /// OpenAI model.
    pub openai_model: String,
    /// Attempts for the primary cloud provider.
    pub max_attempts: u32,
    /// Base backoff delay for the primary cloud provider.
    pub base_delay: Duration,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            order: vec![
                ProviderKind::LocalInference,
                ProviderKind::CloudPrimary,
                ProviderKind::CloudSecondary,
                ProviderKind::CloudTertiary,
                ProviderKind::DeterministicStub,
            ],
            ollama_base_url: None,
            ollama_model: "llama3.2".to_owned(),
            gemini_api_key: None,
            gemini_model: "gemini-2.5-flash".to_owned(),
            groq_api_key: None,
            groq_model: "llama-3.3-70b-versatile".to_owned(),
            openai_api_key: None,
            openai_model: "gpt-3.5-turbo".to_owned(),
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
        }
    }
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Assembles the chain. Providers without credentials are skipped with a
/// warning; a stub is appended when the order does not end with one.
///
/// # Errors
///
/// Returns `GatewayError::Setup` when the HTTP client cannot be built.
pub fn build_gateway(
    settings: &GatewaySettings,
    jitter: Arc<Mutex<dyn DeterministicRng + Send>>,
) -> Result<NarrationGateway, GatewayError> {
    let client = build_client()?;
    let mut gateway = NarrationGateway::new(jitter);

    for kind in &settings.order {
        let provider: Option<Arc<dyn NarrationProvider>> = match kind {
            ProviderKind::LocalInference => non_blank(settings.ollama_base_url.as_ref())
                .map(|url| -> Arc<dyn NarrationProvider> {
                    Arc::new(OllamaProvider::new(
                        client.clone(),
                        url,
                        settings.ollama_model.clone(),
                    ))
                }),
            ProviderKind::CloudPrimary => non_blank(settings.gemini_api_key.as_ref()).map(
                |key| -> Arc<dyn NarrationProvider> {
                    Arc::new(GeminiProvider::new(
                        client.clone(),
                        key,
                        settings.gemini_model.clone(),
                    ))
                },
            ),
            ProviderKind::CloudSecondary => non_blank(settings.groq_api_key.as_ref()).map(
                |key| -> Arc<dyn NarrationProvider> {
                    Arc::new(OpenAiCompatProvider::groq(
                        client.clone(),
                        key,
                        settings.groq_model.clone(),
                    ))
                },
            ),
            ProviderKind::CloudTertiary => non_blank(settings.openai_api_key.as_ref()).map(
                |key| -> Arc<dyn NarrationProvider> {
                    Arc::new(OpenAiCompatProvider::openai(
                        client.clone(),
                        key,
                        settings.openai_model.clone(),
                    ))
                },
            ),
            ProviderKind::DeterministicStub => {
                Some(Arc::new(StubProvider) as Arc<dyn NarrationProvider>)
            }
        };

        let Some(provider) = provider else {
            warn!(provider = %kind, "narration provider not configured, skipping");
            continue;
        };
        let policy = if *kind == ProviderKind::CloudPrimary {
            RetryPolicy::rate_limited(settings.max_attempts, settings.base_delay)
        } else {
            RetryPolicy::single_attempt()
        };
        gateway = gateway.with_provider(provider, policy);
    }

    if gateway.providers().last() != Some(&ProviderKind::DeterministicStub) {
        gateway = gateway.with_provider(Arc::new(StubProvider), RetryPolicy::single_attempt());
    }

    info!(providers = ?gateway.providers(), "narration gateway ready");
    Ok(gateway)
}
