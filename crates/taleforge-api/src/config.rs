//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use taleforge_gateway::{GatewaySettings, ProviderKind};
use taleforge_moderation::FilterLevel;
use tracing::warn;

use crate::error::AppError;

/// Everything the server needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// PostgreSQL URL; the in-memory store is used when unset.
    pub database_url: Option<String>,
    /// YAML world catalog.
    pub catalog_path: PathBuf,
    /// Moderation strictness.
    pub filter_level: FilterLevel,
    /// Narration chain settings.
    pub gateway: GatewaySettings,
}

impl AppConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when a numeric variable or the provider
    /// list cannot be parsed.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value of
    /// a variable if it is set.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when a numeric variable or the provider
    /// list cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = GatewaySettings::default();

        let port = match set("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => 3000,
        };

        let filter_level = match set("CONTENT_FILTER_LEVEL") {
            Some(raw) => raw.parse::<FilterLevel>().unwrap_or_else(|e| {
                warn!(error = %e, "unknown CONTENT_FILTER_LEVEL, using moderate");
                FilterLevel::Moderate
            }),
            None => FilterLevel::default(),
        };

        let order = match set("NARRATION_PROVIDERS") {
            Some(raw) => parse_provider_order(&raw)?,
            None => defaults.order.clone(),
        };

        let max_attempts = match set("PROVIDER_MAX_ATTEMPTS") {
            Some(raw) => raw.trim().parse::<u32>().map_err(|e| {
                AppError::Config(format!("PROVIDER_MAX_ATTEMPTS must be a valid u32: {e}"))
            })?,
            None => defaults.max_attempts,
        };

        let base_delay = match set("PROVIDER_BASE_DELAY_MS") {
            Some(raw) => Duration::from_millis(raw.trim().parse::<u64>().map_err(|e| {
                AppError::Config(format!("PROVIDER_BASE_DELAY_MS must be a valid u64: {e}"))
            })?),
            None => defaults.base_delay,
        };

        let gateway = GatewaySettings {
            order,
            ollama_base_url: set("OLLAMA_BASE_URL"),
            ollama_model: set("OLLAMA_MODEL").unwrap_or(defaults.ollama_model),
            gemini_api_key: set("GEMINI_API_KEY"),
            gemini_model: set("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            groq_api_key: set("GROQ_API_KEY"),
            groq_model: set("GROQ_MODEL").unwrap_or(defaults.groq_model),
            openai_api_key: set("OPENAI_API_KEY"),
            openai_model: set("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            max_attempts,
            base_delay,
        };

        Ok(Self {
            host: set("HOST").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port,
            database_url: set("DATABASE_URL"),
            catalog_path: set("CATALOG_PATH")
                .map_or_else(|| PathBuf::from("catalog.yaml"), PathBuf::from),
            filter_level,
            gateway,
        })
    }

    /// The socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` is not a valid address.
    pub fn bind_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

/// Parses a comma-separated provider list such as `primary,stub`.
fn parse_provider_order(raw: &str) -> Result<Vec<ProviderKind>, AppError> {
    let order = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<ProviderKind>()
                .map_err(|e| AppError::Config(format!("NARRATION_PROVIDERS: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if order.is_empty() {
        return Err(AppError::Config(
            "NARRATION_PROVIDERS must name at least one provider".to_owned(),
        ));
    }
    Ok(order)
}
