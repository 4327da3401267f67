//! Provider adapters.

pub mod gemini;
pub mod http;
pub mod ollama;
pub mod openai_compat;
pub mod stub;
