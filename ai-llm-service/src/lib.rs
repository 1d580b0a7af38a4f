//! Chat-completion client for the external model proxy.
//!
//! - [`config`]: model config, provider kind, env-driven defaults
//! - [`services::open_ai_service::OpenAiService`]: non-streaming chat completions
//! - [`error_handler`]: unified [`AiLlmError`] and env/validation helpers
//! - [`telemetry`]: `tracing` layer and filters used by the binary

pub mod config {
    pub mod default_config;
    pub mod llm_model_config;
    pub mod llm_provider;
}

pub mod services {
    pub mod open_ai_service;
}

pub mod error_handler;
pub mod telemetry;

pub use config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
pub use error_handler::AiLlmError;
pub use services::open_ai_service::OpenAiService;
