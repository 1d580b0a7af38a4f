use crate::config::llm_provider::LlmProvider;

/// Configuration for an LLM model invocation.
///
/// # Fields
///
/// - `provider`: Which backend to use (AI proxy or OpenAI).
/// - `model`: The model identifier (e.g., `"gpt-4"`).
/// - `endpoint`: Chat-completions URL (proxy) or API base URL (OpenAI).
/// - `api_key`: Bearer token sent in the `Authorization` header.
/// - `max_tokens`: Maximum number of tokens to generate (if supported).
/// - `temperature`: Controls randomness (0.0 = deterministic, >1.0 = more random).
/// - `top_p`: Nucleus sampling cutoff (alternative to temperature).
/// - `timeout_secs`: Request timeout in seconds; `None` means the 60s default.
///
/// # Examples
///
/// ```
/// use ai_llm_service::config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
///
/// let cfg = LlmModelConfig {
///     provider: LlmProvider::AiProxy,
///     model: "gpt-4".to_string(),
///     endpoint: "https://aiproxy.example/openai/v1/chat/completions".to_string(),
///     api_key: Some("token".to_string()),
///     max_tokens: None,
///     temperature: Some(0.1),
///     top_p: None,
///     timeout_secs: Some(60),
/// };
/// assert_eq!(cfg.model, "gpt-4");
/// ```
#[derive(Debug, Clone)]
pub struct LlmModelConfig {
    /// The LLM provider/backend.
    pub provider: LlmProvider,

    /// Model identifier string (e.g., `"gpt-4"`).
    pub model: String,

    /// Inference endpoint.
    pub endpoint: String,

    /// Optional API key for authentication.
    pub api_key: Option<String>,

    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sampling temperature (controls creativity).
    pub temperature: Option<f32>,

    /// Nucleus sampling parameter.
    pub top_p: Option<f32>,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}
