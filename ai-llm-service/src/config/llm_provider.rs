use std::str::FromStr;

use crate::error_handler::ConfigError;

/// Represents the provider (backend) used for chat completions.
///
/// Both variants speak the OpenAI chat-completions wire format; they differ
/// in how the request URL is derived from the configured endpoint.
///
/// # Examples
///
/// ```
/// use ai_llm_service::config::llm_provider::LlmProvider;
///
/// let p: LlmProvider = "aiproxy".parse().unwrap();
/// assert_eq!(p, LlmProvider::AiProxy);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// OpenAI-compatible proxy; the endpoint is the full chat-completions URL.
    AiProxy,
    /// OpenAI API; `/v1/chat/completions` is appended to the endpoint base.
    OpenAI,
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aiproxy" | "ai_proxy" | "proxy" => Ok(LlmProvider::AiProxy),
            "openai" | "chatgpt" => Ok(LlmProvider::OpenAI),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}
