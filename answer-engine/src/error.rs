//! Typed error for the answer-engine crate.

use ai_llm_service::AiLlmError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnswerError {
    /// No usable model credentials; nothing was sent upstream.
    #[error("{0}")]
    Configuration(String),

    /// Transport failure, timeout or malformed reply from the model service.
    #[error("AI service error: {0}")]
    ExternalService(String),
}

impl From<AiLlmError> for AnswerError {
    fn from(err: AiLlmError) -> Self {
        AnswerError::ExternalService(err.to_string())
    }
}
