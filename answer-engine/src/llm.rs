//! Seam between the resolver and the external model service.

use std::{future::Future, pin::Pin};

use ai_llm_service::OpenAiService;

use crate::error::AnswerError;

/// Chat-completion backend used when no direct answer is available.
///
/// Implement this trait to plug in another backend (or a fake in tests).
pub trait CompletionClient: Send + Sync {
    /// Sends a `(system, user)` prompt pair and returns the raw reply text.
    fn complete<'a>(
        &'a self,
        system: &'a str,
        user: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, AnswerError>> + Send + 'a>>;
}

impl CompletionClient for OpenAiService {
    fn complete<'a>(
        &'a self,
        system: &'a str,
        user: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, AnswerError>> + Send + 'a>> {
        Box::pin(async move { Ok(self.generate(user, Some(system)).await?) })
    }
}
