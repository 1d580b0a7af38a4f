//! Answer resolution: direct answers from uploaded tables first, the external
//! model only as a fallback.

use std::sync::Arc;

use ai_llm_service::{LlmModelConfig, OpenAiService};
use file_extract::FileData;
use tracing::{debug, info, instrument, warn};

use crate::{
    error::AnswerError,
    llm::CompletionClient,
    prompt::{DEFAULT_SYSTEM, build_context, build_user_prompt},
};

/// Message returned when the model would be needed but is not configured.
pub const NOT_CONFIGURED: &str = "AI Proxy Token or URL not configured";

/// Explicit resolver configuration.
///
/// `llm` is `None` when credentials were not provided; questions that need
/// the model then fail with [`AnswerError::Configuration`].
#[derive(Debug, Clone, Default)]
pub struct ResolverConfig {
    pub llm: Option<LlmModelConfig>,
}

/// Resolves a question against optional file data.
#[derive(Clone)]
pub struct Resolver {
    client: Option<Arc<dyn CompletionClient>>,
}

impl Resolver {
    /// Builds the resolver and, when credentials exist, its model client.
    ///
    /// # Errors
    /// [`AnswerError::Configuration`] if the model client rejects the config
    /// (bad endpoint, unusable token).
    pub fn new(config: ResolverConfig) -> Result<Self, AnswerError> {
        let client = match config.llm {
            Some(cfg) => {
                let svc = OpenAiService::new(cfg)
                    .map_err(|e| AnswerError::Configuration(e.to_string()))?;
                Some(Arc::new(svc) as Arc<dyn CompletionClient>)
            }
            None => {
                warn!("no model credentials configured; only direct answers will resolve");
                None
            }
        };
        Ok(Self { client })
    }

    /// Resolver with an explicit client (or none).
    pub fn with_client(client: Option<Arc<dyn CompletionClient>>) -> Self {
        Self { client }
    }

    /// `true` when a model client is available.
    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    /// Resolves `question`.
    ///
    /// Order (first match wins):
    /// 1. archive: first tabular entry, in enumeration order, with a non-empty direct answer
    /// 2. single table: its non-empty direct answer
    /// 3. no model client → [`AnswerError::Configuration`]
    /// 4. prompt the model and return the cleaned first line of its reply
    ///
    /// Steps 1–3 never contact the model.
    #[instrument(skip_all, fields(file = file.map(FileData::filename).unwrap_or("-")))]
    pub async fn resolve(
        &self,
        question: &str,
        file: Option<&FileData>,
    ) -> Result<String, AnswerError> {
        if let Some(answer) = file.and_then(direct_answer) {
            info!("answered from uploaded data");
            return Ok(answer.to_string());
        }

        let Some(client) = &self.client else {
            return Err(AnswerError::Configuration(NOT_CONFIGURED.to_string()));
        };

        let context = file.map(build_context).unwrap_or_default();
        let prompt = build_user_prompt(question, &context);
        debug!(prompt_len = prompt.len(), "prompting model");

        let reply = client.complete(DEFAULT_SYSTEM, &prompt).await?;
        let answer = clean_answer(&reply);

        info!(answer_len = answer.len(), "answered by model");
        Ok(answer)
    }
}

/// Pre-computed answer carried by the uploaded data, if any.
pub fn direct_answer(data: &FileData) -> Option<&str> {
    match data {
        FileData::Zip { contents, .. } => contents
            .tabular()
            .find_map(|(_, table)| table.non_empty_answer()),
        FileData::Tabular { content, .. } => content.non_empty_answer(),
        FileData::Generic { .. } => None,
    }
}

/// Reduces a model reply to the bare answer value.
///
/// Trims whitespace and surrounding backticks, then keeps only the first line.
pub fn clean_answer(reply: &str) -> String {
    let stripped = reply.trim().trim_matches('`').trim();
    stripped.lines().next().unwrap_or("").trim().to_string()
}
