//! Default chat-completion config loaded from environment variables.
//!
//! # Environment variables
//!
//! - `AI_PROXY_TOKEN`        = bearer token (mandatory)
//! - `AI_PROXY_URL`          = endpoint (default [`DEFAULT_AI_PROXY_URL`])
//! - `AI_PROXY_MODEL`        = model id (default [`DEFAULT_MODEL`])
//! - `AI_PROXY_TIMEOUT_SECS` = request timeout (default [`DEFAULT_TIMEOUT_SECS`])
//! - `LLM_KIND`              = `aiproxy` (default) or `openai`

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        ConfigError, Result, env_opt, must_var, opt_var_u64, validate_http_endpoint,
    },
};

pub const DEFAULT_AI_PROXY_URL: &str = "https://aiproxy.sanand.workers.dev/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Low temperature so the model returns the same literal answer across calls.
pub const ANSWER_TEMPERATURE: f32 = 0.1;

/// Builds the answering config from the process environment.
///
/// # Errors
/// See [`config_ai_proxy_with`].
pub fn config_ai_proxy() -> Result<LlmModelConfig> {
    config_ai_proxy_with(&env_opt)
}

/// Builds the answering config from an arbitrary variable lookup.
///
/// # Defaults
/// - `temperature = Some(0.1)`
/// - `timeout_secs = Some(60)`
///
/// # Errors
/// - [`ConfigError::MissingVar`] if `AI_PROXY_TOKEN` is absent
/// - [`ConfigError::UnsupportedProvider`] for an unknown `LLM_KIND`
/// - [`ConfigError::InvalidFormat`] if the endpoint is not http/https
/// - [`ConfigError::InvalidNumber`] / [`ConfigError::OutOfRange`] for a bad timeout
pub fn config_ai_proxy_with<F>(lookup: &F) -> Result<LlmModelConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let provider = match lookup("LLM_KIND") {
        Some(kind) => kind.parse::<LlmProvider>()?,
        None => LlmProvider::AiProxy,
    };

    let api_key = must_var(lookup, "AI_PROXY_TOKEN")?;

    let endpoint = lookup("AI_PROXY_URL").unwrap_or_else(|| DEFAULT_AI_PROXY_URL.to_string());
    validate_http_endpoint("AI_PROXY_URL", endpoint.trim())?;

    let model = lookup("AI_PROXY_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
    if model.trim().is_empty() {
        return Err(ConfigError::EmptyModel.into());
    }

    let timeout_secs = opt_var_u64(lookup, "AI_PROXY_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(ConfigError::OutOfRange {
            field: "AI_PROXY_TIMEOUT_SECS",
            detail: "expected at least 1 second",
        }
        .into());
    }

    Ok(LlmModelConfig {
        provider,
        model,
        endpoint: endpoint.trim().to_string(),
        api_key: Some(api_key),
        max_tokens: None,
        temperature: Some(ANSWER_TEMPERATURE),
        top_p: None,
        timeout_secs: Some(timeout_secs),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::error_handler::AiLlmError;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults_apply_when_only_token_is_set() {
        let cfg = config_ai_proxy_with(&lookup(&[("AI_PROXY_TOKEN", "t")])).unwrap();
        assert_eq!(cfg.provider, LlmProvider::AiProxy);
        assert_eq!(cfg.endpoint, DEFAULT_AI_PROXY_URL);
        assert_eq!(cfg.model, DEFAULT_MODEL);
        assert_eq!(cfg.api_key.as_deref(), Some("t"));
        assert_eq!(cfg.temperature, Some(ANSWER_TEMPERATURE));
        assert_eq!(cfg.timeout_secs, Some(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn missing_token_is_a_config_error() {
        let err = config_ai_proxy_with(&lookup(&[("AI_PROXY_URL", "http://x")])).unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Config(ConfigError::MissingVar("AI_PROXY_TOKEN"))
        ));
    }

    #[test]
    fn overrides_are_honoured() {
        let cfg = config_ai_proxy_with(&lookup(&[
            ("AI_PROXY_TOKEN", "t"),
            ("AI_PROXY_URL", " https://api.openai.com "),
            ("AI_PROXY_MODEL", "gpt-4o-mini"),
            ("AI_PROXY_TIMEOUT_SECS", "15"),
            ("LLM_KIND", "openai"),
        ]))
        .unwrap();
        assert_eq!(cfg.provider, LlmProvider::OpenAI);
        assert_eq!(cfg.endpoint, "https://api.openai.com");
        assert_eq!(cfg.model, "gpt-4o-mini");
        assert_eq!(cfg.timeout_secs, Some(15));
    }

    #[test]
    fn bad_values_are_rejected() {
        let base = [("AI_PROXY_TOKEN", "t")];
        let with = |k: &'static str, v: &'static str| {
            let mut pairs = base.to_vec();
            pairs.push((k, v));
            config_ai_proxy_with(&lookup(&pairs))
        };
        assert!(with("AI_PROXY_URL", "aiproxy.local").is_err());
        assert!(with("AI_PROXY_TIMEOUT_SECS", "soon").is_err());
        assert!(with("AI_PROXY_TIMEOUT_SECS", "0").is_err());
        assert!(with("LLM_KIND", "ollama").is_err());
        assert!(with("AI_PROXY_MODEL", "  ").is_err());
    }
}
