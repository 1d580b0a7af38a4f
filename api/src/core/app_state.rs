use std::path::PathBuf;

use ai_llm_service::{
    AiLlmError,
    config::default_config::config_ai_proxy_with,
    error_handler::{ConfigError, env_opt},
};
use answer_engine::{Resolver, ResolverConfig};
use tracing::warn;

use crate::error_handler::AppError;

pub const DEFAULT_API_ADDRESS: &str = "0.0.0.0:5000";
pub const DEFAULT_TEST_FILES_DIR: &str = "test_files";

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Direct-answer check plus model fallback.
    pub resolver: Resolver,
    /// Directory holding `extract.csv` for the `/test` endpoint.
    pub test_files_dir: PathBuf,
}

impl AppState {
    /// Load shared state from environment variables.
    ///
    /// A missing `AI_PROXY_TOKEN` is not fatal: the service still starts and
    /// answers from uploaded data, and model-backed questions report a
    /// configuration error. Malformed values (bad URL, timeout) fail startup.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(&env_opt)
    }

    pub fn from_lookup<F>(lookup: &F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let llm = match config_ai_proxy_with(lookup) {
            Ok(cfg) => Some(cfg),
            Err(AiLlmError::Config(ConfigError::MissingVar(var))) => {
                warn!(%var, "model credentials missing");
                None
            }
            Err(e) => return Err(AppError::Config(e.to_string())),
        };

        let resolver =
            Resolver::new(ResolverConfig { llm }).map_err(|e| AppError::Config(e.to_string()))?;

        Ok(Self {
            resolver,
            test_files_dir: lookup("TEST_FILES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TEST_FILES_DIR)),
        })
    }
}

/// Listen address: `API_ADDRESS`, else `0.0.0.0:$PORT`, else [`DEFAULT_API_ADDRESS`].
pub fn api_address<F>(lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup("API_ADDRESS")
        .or_else(|| lookup("PORT").map(|port| format!("0.0.0.0:{}", port.trim())))
        .unwrap_or_else(|| DEFAULT_API_ADDRESS.to_string())
}
