//! OpenAI-compatible chat-completion service.
//!
//! Minimal, non-streaming client around the chat-completions REST shape. The
//! request URL is derived from `LlmModelConfig::endpoint`:
//! - [`LlmProvider::AiProxy`]: the endpoint is used as-is
//! - [`LlmProvider::OpenAI`]: POST {endpoint}/v1/chat/completions
//!
//! Constructor validation:
//! - `cfg.api_key` must be present
//! - `cfg.endpoint` must start with http:// or https://
//!
//! Errors are normalized via unified error types in `error_handler`.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::{
    config::{
        default_config::DEFAULT_TIMEOUT_SECS, llm_model_config::LlmModelConfig,
        llm_provider::LlmProvider,
    },
    error_handler::{AiLlmError, HttpError, ProviderError, ProviderErrorKind, make_snippet},
};

/// Thin client for an OpenAI-compatible chat-completions API.
///
/// Constructed from a complete [`LlmModelConfig`]. Internally keeps a
/// preconfigured `reqwest::Client` (with timeout and default headers).
#[derive(Debug)]
pub struct OpenAiService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_chat: String,
    timeout: Duration,
}

impl OpenAiService {
    /// Creates a new [`OpenAiService`] from the given config.
    ///
    /// # Errors
    /// - [`AiLlmError::Provider`] with `MissingApiKey` if `cfg.api_key` is `None`
    /// - [`AiLlmError::Provider`] with `InvalidEndpoint` if `cfg.endpoint` is invalid
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        // 1) API key must be present.
        let api_key = cfg
            .api_key
            .clone()
            .ok_or_else(|| ProviderError::new(cfg.provider, ProviderErrorKind::MissingApiKey))?;

        // 2) Endpoint must use http/https.
        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(ProviderError::new(
                cfg.provider,
                ProviderErrorKind::InvalidEndpoint(cfg.endpoint.clone()),
            )
            .into());
        }

        // 3) HTTP client: timeout + default headers.
        let timeout = Duration::from_secs(cfg.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|e| {
                ProviderError::new(
                    cfg.provider,
                    ProviderErrorKind::Decode(format!("invalid API key header: {e}")),
                )
            })?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let url_chat = chat_url(cfg.provider, endpoint);

        info!(
            provider = ?cfg.provider,
            model = %cfg.model,
            url = %url_chat,
            timeout_secs = timeout.as_secs(),
            "OpenAiService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_chat,
            timeout,
        })
    }

    /// Performs a **non-streaming** chat completion request.
    ///
    /// `messages` = optional system message + user message with `prompt`.
    /// Mapped options from config: `model`, `temperature`, `top_p`, `max_tokens`.
    /// Returns the content of the first choice.
    ///
    /// # Errors
    /// - [`AiLlmError::Timeout`] when the configured timeout elapses
    /// - [`AiLlmError::Provider`] with `HttpStatus` for non-2xx responses
    /// - [`AiLlmError::HttpTransport`] for client/network failures
    /// - [`AiLlmError::Provider`] with `Decode` if the JSON cannot be parsed
    /// - [`AiLlmError::Provider`] with `EmptyChoices` if no content is returned
    pub async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, AiLlmError> {
        let started = Instant::now();
        let body = ChatCompletionRequest::from_cfg(&self.cfg, prompt, system);

        debug!(
            model = %self.cfg.model,
            prompt_len = prompt.len(),
            has_system = system.is_some(),
            "POST {}", self.url_chat
        );

        let resp = self
            .client
            .post(&self.url_chat)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            let url = self.url_chat.clone();
            let snippet = make_snippet(&text);

            error!(
                %status,
                %url,
                %snippet,
                model = %self.cfg.model,
                latency_ms = started.elapsed().as_millis(),
                "chat completions returned non-success status"
            );

            return Err(ProviderError::new(
                self.cfg.provider,
                ProviderErrorKind::HttpStatus(HttpError {
                    status,
                    url,
                    snippet,
                }),
            )
            .into());
        }

        let out: ChatCompletionResponse = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(e) => {
                error!(
                    error = %e,
                    model = %self.cfg.model,
                    latency_ms = started.elapsed().as_millis(),
                    "failed to decode chat completions response"
                );
                return Err(ProviderError::new(
                    self.cfg.provider,
                    ProviderErrorKind::Decode(format!(
                        "serde error: {e}; expected `choices[0].message.content`"
                    )),
                )
                .into());
            }
        };

        let content = out
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::new(self.cfg.provider, ProviderErrorKind::EmptyChoices))?;

        info!(
            model = %self.cfg.model,
            latency_ms = started.elapsed().as_millis(),
            "chat completion completed"
        );

        Ok(content)
    }

    fn transport_error(&self, e: reqwest::Error) -> AiLlmError {
        if e.is_timeout() {
            error!(timeout = ?self.timeout, url = %self.url_chat, "chat completion timed out");
            AiLlmError::Timeout(self.timeout)
        } else {
            error!(error = %e, url = %self.url_chat, "chat completion transport failure");
            AiLlmError::HttpTransport(e)
        }
    }
}

/// Full chat-completions URL for the provider.
fn chat_url(provider: LlmProvider, endpoint: &str) -> String {
    match provider {
        LlmProvider::AiProxy => endpoint.to_string(),
        LlmProvider::OpenAI => {
            format!("{}/v1/chat/completions", endpoint.trim_end_matches('/'))
        }
    }
}

/* ===========================================================================
HTTP payloads & options
======================================================================== */

/// Minimal request body for chat completions (non-streaming).
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

impl<'a> ChatCompletionRequest<'a> {
    /// Builds a minimal chat request from config, `prompt`, and an optional system message.
    fn from_cfg(cfg: &'a LlmModelConfig, prompt: &'a str, system: Option<&'a str>) -> Self {
        let mut messages = Vec::with_capacity(2);
        if let Some(sys) = system {
            messages.push(ChatMessage {
                role: "system",
                content: sys,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });

        Self {
            model: &cfg.model,
            messages,
            temperature: cfg.temperature,
            top_p: cfg.top_p,
            max_tokens: cfg.max_tokens,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Minimal response for chat completions.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageOut,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Json, Router, extract::State, http::HeaderMap, http::StatusCode, routing::post};
    use serde_json::{Value, json};

    use super::*;

    #[derive(Clone, Default)]
    struct Seen {
        bodies: Arc<Mutex<Vec<Value>>>,
        auth: Arc<Mutex<Vec<String>>>,
    }

    /// Serves `reply` with `status` on `/chat` and records what it receives.
    async fn serve(status: StatusCode, reply: String) -> (String, Seen) {
        let seen = Seen::default();
        let app = Router::new()
            .route(
                "/chat",
                post(
                    move |State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>| {
                        let reply = reply.clone();
                        async move {
                            seen.bodies.lock().unwrap().push(body);
                            if let Some(a) = headers.get("authorization") {
                                seen.auth.lock().unwrap().push(a.to_str().unwrap().to_string());
                            }
                            (status, reply)
                        }
                    },
                ),
            )
            .with_state(seen.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/chat"), seen)
    }

    fn cfg(endpoint: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::AiProxy,
            model: "gpt-4".into(),
            endpoint: endpoint.into(),
            api_key: Some("secret".into()),
            max_tokens: None,
            temperature: Some(0.1),
            top_p: None,
            timeout_secs: Some(5),
        }
    }

    #[tokio::test]
    async fn sends_two_messages_and_returns_first_choice() {
        let reply = json!({
            "choices": [
                {"message": {"content": "first"}},
                {"message": {"content": "second"}}
            ]
        })
        .to_string();
        let (url, seen) = serve(StatusCode::OK, reply).await;

        let svc = OpenAiService::new(cfg(&url)).unwrap();
        let out = svc.generate("user prompt", Some("system prompt")).await.unwrap();
        assert_eq!(out, "first");

        let bodies = seen.bodies.lock().unwrap();
        let body = &bodies[0];
        assert_eq!(body["model"], "gpt-4");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "user prompt");
        assert!((body["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
        assert_eq!(seen.auth.lock().unwrap()[0], "Bearer secret");
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let (url, _) = serve(StatusCode::UNAUTHORIZED, "bad token".into()).await;
        let svc = OpenAiService::new(cfg(&url)).unwrap();
        let err = svc.generate("p", None).await.unwrap_err();
        match err {
            AiLlmError::Provider(ProviderError {
                kind: ProviderErrorKind::HttpStatus(h),
                ..
            }) => {
                assert_eq!(h.status, StatusCode::UNAUTHORIZED);
                assert_eq!(h.snippet, "bad token");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unexpected_shape_fails_closed() {
        let (url, _) = serve(StatusCode::OK, json!({"result": "42"}).to_string()).await;
        let svc = OpenAiService::new(cfg(&url)).unwrap();
        let err = svc.generate("p", None).await.unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Provider(ProviderError {
                kind: ProviderErrorKind::Decode(_),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn empty_choices_fail_closed() {
        let (url, _) = serve(StatusCode::OK, json!({"choices": []}).to_string()).await;
        let svc = OpenAiService::new(cfg(&url)).unwrap();
        let err = svc.generate("p", None).await.unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Provider(ProviderError {
                kind: ProviderErrorKind::EmptyChoices,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let svc = OpenAiService::new(cfg(&format!("http://{addr}/chat"))).unwrap();
        let err = svc.generate("p", None).await.unwrap_err();
        assert!(matches!(err, AiLlmError::HttpTransport(_)));
    }

    #[tokio::test]
    async fn slow_upstream_hits_the_timeout() {
        let app = Router::new().route(
            "/chat",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "too late"
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let mut slow = cfg(&format!("http://{addr}/chat"));
        slow.timeout_secs = Some(1);
        let svc = OpenAiService::new(slow).unwrap();

        let started = Instant::now();
        let err = svc.generate("p", None).await.unwrap_err();
        assert!(matches!(err, AiLlmError::Timeout(d) if d == Duration::from_secs(1)));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn constructor_validates_key_and_endpoint() {
        let mut no_key = cfg("http://localhost/chat");
        no_key.api_key = None;
        assert!(OpenAiService::new(no_key).is_err());
        assert!(OpenAiService::new(cfg("localhost/chat")).is_err());
    }

    #[test]
    fn openai_provider_appends_path() {
        assert_eq!(
            chat_url(LlmProvider::OpenAI, "https://api.openai.com/"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            chat_url(LlmProvider::AiProxy, "https://proxy/openai/v1/chat/completions"),
            "https://proxy/openai/v1/chat/completions"
        );
    }
}
