//! HTTP client for OpenAI-compatible chat completion endpoints.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{InferenceClient, InferenceError};

/// Settings for the outbound provider call.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL of the provider, e.g. `https://api.openai.com`.
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key: String::new(),
            model: "gpt-4".to_string(),
            temperature: 0.7,
            max_tokens: 500,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Production [`InferenceClient`] talking to an OpenAI-compatible
/// chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct HttpInferenceClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpInferenceClient {
    pub fn new(config: HttpClientConfig) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("inferq/", env!("CARGO_PKG_VERSION")))
                .build()
                .expect("failed to build HTTP client"),
            config,
        }
    }

    fn classify_status(status: StatusCode, body: &str) -> InferenceError {
        // 429 is the canonical signal; some gateways put the hint only in
        // the body with a different status.
        if status == StatusCode::TOO_MANY_REQUESTS || body.to_lowercase().contains("rate_limit") {
            InferenceError::rate_limited(format!("provider returned {status}: {body}"))
        } else {
            InferenceError::provider(format!("provider returned {status}: {body}"))
        }
    }
}

#[async_trait::async_trait]
impl InferenceClient for HttpInferenceClient {
    async fn generate(&self, prompt: &str, input: &str) -> Result<String, InferenceError> {
        let url = format!("{}/v1/chat/completions", self.config.base_url);
        let full_prompt = format!("{prompt}\n\nInput: {input}");

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &full_prompt,
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        debug!(model = %self.config.model, "sending chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("inference request failed to send: {}", e);
                InferenceError::provider(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "inference provider returned error");
            return Err(Self::classify_status(status, &body));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            warn!("failed to parse inference response: {}", e);
            InferenceError::provider(format!("unparseable provider response: {e}"))
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| InferenceError::provider("provider response had no choices"))?;

        Ok(content.trim().to_owned())
    }
}
