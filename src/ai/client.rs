use crate::config::Config;
use crate::error::{ChainError, UpstreamError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::time::Duration;

/// Only this model accepts a reasoning effort.
const REASONING_MODEL: &str = "gpt-5";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Minimal,
    Low,
    #[default]
    Medium,
    High,
}

/// Output-shape constraint attached to a structured call.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputFormat {
    pub name: String,
    pub schema: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub instructions: String,
    pub input: String,
    pub reasoning_effort: ReasoningEffort,
    pub output_format: Option<OutputFormat>,
}

impl CompletionRequest {
    pub fn to_payload(&self) -> Value {
        let mut payload = json!({
            "model": self.model,
            "input": self.input,
            "instructions": self.instructions,
        });

        if self.model == REASONING_MODEL {
            payload["reasoning"] = json!({ "effort": self.reasoning_effort });
        }

        if let Some(format) = &self.output_format {
            payload["text"] = json!({
                "format": {
                    "type": "json_schema",
                    "name": format.name,
                    "schema": format.schema,
                    "strict": true
                }
            });
        }

        payload
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub request_id: Option<String>,
}

/// A language-model completion endpoint. One call, no retries.
#[async_trait]
pub trait ModelEndpoint: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ChainError>;
}

#[async_trait]
impl<T: ModelEndpoint + ?Sized> ModelEndpoint for Arc<T> {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ChainError> {
        (**self).complete(request).await
    }
}

/// Client for the OpenAI Responses API.
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(config: &Config) -> Result<Self, ChainError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| ChainError::Config("OPENAI_API_KEY must be set".into()))?;

        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()?,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ModelEndpoint for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ChainError> {
        let url = format!("{}/responses", self.base_url);

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request.to_payload())
            .send()
            .await
            .map_err(|e| failed_call(e, None))?;

        let request_id = res
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if !res.status().is_success() {
            let status = res.status();
            let err_text = res.text().await.unwrap_or_default();
            log::error!("API Error {status}: {err_text}");
            let message = upstream_message(&err_text)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());
            return Err(ChainError::Upstream(UpstreamError::new(
                Some(status.as_u16()),
                message,
                request_id,
            )));
        }

        let body: Value = res.json().await.map_err(|e| failed_call(e, request_id.clone()))?;
        Ok(Completion { text: extract_output_text(&body), request_id })
    }
}

/// A call that never produced a usable response (connect, timeout, decode)
/// still counts as an endpoint failure.
fn failed_call(e: reqwest::Error, request_id: Option<String>) -> ChainError {
    log::error!("API call failed: {e}");
    ChainError::Upstream(UpstreamError::new(e.status().map(|s| s.as_u16()), e.to_string(), request_id))
}

fn upstream_message(body: &str) -> Option<String> {
    if let Ok(v) = serde_json::from_str::<Value>(body) {
        if let Some(msg) = v["error"]["message"].as_str().filter(|m| !m.is_empty()) {
            return Some(msg.to_string());
        }
    }
    let trimmed = body.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Generated text of a Responses API body. Falls back to the pretty-printed
/// body when no text part is present.
pub fn extract_output_text(body: &Value) -> String {
    if let Some(text) = body["output_text"].as_str() {
        return text.to_string();
    }

    let parts: Vec<&str> = body["output"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|item| item["content"].as_array())
        .flatten()
        .filter(|part| part["type"] == "output_text")
        .filter_map(|part| part["text"].as_str())
        .collect();

    if parts.is_empty() {
        serde_json::to_string_pretty(body).unwrap_or_default()
    } else {
        parts.concat()
    }
}
