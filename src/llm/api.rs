//! OpenAI-compatible HTTP clients for the chat and vision models.
//!
//! Both call `{base_url}/v1/chat/completions`: Ollama (OpenAI mode),
//! OpenAI, Groq, LM Studio, vLLM, etc.  Endpoints, keys, models and limits
//! come from config; the vision limits fall back to the constants below when
//! a camera entry leaves them unset.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::{CameraConfig, InterfaceConfig};
use crate::llm::capability::{ChatMessage, ChatModel, ChatReply, LlmError, VisionModel};
use crate::vision::Frame;

/// Default token cap for vision replies; coordinates and short descriptions fit.
const VISION_MAX_TOKENS: u32 = 300;

/// Default per-request timeout for vision calls.
const VISION_TIMEOUT_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// Shared plumbing
// ---------------------------------------------------------------------------

fn build_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_else(|e| {
            log::warn!(
                "http client setup failed ({e}); falling back to defaults without the {timeout_secs}s timeout"
            );
            reqwest::Client::new()
        })
}

fn completions_url(base_url: &str) -> String {
    format!("{}/v1/chat/completions", base_url.trim_end_matches('/'))
}

/// POST `body` and return the `choices[0].message.content` value.
///
/// The `Authorization: Bearer …` header is attached only when `api_key` is
/// non-empty, so local providers without auth work unchanged.
async fn post_completion(
    client: &reqwest::Client,
    url: &str,
    api_key: Option<&str>,
    body: &Value,
) -> Result<Value, LlmError> {
    let mut req = client.post(url).json(body);

    let key = api_key.unwrap_or("");
    if !key.is_empty() {
        req = req.bearer_auth(key);
    }

    let response = req.send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(LlmError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let mut json: Value = response
        .json()
        .await
        .map_err(|e| LlmError::Parse(e.to_string()))?;

    Ok(json
        .pointer_mut("/choices/0/message/content")
        .map(Value::take)
        .unwrap_or(Value::Null))
}

/// Plain text content, trimmed; empty or missing content is an error.
fn text_content(content: Value) -> Result<String, LlmError> {
    let text = content
        .as_str()
        .ok_or(LlmError::EmptyResponse)?
        .trim()
        .to_string();

    if text.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(text)
}

// ---------------------------------------------------------------------------
// ApiChat
// ---------------------------------------------------------------------------

/// Conversational model behind an OpenAI-compatible endpoint.
pub struct ApiChat {
    client: reqwest::Client,
    config: InterfaceConfig,
}

impl ApiChat {
    /// Build from the interface config.  The HTTP client carries the
    /// per-request timeout from `config.timeout_secs`.
    pub fn from_config(config: &InterfaceConfig) -> Self {
        Self {
            client: build_client(config.timeout_secs),
            config: config.clone(),
        }
    }

    fn request_body(&self, messages: &[ChatMessage]) -> Value {
        json!({
            "model":       self.config.model,
            "messages":    messages,
            "stream":      false,
            "temperature": self.config.temperature,
            "max_tokens":  self.config.max_tokens
        })
    }
}

#[async_trait]
impl ChatModel for ApiChat {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<ChatReply, LlmError> {
        let url = completions_url(&self.config.base_url);
        let body = self.request_body(messages);

        let content =
            post_completion(&self.client, &url, self.config.api_key.as_deref(), &body).await?;

        match content {
            Value::Object(_) => Ok(ChatReply::Structured(content)),
            other => text_content(other).map(ChatReply::Text),
        }
    }
}

// ---------------------------------------------------------------------------
// ApiVision
// ---------------------------------------------------------------------------

/// Vision-language model for one camera.
pub struct ApiVision {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
}

impl ApiVision {
    /// Build from a camera entry.  Returns `None` for inactive cameras
    /// (model, key or endpoint missing).
    pub fn from_config(camera: &CameraConfig) -> Option<Self> {
        if !camera.is_active() {
            return None;
        }
        Some(Self {
            client: build_client(camera.timeout_secs.unwrap_or(VISION_TIMEOUT_SECS)),
            base_url: camera.endpoint.clone()?,
            api_key: camera.api_key.clone(),
            model: camera.model.clone()?,
            max_tokens: camera.max_tokens.unwrap_or(VISION_MAX_TOKENS),
        })
    }

    fn request_body(&self, prompt: &str, frame: &Frame) -> Value {
        json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": prompt },
                    { "type": "image_url", "image_url": { "url": frame.data_url() } }
                ]
            }],
            "stream":     false,
            "max_tokens": self.max_tokens
        })
    }
}

#[async_trait]
impl VisionModel for ApiVision {
    async fn describe(&self, prompt: &str, frame: &Frame) -> Result<String, LlmError> {
        let url = completions_url(&self.base_url);
        let body = self.request_body(prompt, frame);

        let content =
            post_completion(&self.client, &url, self.api_key.as_deref(), &body).await?;
        text_content(content)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
