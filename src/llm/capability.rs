//! Capability traits the router depends on, plus the chat message types they
//! exchange.
//!
//! Two layers:
//!
//! * **Models** ([`VisionModel`], [`ChatModel`]) are fallible clients that
//!   return `Result<_, LlmError>`.
//! * **Capabilities** ([`CameraCapability`], [`ChatCapability`]) never fail:
//!   backend errors have already been turned into displayable text.  The
//!   router only ever sees capabilities.  A camera error stays tagged as
//!   [`CameraReply::Error`] so its text is never parsed as coordinates.
//!
//! [`FallbackCamera`](crate::llm::FallbackCamera) and
//! [`FallbackChat`](crate::llm::FallbackChat) lift a model into a capability.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::vision::Frame;

// ---------------------------------------------------------------------------
// LlmError
// ---------------------------------------------------------------------------

/// Errors that can occur while calling a hosted model.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The endpoint answered with a non-success status.
    #[error("endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// The model returned a response with no usable content.
    #[error("model returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Chat messages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One `{role, content}` entry of a chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// CameraReply
// ---------------------------------------------------------------------------

/// What a camera capability hands back: the model's answer, or the
/// displayable text of a failed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraReply {
    Answer(String),
    Error(String),
}

impl CameraReply {
    pub fn is_error(&self) -> bool {
        matches!(self, CameraReply::Error(_))
    }

    /// Text shown to the user, whichever variant this is.
    pub fn into_text(self) -> String {
        match self {
            CameraReply::Answer(text) | CameraReply::Error(text) => text,
        }
    }
}

impl From<String> for CameraReply {
    fn from(text: String) -> Self {
        CameraReply::Answer(text)
    }
}

impl From<&str> for CameraReply {
    fn from(text: &str) -> Self {
        CameraReply::Answer(text.to_string())
    }
}

// ---------------------------------------------------------------------------
// ChatReply
// ---------------------------------------------------------------------------

/// What a conversational backend hands back.
///
/// Most providers return plain text; some return a structured object
/// (`{"content": "...", ...}`) in the message slot.  Resolve either shape
/// with [`into_text`](Self::into_text).
#[derive(Debug, Clone, PartialEq)]
pub enum ChatReply {
    Text(String),
    Structured(serde_json::Value),
}

impl ChatReply {
    /// The reply's text: the plain string, the structured object's string
    /// `content` field, or the object's JSON rendering as a last resort.
    pub fn into_text(self) -> String {
        match self {
            ChatReply::Text(text) => text,
            ChatReply::Structured(value) => match value.get("content") {
                Some(serde_json::Value::String(content)) => content.clone(),
                _ => value.to_string(),
            },
        }
    }
}

impl From<String> for ChatReply {
    fn from(text: String) -> Self {
        ChatReply::Text(text)
    }
}

impl From<&str> for ChatReply {
    fn from(text: &str) -> Self {
        ChatReply::Text(text.to_string())
    }
}

// ---------------------------------------------------------------------------
// Model traits (fallible)
// ---------------------------------------------------------------------------

/// A vision-language model that answers a prompt about one image.
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn describe(&self, prompt: &str, frame: &Frame) -> Result<String, LlmError>;
}

/// A conversational model that continues a chat transcript.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<ChatReply, LlmError>;
}

// ---------------------------------------------------------------------------
// Capability traits (infallible)
// ---------------------------------------------------------------------------

/// Per-camera vision backend as seen by the router.
#[async_trait]
pub trait CameraCapability: Send + Sync {
    async fn query(&self, prompt: &str, frame: &Frame) -> CameraReply;
}

/// Conversational backend as seen by the router.
#[async_trait]
pub trait ChatCapability: Send + Sync {
    async fn chat(&self, messages: &[ChatMessage]) -> ChatReply;
}
