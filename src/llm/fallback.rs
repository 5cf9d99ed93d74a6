//! Fallback wrappers: lift a fallible model into an infallible capability.
//!
//! When the wrapped model fails for any reason (`Request`, `Timeout`,
//! `Status`, `Parse`, `EmptyResponse`) the wrapper logs a warning and returns
//! a bracketed error string instead.  That string is shown to the user and
//! stored in conversation history like any other reply, so nothing raised by
//! a backend ever reaches the router.

use async_trait::async_trait;

use crate::llm::capability::{
    CameraCapability, CameraReply, ChatCapability, ChatMessage, ChatModel, ChatReply,
    VisionModel,
};
use crate::vision::{CameraId, Frame};

// ---------------------------------------------------------------------------
// FallbackCamera
// ---------------------------------------------------------------------------

/// Wraps a [`VisionModel`]; errors become [`CameraReply::Error`] carrying
/// `"[Camera N] Error: …"`.
///
/// # Example
/// ```rust
/// use waldo_assistant::config::CameraConfig;
/// use waldo_assistant::llm::{ApiVision, FallbackCamera};
///
/// let cfg = CameraConfig {
///     id: 0,
///     model: Some("llava:13b".into()),
///     api_key: Some("sk-local".into()),
///     endpoint: Some("http://localhost:11434".into()),
///     ..CameraConfig::default()
/// };
/// let camera = FallbackCamera::new(0, ApiVision::from_config(&cfg).unwrap());
/// // `camera` now implements CameraCapability and never surfaces an error.
/// ```
pub struct FallbackCamera<V: VisionModel> {
    camera: CameraId,
    inner: V,
}

impl<V: VisionModel> FallbackCamera<V> {
    pub fn new(camera: CameraId, inner: V) -> Self {
        Self { camera, inner }
    }

    /// Return a reference to the wrapped model.
    pub fn inner(&self) -> &V {
        &self.inner
    }
}

#[async_trait]
impl<V: VisionModel> CameraCapability for FallbackCamera<V> {
    async fn query(&self, prompt: &str, frame: &Frame) -> CameraReply {
        match self.inner.describe(prompt, frame).await {
            Ok(reply) => CameraReply::Answer(reply),
            Err(err) => {
                log::warn!("camera {}: vision query failed: {err}", self.camera);
                CameraReply::Error(format!("[Camera {}] Error: {err}", self.camera))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// FallbackChat
// ---------------------------------------------------------------------------

/// Wraps a [`ChatModel`]; errors become `"[Error in interface AI]: …"`.
pub struct FallbackChat<C: ChatModel> {
    inner: C,
}

impl<C: ChatModel> FallbackChat<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    /// Return a reference to the wrapped model.
    pub fn inner(&self) -> &C {
        &self.inner
    }
}

#[async_trait]
impl<C: ChatModel> ChatCapability for FallbackChat<C> {
    async fn chat(&self, messages: &[ChatMessage]) -> ChatReply {
        match self.inner.complete(messages).await {
            Ok(reply) => reply,
            Err(err) => {
                log::warn!(
                    "interface model failed ({} messages in request): {err}",
                    messages.len()
                );
                ChatReply::Text(format!("[Error in interface AI]: {err}"))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::capability::LlmError;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    struct OkVision(String);

    #[async_trait]
    impl VisionModel for OkVision {
        async fn describe(&self, _prompt: &str, _frame: &Frame) -> Result<String, LlmError> {
            Ok(self.0.clone())
        }
    }

    struct TimeoutVision;

    #[async_trait]
    impl VisionModel for TimeoutVision {
        async fn describe(&self, _prompt: &str, _frame: &Frame) -> Result<String, LlmError> {
            Err(LlmError::Timeout)
        }
    }

    struct FailingChat;

    #[async_trait]
    impl ChatModel for FailingChat {
        async fn complete(&self, _messages: &[ChatMessage]) -> Result<ChatReply, LlmError> {
            Err(LlmError::Request("connection refused".into()))
        }
    }

    struct EchoChat;

    #[async_trait]
    impl ChatModel for EchoChat {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<ChatReply, LlmError> {
            Ok(ChatReply::Text(
                messages.last().map(|m| m.content.clone()).unwrap_or_default(),
            ))
        }
    }

    fn frame() -> Frame {
        Frame::jpeg(vec![1, 2, 3])
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn camera_passes_through_success() {
        let cam = FallbackCamera::new(0, OkVision("a red mug".into()));
        assert_eq!(
            cam.query("what?", &frame()).await,
            CameraReply::Answer("a red mug".into())
        );
    }

    #[tokio::test]
    async fn camera_error_becomes_bracketed_text() {
        let cam = FallbackCamera::new(2, TimeoutVision);
        assert_eq!(
            cam.query("what?", &frame()).await,
            CameraReply::Error("[Camera 2] Error: request timed out".into())
        );
    }

    #[tokio::test]
    async fn chat_passes_through_success() {
        let chat = FallbackChat::new(EchoChat);
        let reply = chat.chat(&[ChatMessage::user("ping")]).await;
        assert_eq!(reply, ChatReply::Text("ping".into()));
    }

    #[tokio::test]
    async fn chat_error_becomes_bracketed_text() {
        let chat = FallbackChat::new(FailingChat);
        let reply = chat.chat(&[ChatMessage::user("hello")]).await;
        assert_eq!(
            reply.into_text(),
            "[Error in interface AI]: HTTP request failed: connection refused"
        );
    }

    /// Wrappers must themselves be valid trait objects.
    #[test]
    fn wrappers_are_object_safe() {
        let _: Box<dyn CameraCapability> = Box::new(FallbackCamera::new(0, TimeoutVision));
        let _: Box<dyn ChatCapability> = Box::new(FallbackChat::new(FailingChat));
    }
}
