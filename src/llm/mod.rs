//! Model backends for the WALDO assistant.
//!
//! This module provides:
//! * [`VisionModel`] / [`ChatModel`]: fallible async traits for hosted models.
//! * [`CameraCapability`] / [`ChatCapability`]: the infallible views the
//!   router consumes.
//! * [`ApiVision`] / [`ApiChat`]: OpenAI-compatible REST clients.
//! * [`FallbackCamera`] / [`FallbackChat`]: turn model errors into
//!   displayable bracketed text.
//! * [`ChatMessage`] / [`ChatReply`]: transcript entries and the tagged
//!   reply variant.
//! * [`LlmError`]: error variants for model calls.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use waldo_assistant::config::AppConfig;
//! use waldo_assistant::llm::{ApiChat, ChatCapability, ChatMessage, FallbackChat};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!
//!     // A chat backend that never fails (errors come back as text).
//!     let chat = FallbackChat::new(ApiChat::from_config(&config.interface));
//!
//!     let reply = chat.chat(&[ChatMessage::user("hello robot")]).await;
//!     println!("{}", reply.into_text());
//! }
//! ```

pub mod api;
pub mod capability;
pub mod fallback;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use api::{ApiChat, ApiVision};
pub use capability::{
    CameraCapability, CameraReply, ChatCapability, ChatMessage, ChatModel, ChatReply, LlmError,
    Role,
    VisionModel,
};
pub use fallback::{FallbackCamera, FallbackChat};
