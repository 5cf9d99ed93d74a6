//! Prompt routing and shared conversation state.
//!
//! * [`KeywordClassifier`]: maps a prompt to an [`Intent`] and the camera it
//!   addresses.
//! * [`ConversationMemory`]: bounded, pair-atomic chat history.
//! * [`PromptBuilder`]: system preamble and transcript for GENERAL prompts.
//! * [`Router`]: ties classification to the camera, triangulation, arm and
//!   chat backends.

pub mod intent;
pub mod memory;
pub mod orchestrator;
pub mod prompt;

pub use intent::{resolve_camera, Classification, Intent, IntentClassifier, KeywordClassifier};
pub use memory::ConversationMemory;
pub use orchestrator::Router;
pub use prompt::PromptBuilder;
