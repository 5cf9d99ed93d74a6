//! Prompt router: classifies a prompt and drives the matching branch.
//!
//! # Branches
//!
//! ```text
//! process_prompt(text)
//!   └─▶ IntentClassifier::classify          → (intent, addressed camera)
//!         ├─ CAMERA      → query_camera(addressed)              → reply
//!         ├─ TRIANGULATE → locate_all → to_observations
//!         │                  → triangulate                      → sentence
//!         ├─ ARM         → ArmCapability::interpret             → sentence
//!         └─ GENERAL     → PromptBuilder + history → ChatCapability → reply
//! every branch: memory.remember(prompt, stored reply)
//! ```
//!
//! No branch returns an error: failures are bracketed strings that are both
//! shown to the user and stored as the assistant turn.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::arm::ArmCapability;
use crate::llm::{ChatCapability, ChatMessage};
use crate::vision::{
    locate_all, query_camera, to_observations, triangulate, CalibrationStore, CameraId,
    CameraSet, FrameProvider,
};

use super::intent::{Classification, Intent, IntentClassifier, KeywordClassifier};
use super::memory::ConversationMemory;
use super::prompt::PromptBuilder;

/// Routes prompts to the camera, triangulation, arm or chat backends and
/// keeps the shared conversation history.
///
/// Create with [`Router::new`], adjust with the `with_*` methods, then call
/// [`process_prompt`](Self::process_prompt).
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use waldo_assistant::arm::CommandInterpreter;
/// use waldo_assistant::config::AppConfig;
/// use waldo_assistant::llm::{ApiChat, FallbackChat};
/// use waldo_assistant::router::{PromptBuilder, Router};
/// use waldo_assistant::vision::{CameraSet, LatestFrames};
///
/// # async fn example() {
/// let config = AppConfig::default();
/// let router = Router::new(
///     CameraSet::new(),
///     Arc::new(LatestFrames::new()),
///     Arc::new(FallbackChat::new(ApiChat::from_config(&config.interface))),
///     Arc::new(CommandInterpreter::default()),
/// )
/// .with_prompt_builder(PromptBuilder::from_config(&config.interface))
/// .with_calibration(config.calibration.clone());
///
/// println!("{}", router.process_prompt("hello there").await);
/// # }
/// ```
pub struct Router {
    classifier: Box<dyn IntentClassifier>,
    cameras: CameraSet,
    frames: Arc<dyn FrameProvider>,
    calibration: CalibrationStore,
    chat: Arc<dyn ChatCapability>,
    arm: Arc<dyn ArmCapability>,
    prompt_builder: PromptBuilder,
    /// Held for the whole of `process_prompt`, so prompts are handled one at
    /// a time and each appends its pair before the next reads history.
    memory: Mutex<ConversationMemory>,
}

impl Router {
    /// Create a router with the keyword classifier, the default calibration
    /// rig, an empty personality and the default memory bound.
    pub fn new(
        cameras: CameraSet,
        frames: Arc<dyn FrameProvider>,
        chat: Arc<dyn ChatCapability>,
        arm: Arc<dyn ArmCapability>,
    ) -> Self {
        Self {
            classifier: Box::new(KeywordClassifier::new()),
            cameras,
            frames,
            calibration: CalibrationStore::default(),
            chat,
            arm,
            prompt_builder: PromptBuilder::default(),
            memory: Mutex::new(ConversationMemory::default()),
        }
    }

    pub fn with_classifier(mut self, classifier: Box<dyn IntentClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_calibration(mut self, calibration: CalibrationStore) -> Self {
        self.calibration = calibration;
        self
    }

    pub fn with_prompt_builder(mut self, prompt_builder: PromptBuilder) -> Self {
        self.prompt_builder = prompt_builder;
        self
    }

    /// Cap the history at `max_pairs` exchanges.  Drops any existing history.
    pub fn with_memory_limit(mut self, max_pairs: usize) -> Self {
        self.memory = Mutex::new(ConversationMemory::new(max_pairs));
        self
    }

    // -----------------------------------------------------------------------
    // Entry point
    // -----------------------------------------------------------------------

    /// Handle one user prompt and return the text to display.
    pub async fn process_prompt(&self, prompt: &str) -> String {
        let mut memory = self.memory.lock().await;

        let Classification { intent, camera } = self.classify(prompt);
        log::debug!("router: intent={} camera={camera}", intent.label());

        let (reply, stored) = match intent {
            Intent::Camera => {
                let reply = self.handle_camera(camera, prompt).await;
                (reply.clone(), reply)
            }
            Intent::Triangulate => {
                let result = self.handle_triangulate(prompt).await;
                (
                    format!("The estimated world position vector is: {result}"),
                    result,
                )
            }
            Intent::Arm => {
                let result = self.arm.interpret(prompt).await;
                (format!("[Robot Arm]: {result}"), result)
            }
            Intent::General => {
                let messages = self.prompt_builder.build_messages(memory.turns(), prompt);
                let reply = self.chat.chat(&messages).await.into_text();
                (reply.clone(), reply)
            }
        };

        memory.remember(prompt, stored);
        reply
    }

    /// Classify without side effects (exposed for UIs that preview routing).
    pub fn classify(&self, prompt: &str) -> Classification {
        self.classifier.classify(prompt, &self.cameras.names())
    }

    /// Copy of the conversation history, oldest first.
    pub async fn history(&self) -> Vec<ChatMessage> {
        self.memory.lock().await.snapshot()
    }

    /// Forget the conversation history.
    pub async fn reset_history(&self) {
        self.memory.lock().await.reset();
    }

    pub fn cameras(&self) -> &CameraSet {
        &self.cameras
    }

    // -----------------------------------------------------------------------
    // Branch handlers
    // -----------------------------------------------------------------------

    async fn handle_camera(&self, camera: CameraId, prompt: &str) -> String {
        match query_camera(&self.cameras, self.frames.as_ref(), camera, prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                log::warn!("router: camera {camera} unavailable: {e}");
                e.to_string()
            }
        }
    }

    /// Position as `[X, Y, Z]`, or the reason it could not be computed.
    async fn handle_triangulate(&self, prompt: &str) -> String {
        let replies = locate_all(&self.cameras, self.frames.as_ref(), prompt).await;
        let observations = to_observations(&replies);

        match triangulate(&self.calibration, &observations) {
            Ok(position) => position.to_string(),
            Err(e) => {
                log::warn!("router: triangulation failed: {e}");
                e.to_string()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
