//! System preamble for the conversational model.
//!
//! The preamble is the configured personality and roles (each omitted when
//! blank) followed by a fixed description of the three tools the assistant
//! can call.  [`PromptBuilder::build_messages`] prepends it to the
//! conversation history and the new user turn.

use crate::config::InterfaceConfig;
use crate::llm::ChatMessage;

const TOOL_DESCRIPTION: &str = "\
You are a multimodal robot AI with access to three tools: \
1. CAMERA, which can answer visual questions about any camera's live feed (use: CALL_CAMERA('prompt')). \
2. TRIANGULATE, which can estimate 3D object positions using multiple cameras (use: CALL_TRIANGULATE('object name')). \
3. ARM, which can operate the robot arm and end effector (use: CALL_ARM('command')). \
If you use any tool, I will run it and insert the result as TOOL_RESULT. \
Otherwise, answer the user directly. Be natural, concise, and show some personality!";

/// Builds the system message and full chat transcript for GENERAL prompts.
///
/// # Example
/// ```rust
/// use waldo_assistant::router::PromptBuilder;
///
/// let builder = PromptBuilder::new("sarcastic", "lab assistant");
/// assert!(builder.system_message().starts_with("Personality: sarcastic. Roles: lab assistant. "));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    personality: String,
    roles: String,
}

impl PromptBuilder {
    pub fn new(personality: impl Into<String>, roles: impl Into<String>) -> Self {
        Self {
            personality: personality.into(),
            roles: roles.into(),
        }
    }

    pub fn from_config(config: &InterfaceConfig) -> Self {
        Self::new(config.personality.clone(), config.roles.clone())
    }

    /// Personality and roles blocks followed by the tool description.
    pub fn system_message(&self) -> String {
        let mut msg = String::with_capacity(TOOL_DESCRIPTION.len() + 128);
        let personality = self.personality.trim();
        if !personality.is_empty() {
            msg.push_str(&format!("Personality: {personality}. "));
        }
        let roles = self.roles.trim();
        if !roles.is_empty() {
            msg.push_str(&format!("Roles: {roles}. "));
        }
        msg.push_str(TOOL_DESCRIPTION);
        msg
    }

    /// `[system] + history + [user prompt]`.
    pub fn build_messages<'a>(
        &self,
        history: impl IntoIterator<Item = &'a ChatMessage>,
        prompt: &str,
    ) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(self.system_message())];
        messages.extend(history.into_iter().cloned());
        messages.push(ChatMessage::user(prompt));
        messages
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;

    #[test]
    fn blank_personality_and_roles_are_omitted() {
        let msg = PromptBuilder::default().system_message();
        assert!(msg.starts_with("You are a multimodal robot AI"));
        assert!(!msg.contains("Personality:"));
        assert!(!msg.contains("Roles:"));
    }

    #[test]
    fn personality_and_roles_precede_tools() {
        let msg = PromptBuilder::new("cheerful", "lab tech").system_message();
        assert!(msg.starts_with("Personality: cheerful. Roles: lab tech. You are"));
    }

    #[test]
    fn roles_without_personality() {
        let msg = PromptBuilder::new("  ", "guard").system_message();
        assert!(msg.starts_with("Roles: guard. You are"));
    }

    #[test]
    fn tool_description_lists_all_three_tools() {
        let msg = PromptBuilder::default().system_message();
        assert!(msg.contains("CALL_CAMERA('prompt')"));
        assert!(msg.contains("CALL_TRIANGULATE('object name')"));
        assert!(msg.contains("CALL_ARM('command')"));
        assert!(msg.contains("TOOL_RESULT"));
    }

    #[test]
    fn messages_wrap_history_between_system_and_prompt() {
        let history = vec![ChatMessage::user("hi"), ChatMessage::assistant("hello")];
        let messages = PromptBuilder::default().build_messages(&history, "how are you?");

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1], history[0]);
        assert_eq!(messages[2], history[1]);
        assert_eq!(messages[3], ChatMessage::user("how are you?"));
    }

    #[test]
    fn from_config_reads_personality_and_roles() {
        let config = InterfaceConfig {
            personality: "dry".into(),
            roles: "butler".into(),
            ..InterfaceConfig::default()
        };
        let msg = PromptBuilder::from_config(&config).system_message();
        assert!(msg.starts_with("Personality: dry. Roles: butler. "));
    }
}
