use crate::llm::chat::ChatMessage;
use crate::models::chat::DEFAULT_SYSTEM_PROMPT;

/// Instruction sequence sent to the model: system, human, then the agent's
/// own intermediate steps.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    pub system: String,
    pub human: String,
    /// Assistant tool-call turns and tool observations. Empty until the agent
    /// takes a step.
    pub scratchpad: Vec<ChatMessage>,
}

impl PromptTemplate {
    pub fn new(system_prompt: &str, input: &str) -> Self {
        let system = if system_prompt.trim().is_empty() {
            DEFAULT_SYSTEM_PROMPT
        } else {
            system_prompt
        };
        Self {
            system: system.to_string(),
            human: input.to_string(),
            scratchpad: Vec::new(),
        }
    }

    pub fn push_step(&mut self, message: ChatMessage) {
        self.scratchpad.push(message);
    }

    pub fn to_messages(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(2 + self.scratchpad.len());
        messages.push(ChatMessage::system(self.system.as_str()));
        messages.push(ChatMessage::user(self.human.as_str()));
        messages.extend(self.scratchpad.iter().cloned());
        messages
    }
}
