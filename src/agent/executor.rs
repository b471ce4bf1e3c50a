use log::{ debug, info, warn };
use serde_json::Value;
use std::sync::Arc;

use super::AgentError;
use crate::config::prompt::PromptTemplate;
use crate::llm::chat::{ ChatClient, ChatMessage, ToolCall, ToolDefinition };
use crate::tools::{ Tool, ToolError };

pub const DEFAULT_MAX_ITERATIONS: usize = 15;
pub const INVALID_RESPONSE_OBSERVATION: &str = "Invalid or incomplete response";
pub const ITERATION_LIMIT_OUTPUT: &str = "Agent stopped due to iteration limit or time limit.";

#[derive(Debug, Clone, PartialEq)]
pub struct AgentStep {
    pub tool: String,
    pub tool_input: String,
    pub observation: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentOutput {
    pub output: String,
    pub intermediate_steps: Vec<AgentStep>,
}

/// Drives the model through tool calls until it answers in plain text or the
/// iteration budget runs out.
pub struct AgentExecutor {
    client: Arc<dyn ChatClient>,
    tools: Vec<Arc<dyn Tool>>,
    max_iterations: usize,
}

impl AgentExecutor {
    pub fn new(client: Arc<dyn ChatClient>, tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { client, tools, max_iterations: DEFAULT_MAX_ITERATIONS }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools
            .iter()
            .map(|t| t.name())
            .collect()
    }

    pub async fn invoke(&self, mut prompt: PromptTemplate) -> Result<AgentOutput, AgentError> {
        let definitions: Vec<ToolDefinition> = self.tools
            .iter()
            .map(|t| t.definition())
            .collect();
        let mut steps = Vec::new();

        for iteration in 0..self.max_iterations {
            let completion = self.client.complete(&prompt.to_messages(), &definitions).await?;
            let message = completion.message;
            let calls = message.requested_tool_calls().to_vec();

            if calls.is_empty() {
                debug!("Agent finished after {} iteration(s)", iteration + 1);
                return Ok(AgentOutput {
                    output: message.content.unwrap_or_default(),
                    intermediate_steps: steps,
                });
            }

            prompt.push_step(message);
            for call in &calls {
                let observation = self.run_tool(call).await?;
                debug!(
                    "Tool '{}' input={} observation={}",
                    call.function.name,
                    call.function.arguments,
                    observation
                );
                prompt.push_step(ChatMessage::tool_result(call.id.as_str(), observation.as_str()));
                steps.push(AgentStep {
                    tool: call.function.name.clone(),
                    tool_input: call.function.arguments.clone(),
                    observation,
                });
            }
        }

        warn!("Agent hit the iteration limit ({})", self.max_iterations);
        Ok(AgentOutput {
            output: ITERATION_LIMIT_OUTPUT.to_string(),
            intermediate_steps: steps,
        })
    }

    async fn run_tool(&self, call: &ToolCall) -> Result<String, AgentError> {
        let name = call.function.name.as_str();
        let Some(tool) = self.tools.iter().find(|t| t.name() == name) else {
            warn!("Model requested unknown tool '{}'", name);
            return Ok(
                format!("{} is not a valid tool, try one of [{}].", name, self.tool_names().join(", "))
            );
        };

        let args: Value = match serde_json::from_str(&call.function.arguments) {
            Ok(args) => args,
            Err(e) => {
                warn!("Could not parse arguments for '{}': {}", name, e);
                return Ok(INVALID_RESPONSE_OBSERVATION.to_string());
            }
        };

        info!("Invoking tool '{}'", name);
        match tool.call(args).await {
            Ok(observation) => Ok(observation),
            Err(e @ ToolError::InvalidArguments { .. }) => {
                warn!("{}", e);
                Ok(INVALID_RESPONSE_OBSERVATION.to_string())
            }
            Err(e) => Err(e.into()),
        }
    }
}
