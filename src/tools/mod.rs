pub mod tavily;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::llm::chat::ToolDefinition;

#[derive(Debug, Error)]
pub enum ToolError {
    /// Arguments did not match the tool's parameter schema.
    #[error("invalid arguments for {tool}: {reason}")]
    InvalidArguments {
        tool: String,
        reason: String,
    },
    #[error("{tool}: http error: {source}")]
    Http {
        tool: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{tool}: status error ({status}): {body}")]
    Status {
        tool: String,
        status: u16,
        body: String,
    },
}

/// A capability the agent may invoke between model turns.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn definition(&self) -> ToolDefinition;

    /// Runs the tool and returns the observation handed back to the model.
    async fn call(&self, args: Value) -> Result<String, ToolError>;
}
