pub mod executor;

use async_trait::async_trait;
use log::{ info, warn, error };
use std::sync::Arc;
use thiserror::Error;

use crate::cli::RelayArgs;
use crate::config::prompt::PromptTemplate;
use crate::llm::{ LlmConfig, LlmError, ParseProviderError, Provider };
use crate::llm::chat::{ ChatClient, new_client as new_chat_client };
use crate::models::chat::ChatRequest;
use crate::tools::{ Tool, ToolError };
use crate::tools::tavily::TavilySearch;
use self::executor::{ AgentExecutor, AgentOutput, DEFAULT_MAX_ITERATIONS };

const QUERY_LOG_PREVIEW_CHARS: usize = 50;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    UnsupportedProvider(#[from] ParseProviderError),
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Tool(#[from] ToolError),
    /// Any failure surfaced through [`Delegate::respond`] by [`AIAgent`].
    #[error("AI processing failed: {0}")]
    Processing(Box<AgentError>),
}

/// Everything one chat request needs from the agent. Built per request and
/// never shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfiguration {
    pub model_id: String,
    pub provider: String,
    pub allow_search: bool,
    pub system_prompt: String,
    pub query: String,
}

impl From<&ChatRequest> for AgentConfiguration {
    fn from(req: &ChatRequest) -> Self {
        Self {
            model_id: req.model_name.clone(),
            provider: req.model_provider.clone(),
            allow_search: req.allow_search,
            system_prompt: req.system_prompt.clone(),
            query: req.query().to_string(),
        }
    }
}

/// The relay's view of the inference layer: text on success, an error otherwise.
#[async_trait]
pub trait Delegate: Send + Sync {
    async fn respond(&self, config: &AgentConfiguration) -> Result<String, AgentError>;
}

#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub groq_api_key: Option<String>,
    pub groq_base_url: Option<String>,
    pub tavily_api_key: Option<String>,
    pub tavily_base_url: Option<String>,
    pub max_iterations: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            groq_api_key: None,
            groq_base_url: None,
            tavily_api_key: None,
            tavily_base_url: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl AgentSettings {
    pub fn from_args(args: &RelayArgs) -> Self {
        Self {
            groq_api_key: args.groq_api_key(),
            groq_base_url: args.groq_base_url.clone(),
            tavily_api_key: args.tavily_api_key(),
            tavily_base_url: args.tavily_base_url.clone(),
            max_iterations: args.max_iterations,
        }
    }
}

#[derive(Clone)]
pub struct AIAgent {
    settings: AgentSettings,
}

impl AIAgent {
    pub fn new(settings: AgentSettings) -> Self {
        Self { settings }
    }

    fn initialize_llm_client(
        &self,
        config: &AgentConfiguration
    ) -> Result<Arc<dyn ChatClient>, AgentError> {
        let provider: Provider = config.provider.parse()?;
        let (api_key, base_url) = match provider {
            Provider::Groq => (self.settings.groq_api_key.clone(), self.settings.groq_base_url.clone()),
        };
        let llm_config = LlmConfig {
            provider,
            api_key,
            completion_model: Some(config.model_id.clone()),
            base_url,
            temperature: 0.0,
        };
        Ok(new_chat_client(&llm_config)?)
    }

    /// Search is dropped, not failed, when no Tavily key is configured.
    pub fn initialize_tools(&self, allow_search: bool) -> Vec<Arc<dyn Tool>> {
        if !allow_search {
            return Vec::new();
        }
        match &self.settings.tavily_api_key {
            Some(key) => {
                let search: Arc<dyn Tool> = Arc::new(
                    TavilySearch::new(key.clone(), self.settings.tavily_base_url.clone())
                );
                info!("Web search tools initialized");
                vec![search]
            }
            None => {
                warn!("TAVILY_API_KEY not found - search disabled");
                Vec::new()
            }
        }
    }

    pub async fn invoke(&self, config: &AgentConfiguration) -> Result<AgentOutput, AgentError> {
        info!("Starting agent with model: {}, provider: {}", config.model_id, config.provider);

        let client = self.initialize_llm_client(config)?;
        let tools = self.initialize_tools(config.allow_search);
        let prompt = PromptTemplate::new(&config.system_prompt, &config.query);
        let executor = AgentExecutor::new(client, tools).with_max_iterations(
            self.settings.max_iterations
        );

        let preview: String = config.query.chars().take(QUERY_LOG_PREVIEW_CHARS).collect();
        info!("Processing query: {}...", preview);
        let output = executor.invoke(prompt).await?;
        info!(
            "Successfully generated response ({} intermediate step(s))",
            output.intermediate_steps.len()
        );
        Ok(output)
    }
}

#[async_trait]
impl Delegate for AIAgent {
    async fn respond(&self, config: &AgentConfiguration) -> Result<String, AgentError> {
        self
            .invoke(config).await
            .map(|out| out.output)
            .map_err(|e| {
                error!("Error in AI processing: {:?}", e);
                AgentError::Processing(Box::new(e))
            })
    }
}
