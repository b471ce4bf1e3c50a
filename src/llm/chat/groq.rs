use async_trait::async_trait;
use log::{ debug, info };
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION } };
use serde::{ Deserialize, Serialize };

use super::{ ChatClient, ChatMessage, CompletionResponse, ToolDefinition };
use crate::llm::{ LlmConfig, LlmError, Provider };

pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_GROQ_MODEL: &str = "llama3-70b-8192";

pub struct GroqChatClient {
    http: HttpClient,
    model: String,
    base_url: String,
    temperature: f32,
}

#[derive(Serialize)]
struct GroqRequest<'a> {
    messages: &'a [ChatMessage],
    model: &'a str,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDefinition]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
}

#[derive(Deserialize)]
struct GroqResponse {
    choices: Vec<GroqChoice>,
}

#[derive(Deserialize)]
struct GroqChoice {
    message: ChatMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

impl GroqChatClient {
    pub fn new(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>,
        temperature: f32
    ) -> Result<Self, LlmError> {
        let chat_model = model.unwrap_or_else(|| DEFAULT_GROQ_MODEL.to_string());
        let api_url = base_url.unwrap_or_else(|| DEFAULT_GROQ_BASE_URL.to_string());

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|e|
                LlmError::InvalidApiKey(e.to_string())
            )?
        );

        let http = HttpClient::builder()
            .default_headers(headers)
            .build()
            .map_err(|source| LlmError::Http { provider: Provider::Groq, source })?;

        Ok(Self {
            http,
            model: chat_model,
            base_url: api_url,
            temperature,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(LlmError::MissingApiKey(Provider::Groq.api_key_var()))?;

        let client = Self::new(
            api_key,
            config.completion_model.clone(),
            config.base_url.clone(),
            config.temperature
        )?;
        info!("Groq LLM initialized successfully (model: {})", client.model);
        Ok(client)
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatClient for GroqChatClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition]
    ) -> Result<CompletionResponse, LlmError> {
        let url = self.completions_url();
        let has_tools = !tools.is_empty();

        let req = GroqRequest {
            messages,
            model: &self.model,
            temperature: self.temperature,
            tools: has_tools.then_some(tools),
            tool_choice: has_tools.then_some("auto"),
        };

        debug!("Groq request to {} with {} messages, {} tools", url, messages.len(), tools.len());

        let http_err = |source| LlmError::Http { provider: Provider::Groq, source };
        let resp = self.http.post(&url).json(&req).send().await.map_err(http_err)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api { provider: Provider::Groq, status: status.as_u16(), body });
        }

        let resp = resp.json::<GroqResponse>().await.map_err(http_err)?;
        let choice = resp.choices
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyResponse(Provider::Groq))?;

        Ok(CompletionResponse { message: choice.message, finish_reason: choice.finish_reason })
    }
}
