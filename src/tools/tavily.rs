use async_trait::async_trait;
use log::info;
use serde::{ Deserialize, Serialize };
use serde_json::{ json, Value };

use super::{ Tool, ToolError };
use crate::llm::chat::ToolDefinition;

pub const TAVILY_TOOL_NAME: &str = "tavily_search_results_json";
pub const DEFAULT_TAVILY_BASE_URL: &str = "https://api.tavily.com";
pub const DEFAULT_MAX_RESULTS: u32 = 2;

pub struct TavilySearch {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    max_results: u32,
}

#[derive(Debug, Deserialize)]
struct TavilySearchArgs {
    query: String,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: u32,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResult {
    pub url: String,
    pub content: String,
}

impl TavilySearch {
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_TAVILY_BASE_URL.to_string()),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    fn http_error(&self, source: reqwest::Error) -> ToolError {
        ToolError::Http { tool: TAVILY_TOOL_NAME.to_string(), source }
    }
}

#[async_trait]
impl Tool for TavilySearch {
    fn name(&self) -> &str {
        TAVILY_TOOL_NAME
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(
            TAVILY_TOOL_NAME,
            "A search engine optimized for comprehensive, accurate, and trusted results. \
             Useful for when you need to answer questions about current events. \
             Input should be a search query.",
            json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "search query to look up" }
                },
                "required": ["query"]
            })
        )
    }

    async fn call(&self, args: Value) -> Result<String, ToolError> {
        let args: TavilySearchArgs = serde_json
            ::from_value(args)
            .map_err(|e| ToolError::InvalidArguments {
                tool: TAVILY_TOOL_NAME.to_string(),
                reason: e.to_string(),
            })?;

        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        let req = SearchRequest {
            api_key: &self.api_key,
            query: &args.query,
            max_results: self.max_results,
        };
        info!("Web search: {}", args.query);

        let resp = self.http
            .post(&url)
            .json(&req)
            .send().await
            .map_err(|e| self.http_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ToolError::Status {
                tool: TAVILY_TOOL_NAME.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let mut parsed = resp.json::<SearchResponse>().await.map_err(|e| self.http_error(e))?;
        parsed.results.truncate(self.max_results as usize);

        Ok(serde_json::to_string(&parsed.results).unwrap_or_else(|_| "[]".to_string()))
    }
}
