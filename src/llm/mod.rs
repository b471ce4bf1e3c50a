pub mod chat;
use serde::{ Deserialize, Serialize };
use std::str::FromStr;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Provider {
    Groq,
}

#[derive(Debug, PartialEq, Eq, Error)]
#[error("Unsupported provider: {0}")]
pub struct ParseProviderError(pub String);

impl FromStr for Provider {
    type Err = ParseProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Groq" => Ok(Provider::Groq),
            _ => Err(ParseProviderError(s.to_string())),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Groq => write!(f, "Groq"),
        }
    }
}

impl Provider {
    /// Environment variable holding this provider's credential.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            Provider::Groq => "GROQ_API_KEY",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: Provider,
    pub api_key: Option<String>,
    pub completion_model: Option<String>,
    pub base_url: Option<String>,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Groq,
            api_key: None,
            completion_model: None,
            base_url: None,
            temperature: 0.0,
        }
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("{0} not found in environment variables")]
    MissingApiKey(&'static str),
    #[error("Invalid API key format: {0}")]
    InvalidApiKey(String),
    #[error("{provider} request error: {source}")]
    Http {
        provider: Provider,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} API error ({status}): {body}")]
    Api {
        provider: Provider,
        status: u16,
        body: String,
    },
    #[error("No response from {0} API")]
    EmptyResponse(Provider),
}
