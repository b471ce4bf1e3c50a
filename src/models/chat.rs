use chrono::{ DateTime, Utc };
use serde::{ Deserialize, Serialize };
use serde_json::{ Map, Value };
use std::fmt;
use thiserror::Error;

pub const DEFAULT_MODEL_NAME: &str = "llama3-70b-8192";
pub const DEFAULT_MODEL_PROVIDER: &str = "Groq";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One entry of the shell's conversation log.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into(), timestamp: Utc::now() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into(), timestamp: Utc::now() }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("No data provided")]
    NoData,
    #[error("Messages must be a non-empty array")]
    InvalidMessages,
}

/// Body of `POST /chat`, after defaults have been applied.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<String>,
    pub model_name: String,
    pub model_provider: String,
    pub allow_search: bool,
    pub system_prompt: String,
}

impl ChatRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            messages: vec![query.into()],
            model_name: DEFAULT_MODEL_NAME.to_string(),
            model_provider: DEFAULT_MODEL_PROVIDER.to_string(),
            allow_search: false,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Validates a decoded body and fills in absent optional fields.
    pub fn from_json(data: &Value) -> Result<Self, RequestError> {
        if is_empty_payload(data) {
            return Err(RequestError::NoData);
        }
        let obj = data.as_object().ok_or(RequestError::InvalidMessages)?;

        let messages = match obj.get("messages") {
            Some(Value::Array(items)) if !items.is_empty() => {
                items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
                    .ok_or(RequestError::InvalidMessages)?
            }
            _ => {
                return Err(RequestError::InvalidMessages);
            }
        };

        Ok(Self {
            messages,
            model_name: optional_str(obj, "model_name", DEFAULT_MODEL_NAME),
            model_provider: optional_str(obj, "model_provider", DEFAULT_MODEL_PROVIDER),
            allow_search: obj
                .get("allow_search")
                .map(|v| !is_empty_payload(v))
                .unwrap_or(false),
            system_prompt: optional_str(obj, "system_prompt", DEFAULT_SYSTEM_PROMPT),
        })
    }

    /// The text handed to the model. Only the first message is consumed.
    pub fn query(&self) -> &str {
        self.messages.first().map(String::as_str).unwrap_or_default()
    }
}

fn is_empty_payload(data: &Value) -> bool {
    match data {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Non-string values are passed on in their JSON text form; the agent rejects
/// what it cannot use.
fn optional_str(obj: &Map<String, Value>, key: &str, default: &str) -> String {
    match obj.get(key) {
        None | Some(Value::Null) => default.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatResponse {
    Success {
        response: String,
    },
    Failure {
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

impl HealthResponse {
    pub fn healthy(service: &str) -> Self {
        Self { status: "healthy".to_string(), service: service.to_string() }
    }
}
