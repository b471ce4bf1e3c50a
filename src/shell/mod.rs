pub mod client;
pub mod session;

use log::{ info, error };
use serde_json::Value;
use std::error::Error;
use std::io::{ self, Write };
use std::time::Duration;
use thiserror::Error;
use tokio::io::{ AsyncBufRead, AsyncBufReadExt, BufReader, Lines };

use crate::cli::ShellArgs;
use crate::models::chat::{ ChatRequest, ConversationMessage, Role };
pub use client::RelayClient;
pub use session::Session;

pub const TITLE: &str = "GroqSage AI 🚀";
pub const CAPTION: &str = "Create and Interact with your Smart AI Agent";
pub const LOADING_MESSAGE: &str = "Generating response...";
pub const DEFAULT_AGENT_PROMPT: &str =
    "You are an AI trained in computer science and programming. Provide concise, accurate answers with code examples when relevant.";

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Unexpected response format: {0}")]
    UnexpectedFormat(Value),
    #[error("Request failed: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("Invalid relay URL {0}")]
    InvalidUrl(String),
}

/// Values the form submits alongside the query.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatForm {
    pub system_prompt: String,
    pub model_name: String,
    pub model_provider: String,
    pub allow_search: bool,
}

impl Default for ChatForm {
    fn default() -> Self {
        let defaults = ChatRequest::new("");
        Self {
            system_prompt: DEFAULT_AGENT_PROMPT.to_string(),
            model_name: defaults.model_name,
            model_provider: defaults.model_provider,
            allow_search: false,
        }
    }
}

impl ChatForm {
    pub fn to_request(&self, query: &str) -> ChatRequest {
        ChatRequest {
            messages: vec![query.to_string()],
            model_name: self.model_name.clone(),
            model_provider: self.model_provider.clone(),
            allow_search: self.allow_search,
            system_prompt: self.system_prompt.clone(),
        }
    }
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Blank query: nothing sent, nothing recorded.
    Skipped,
    Answered(String),
    Failed(ShellError),
}

/// Records the user turn, calls the relay once, and records the assistant
/// turn only when the reply carries a `response` field. Non-string values
/// are recorded in their JSON text form.
pub async fn submit(
    session: &mut Session,
    client: &RelayClient,
    form: &ChatForm,
    query: &str
) -> SubmitOutcome {
    if query.trim().is_empty() {
        return SubmitOutcome::Skipped;
    }
    session.push(ConversationMessage::user(query));

    let data = match client.send(&form.to_request(query)).await {
        Ok(data) => data,
        Err(e) => {
            error!("API request failed: {}", e);
            return SubmitOutcome::Failed(e);
        }
    };

    let text = match data.get("response") {
        Some(Value::String(text)) => Some(text.clone()),
        Some(other) => Some(other.to_string()),
        None => None,
    };
    match text {
        Some(text) => {
            session.push(ConversationMessage::assistant(text.as_str()));
            SubmitOutcome::Answered(text)
        }
        None => {
            error!("Unexpected response: {}", data);
            SubmitOutcome::Failed(ShellError::UnexpectedFormat(data))
        }
    }
}

/// Full submission cycle as the operator sees it: loading line, optional
/// error, then the whole conversation.
pub async fn submit_and_render<W: Write>(
    session: &mut Session,
    client: &RelayClient,
    form: &ChatForm,
    query: &str,
    out: &mut W
) -> io::Result<SubmitOutcome> {
    if !query.trim().is_empty() {
        writeln!(out, "{}", LOADING_MESSAGE)?;
        out.flush()?;
    }
    let outcome = submit(session, client, form, query).await;
    if let SubmitOutcome::Failed(e) = &outcome {
        writeln!(out, "❌ {}", e)?;
    }
    render(session, out)?;
    Ok(outcome)
}

pub fn render<W: Write>(session: &Session, out: &mut W) -> io::Result<()> {
    for msg in session.messages() {
        let role_display = match msg.role {
            Role::User => "User",
            Role::Assistant => "Assistant",
        };
        writeln!(out, "[{}] {}: {}", msg.timestamp.format("%H:%M:%S"), role_display, msg.content)?;
    }
    out.flush()
}

/// Reads one query, which may span several lines and ends at an empty line.
/// Commands and blank input are returned as soon as they are read. `None`
/// means stdin closed with nothing pending.
pub async fn read_query<R: AsyncBufRead + Unpin>(
    lines: &mut Lines<R>
) -> io::Result<Option<String>> {
    let Some(first) = lines.next_line().await? else {
        return Ok(None);
    };
    if first.trim().is_empty() || first.trim().starts_with('/') {
        return Ok(Some(first));
    }

    let mut query = vec![first];
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            break;
        }
        query.push(line);
    }
    Ok(Some(query.join("\n")))
}

pub async fn run_shell(args: &ShellArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    let client = RelayClient::new(&args.relay_url, Duration::from_secs(args.timeout_secs))?;
    let mut session = Session::new();
    let mut form = ChatForm::default();
    info!("Shell session {} using relay {}", session.id(), client.url());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut out = io::stdout();

    writeln!(out, "{}\n{}\n", TITLE, CAPTION)?;
    writeln!(out, "Define your AI Agent (Enter keeps the current one):\n  {}", form.system_prompt)?;
    write!(out, "> ")?;
    out.flush()?;
    if let Some(line) = lines.next_line().await? {
        if !line.trim().is_empty() {
            form.system_prompt = line;
        }
    }

    loop {
        writeln!(out, "\nEnter your query, finish with an empty line (/reset, /quit):")?;
        out.flush()?;
        let Some(line) = read_query(&mut lines).await? else {
            break;
        };
        match line.trim() {
            "/quit" => {
                break;
            }
            "/reset" => {
                session.reset();
                writeln!(out, "Conversation cleared.")?;
                continue;
            }
            _ => {}
        }
        submit_and_render(&mut session, &client, &form, &line, &mut out).await?;
    }

    Ok(())
}
