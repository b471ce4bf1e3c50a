use clap::{ Parser, Subcommand };

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the inference relay HTTP service.
    Serve(RelayArgs),
    /// Open the interactive chat form against a running relay.
    Chat(ShellArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct RelayArgs {
    // --- Server Args ---
    /// Host address and port for the relay to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "0.0.0.0:9999")]
    pub server_addr: String,

    /// Service name reported by the health endpoint.
    #[arg(long, env = "SERVICE_NAME", default_value = "GroqSage AI")]
    pub service_name: String,

    // --- LLM Provider Args ---
    /// API Key for the Groq chat completion API. The relay refuses to start without it.
    #[arg(long, env = "GROQ_API_KEY", default_value = "", hide_env_values = true)]
    pub groq_api_key: String,

    /// Base URL for the Groq OpenAI-compatible API.
    #[arg(long, env = "GROQ_BASE_URL")] // No default, let the adapter handle it
    pub groq_base_url: Option<String>,

    /// Model used for the startup connection test.
    #[arg(long, env = "CONNECTION_TEST_MODEL", default_value = "llama3-70b-8192")]
    pub connection_test_model: String,

    /// Skip the startup connection test against the LLM provider.
    #[arg(long, env = "SKIP_CONNECTION_TEST", default_value = "false")]
    pub skip_connection_test: bool,

    // --- Search Tool Args ---
    /// API Key for Tavily web search. When empty, search requests run without the tool.
    #[arg(long, env = "TAVILY_API_KEY", default_value = "", hide_env_values = true)]
    pub tavily_api_key: String,

    /// Base URL for the Tavily search API.
    #[arg(long, env = "TAVILY_BASE_URL")]
    pub tavily_base_url: Option<String>,

    // --- Agent Args ---
    /// Upper bound on model round trips per chat request.
    #[arg(long, env = "MAX_ITERATIONS", default_value = "15")]
    pub max_iterations: usize,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ShellArgs {
    /// Relay chat endpoint the form submits to.
    #[arg(long, env = "RELAY_URL", default_value = "http://127.0.0.1:9999/chat")]
    pub relay_url: String,

    /// Seconds to wait for the relay before giving up on a submission.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "60")]
    pub timeout_secs: u64,
}

impl RelayArgs {
    pub fn groq_api_key(&self) -> Option<String> {
        Some(self.groq_api_key.clone()).filter(|k| !k.trim().is_empty())
    }

    pub fn tavily_api_key(&self) -> Option<String> {
        Some(self.tavily_api_key.clone()).filter(|k| !k.trim().is_empty())
    }
}
