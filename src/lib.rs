pub mod agent;
pub mod models;
pub mod server;
pub mod config;
pub mod llm;
pub mod cli;
pub mod tools;
pub mod shell;

use agent::{ AIAgent, AgentSettings, Delegate };
use cli::{ Args, Command, RelayArgs };
use llm::{ LlmConfig, Provider };
use llm::chat::{ new_client as new_chat_client, ChatMessage };
use log::{ info, error };
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    match args.command {
        Command::Serve(relay) => run_relay(relay).await,
        Command::Chat(shell_args) => shell::run_shell(&shell_args).await,
    }
}

pub async fn run_relay(args: RelayArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Service Name: {}", args.service_name);
    info!("Groq Base URL: {}", args.groq_base_url.as_deref().unwrap_or("adapter default"));
    info!("Web Search Available: {}", args.tavily_api_key().is_some());
    info!("Max Agent Iterations: {}", args.max_iterations);
    info!("-------------------------");

    let Some(groq_api_key) = args.groq_api_key() else {
        error!("Missing GROQ_API_KEY in environment variables");
        return Err("GROQ_API_KEY is required to start the relay".into());
    };

    if args.skip_connection_test {
        info!("Skipping Groq connection test.");
    } else {
        test_connection(&args, groq_api_key).await?;
    }

    let delegate: Arc<dyn Delegate> = Arc::new(AIAgent::new(AgentSettings::from_args(&args)));
    info!("Starting server on: {}", args.server_addr);
    let server = Server::new(args.server_addr.clone(), delegate, args.service_name.clone());
    server.run().await?;

    Ok(())
}

async fn test_connection(
    args: &RelayArgs,
    api_key: String
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = LlmConfig {
        provider: Provider::Groq,
        api_key: Some(api_key),
        completion_model: Some(args.connection_test_model.clone()),
        base_url: args.groq_base_url.clone(),
        ..LlmConfig::default()
    };
    let result = match new_chat_client(&config) {
        Ok(client) => client.complete(&[ChatMessage::user("test")], &[]).await.map(|_| ()),
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            info!("✅ Groq connection test successful");
            Ok(())
        }
        Err(e) => {
            error!("❌ Groq connection failed: {}", e);
            Err(e.into())
        }
    }
}
