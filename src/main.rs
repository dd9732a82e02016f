//! chatrelay binary
//!
//! Runs the HTTP API server, an interactive terminal conversation, or writes a
//! configuration template.

use chatrelay::{
    cli::{Cli, Command, generate_config_template},
    client::{CompletionClient, Instrumented, OpenAiClient, RelayClient},
    config::Config,
    handlers::{self, AppState},
    metrics::Metrics,
    prompts::{FilePromptProvider, PromptProvider, PromptSet, RemotePromptProvider},
    router::MessageRouter,
    telemetry, terminal,
};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;

async fn serve(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    if config.upstream.api_key().is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; /api/chat will answer with a configuration error");
    }

    let addr = SocketAddr::from((
        config
            .server
            .host
            .parse::<std::net::IpAddr>()
            .unwrap_or_else(|_| std::net::IpAddr::from([127, 0, 0, 1])),
        config.server.port,
    ));

    let state = AppState::new(Arc::new(config))?;
    let app = handlers::app(state);

    tracing::info!("Listening on {}", addr);
    tracing::info!("Health check available at http://{}/api/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}

async fn chat(config: Config, server: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let metrics = Arc::new(Metrics::new()?);

    let client: Arc<dyn CompletionClient>;
    let provider: Box<dyn PromptProvider>;
    match &server {
        Some(url) => {
            tracing::info!(server = %url, "Relaying through chatrelay server");
            client = Arc::new(Instrumented::new(RelayClient::new(url)?, metrics.clone()));
            provider = Box::new(RemotePromptProvider::new(url));
        }
        None => {
            config.upstream.require_api_key()?;
            client = Arc::new(Instrumented::new(
                OpenAiClient::from_config(&config)?,
                metrics.clone(),
            ));
            provider = Box::new(FilePromptProvider::new(config.prompts.dir.clone()));
        }
    }

    let prompts = PromptSet::load(provider.as_ref(), Some(&metrics)).await;
    let router = MessageRouter::new(client).with_metrics(metrics);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    terminal::run_session(&router, &prompts, stdin, tokio::io::stdout()).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let command = cli.command.unwrap_or(Command::Serve);
    if let Command::Config { output } = &command {
        match output {
            Some(path) => {
                std::fs::write(path, generate_config_template())?;
                eprintln!("Configuration template written to {}", path);
            }
            None => print!("{}", generate_config_template()),
        }
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref())?;
    telemetry::init(&config.observability.log_level);

    match command {
        Command::Serve => serve(config).await,
        Command::Chat { server } => chat(config, server).await,
        Command::Config { .. } => Ok(()),
    }
}
