//! Caregate — healthcare assistant CLI and audit-report server

use caregate_agent::{Coordinator, CoordinatorConfig};
use caregate_core::SessionKey;
use caregate_llm::AnthropicProvider;
use caregate_store::RecordStore;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_DB_URL: &str = "sqlite:healthcare.db?mode=rwc";

#[derive(Parser)]
#[command(name = "caregate", about = "Caregate healthcare assistant — chat and audit server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the healthcare assistant in the terminal
    Chat {
        /// Session key (default: auto-generated)
        #[arg(short, long)]
        session: Option<String>,
        /// Model to use
        #[arg(short, long)]
        model: Option<String>,
        /// Database URL
        #[arg(long)]
        db: Option<String>,
    },
    /// Start the audit-report web server
    Serve {
        #[arg(short, long, default_value = "8000")]
        port: u16,
        #[arg(short, long, default_value = "127.0.0.1")]
        bind: String,
        /// Database URL
        #[arg(long)]
        db: Option<String>,
    },
    /// Show version
    Version,
}

fn db_url(flag: Option<String>) -> String {
    flag.or_else(|| std::env::var("CAREGATE_DB").ok())
        .unwrap_or_else(|| DEFAULT_DB_URL.to_string())
}

fn shared_secret() -> String {
    std::env::var("CAREGATE_SECURITY_CODE").unwrap_or_else(|_| "0864".to_string())
}

async fn run_chat(
    session: Option<String>,
    model: Option<String>,
    db: Option<String>,
) -> anyhow::Result<()> {
    let api_key = std::env::var("ANTHROPIC_API_KEY")
        .map_err(|_| anyhow::anyhow!("ANTHROPIC_API_KEY not set"))?;
    // ANTHROPIC_API_URL points the provider at a proxy when set.
    let provider = match std::env::var("ANTHROPIC_API_URL") {
        Ok(api_url) => Arc::new(
            AnthropicProvider::new(&api_key).with_base_url(format!("{}/v1/messages", api_url)),
        ),
        Err(_) => Arc::new(AnthropicProvider::new(&api_key)),
    };

    let records = Arc::new(RecordStore::connect(&db_url(db)).await?);

    let secret = shared_secret();
    let config = CoordinatorConfig {
        model: model
            .or_else(|| std::env::var("CAREGATE_MODEL").ok())
            .unwrap_or_else(|| caregate_llm::anthropic::DEFAULT_MODEL.to_string()),
        shared_secret: secret.clone(),
        ..Default::default()
    };
    let coordinator = Arc::new(Coordinator::new(provider, records, config));

    let session = SessionKey::new(
        session.unwrap_or_else(|| format!("console-{}", &uuid::Uuid::new_v4().to_string()[..8])),
    );
    caregate_gateway::chat::run_chat(coordinator, session, secret).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "caregate=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Some(Commands::Serve { port, bind, db }) => {
            let records = Arc::new(RecordStore::connect(&db_url(db)).await?);
            caregate_gateway::server::serve(records, &bind, port).await?;
        }

        Some(Commands::Chat { session, model, db }) => {
            run_chat(session, model, db).await?;
        }

        Some(Commands::Version) => {
            println!("caregate v{}", env!("CARGO_PKG_VERSION"));
        }

        // No subcommand = chat with defaults
        None => {
            run_chat(None, None, None).await?;
        }
    }

    Ok(())
}
