use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use recipe_api::config::AppConfig;
use recipe_api::database;

#[derive(Parser, Debug)]
#[command(name = "recipe-api", version, about = "Recipe management REST API")]
struct Args {
    /// Listen port (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Listen address (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Store connection string, `postgres://...` or `memory://` (overrides DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("recipe_api=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = AppConfig::from_env();
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(url) = args.database_url {
        config.database.url = url;
    }

    tracing::info!("Starting Recipe API in {:?} mode", config.environment);

    let store = database::connect(&config.database)
        .await
        .context("failed to connect to the document store")?;
    let server = recipe_api::start(config, store).await?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    server.stop().await
}
