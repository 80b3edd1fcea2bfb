use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::{self, StorageBackend};
use crate::database::DatabaseManager;
use crate::{app, AppState};

#[derive(Parser)]
#[command(name = "polyglot-api")]
#[command(about = "Polyglot API - localization strings server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides PORT/API_PORT)")]
        port: Option<u16>,
    },

    #[command(about = "Apply pending Postgres migrations and exit")]
    Migrate,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => serve(port).await,
        Commands::Migrate => migrate().await,
    }
}

async fn serve(port: Option<u16>) -> anyhow::Result<()> {
    let settings = config::config();
    tracing::info!("Starting Polyglot API in {:?} mode", settings.environment);

    let store = DatabaseManager::open(settings).await.context("failed to open storage")?;
    let router = app(AppState::new(store));

    let bind_addr = format!("0.0.0.0:{}", port.unwrap_or(settings.api.port));
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Polyglot API listening on http://{}", bind_addr);
    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}

async fn migrate() -> anyhow::Result<()> {
    let settings = config::config();
    if settings.database.backend != StorageBackend::Postgres {
        anyhow::bail!("migrate requires DATABASE_BACKEND=postgres");
    }

    let pool = DatabaseManager::connect(settings).await?;
    DatabaseManager::migrate(&pool).await?;
    pool.close().await;
    Ok(())
}

