use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use eshop_api::config::AppConfig;
use eshop_api::database::{manager, MemoryStore, PgStore};
use eshop_api::{router, AppState};

#[derive(Parser)]
#[command(name = "eshop-api")]
#[command(about = "E-commerce backend API: products, carts and checkout")]
#[command(version)]
struct Args {
    #[arg(long, help = "Bind address (overrides HOST)")]
    host: Option<String>,

    #[arg(long, help = "Listen port (overrides PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Keep all data in memory instead of PostgreSQL")]
    in_memory: bool,

    #[arg(long, help = "Apply pending database migrations before serving")]
    migrate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, TOKEN_KEY, etc.
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let mut config = AppConfig::from_env();
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.default_log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting eshop-api in {:?} mode", config.environment);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = if args.in_memory {
        tracing::warn!("Using in-memory store; data is lost on shutdown");
        AppState::new(config, Arc::new(MemoryStore::new()))
    } else {
        let pool = manager::connect(&config.database).context("failed to configure database pool")?;
        tracing::info!(
            "Database: {}",
            config.redacted_database_url().unwrap_or_default()
        );
        if args.migrate {
            manager::migrate(&pool).await.context("failed to run migrations")?;
            tracing::info!("Migrations applied");
        }
        AppState::new(config, Arc::new(PgStore::new(pool)))
    }
    .context("failed to build application state")?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("eshop-api listening on http://{}", bind_addr);

    axum::serve(listener, router(state)).await.context("server error")?;
    Ok(())
}
