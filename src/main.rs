use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use coffee_recipe_hub::app::{router, AppState};
use coffee_recipe_hub::auth::ClaimsDecoder;
use coffee_recipe_hub::config::{config, StorageBackend};
use coffee_recipe_hub::database::Database;
use coffee_recipe_hub::store::{MemoryStore, PgStore, Store};

#[derive(Parser)]
#[command(name = "coffee-recipe-hub")]
#[command(about = "Coffee Recipe Hub API server")]
#[command(version)]
struct Cli {
    #[arg(long, help = "Listen port (overrides PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Listen address (overrides HOST)")]
    host: Option<String>,

    #[arg(long, help = "Storage backend: postgres or memory (overrides STORAGE_BACKEND)")]
    storage: Option<StorageBackend>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DATABASE_URL and friends are visible to the config
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("coffee_recipe_hub=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = config();
    let host = cli.host.unwrap_or_else(|| config.server.host.clone());
    let port = cli.port.unwrap_or(config.server.port);
    let storage = cli.storage.unwrap_or(config.server.storage);

    tracing::info!("Starting Coffee Recipe Hub API in {:?} mode", config.environment);

    let mut database = None;
    let store: Arc<dyn Store> = match storage {
        StorageBackend::Postgres => {
            let db = Database::connect(&config.database)
                .await
                .context("failed to connect to PostgreSQL")?;
            database = Some(db.clone());
            Arc::new(PgStore::new(db))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };
    tracing::info!(backend = store.backend(), "storage ready");

    let claims = ClaimsDecoder::new(config.security.jwt_secret.as_deref());
    if !claims.is_verifying() {
        tracing::warn!("SUPABASE_JWT_SECRET not set, bearer tokens will not be verified");
    }

    let app = router(AppState::new(store, claims));

    let bind_addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Coffee Recipe Hub API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(db) = database {
        db.close().await;
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
