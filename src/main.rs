use anyhow::Context;
use tracing_subscriber::EnvFilter;

use fintrack_api::{config, database, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up SUPABASE_URL, DATABASE_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fintrack_api=info,tower_http=info")),
        )
        .init();

    let config = config::config();
    tracing::info!("Starting Fintrack API in {:?} mode", config.environment);

    let store = database::open_store(&config.store)
        .await
        .context("failed to open transaction store")?;

    let app = server::app(store, config);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!(
        "Fintrack API listening on http://{}{}",
        bind_addr,
        config.server.route_prefix
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
