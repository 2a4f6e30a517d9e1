use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod render;
mod routes;
mod session;
mod state;
mod store;

use config::Config;
use state::AppState;
use store::{GameStore, MemoryStore, SqliteStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_tracing(config.log_json);

    let store: Arc<dyn GameStore> = match &config.database {
        Some(path) => {
            let store = SqliteStore::open(path)
                .with_context(|| format!("failed to open database {}", path.display()))?;
            info!(path = %path.display(), "using sqlite store");
            Arc::new(store)
        }
        None => {
            info!("using in-memory store, games are lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState::new(store, config.shuffle_rounds);
    let app = routes::router(state, &config.public_dir);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;
    info!("服务器正在监听 {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
