use anyhow::Context;
use bookshelf::{
    create_router, ensure_index, AppState, BackendKind, Config, IndexSchema, MemoryBackend,
    OpenSearchBackend, SearchBackend,
};
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("bookshelf={level},tower_http={level}")));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

fn build_backend(config: &Config) -> anyhow::Result<Arc<dyn SearchBackend>> {
    let backend: Arc<dyn SearchBackend> = match config.backend {
        BackendKind::Opensearch => {
            let client = OpenSearchBackend::from_host(
                &config.engine_host,
                config.engine_port,
                config.request_timeout(),
            )
            .context("Failed to build search engine client")?;
            tracing::info!(url = %client.base_url(), "using OpenSearch backend");
            Arc::new(client)
        }
        BackendKind::Memory => {
            tracing::warn!("using in-memory backend, documents are not persisted");
            Arc::new(MemoryBackend::new())
        }
    };
    Ok(backend)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_logging(&config.log_level);

    tracing::info!("Starting bookshelf {}", bookshelf::VERSION);

    let backend = build_backend(&config)?;

    ensure_index(backend.as_ref(), &config.index, &IndexSchema::books())
        .await
        .with_context(|| format!("Failed to provision index '{}'", config.index))?;

    let app = create_router(AppState::new(backend, &config.index));

    let listener = TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    tracing::info!("Listening on {}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}
