use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod event;
mod handlers;
mod metrics;
mod models;
mod server;
mod store;

use config::{Config, StoreBackend};
use handlers::OrderHandlers;
use store::{InMemoryStore, OrderStore, ScyllaStore};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,order_handlers=debug")),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        environment = ?config.environment,
        request_shape = ?config.request_shape,
        backend = ?config.store.backend,
        "🚀 Starting order handlers"
    );

    // === 1. Order store (one long-lived handle per process) ===
    let store: Arc<dyn OrderStore> = match config.store.backend {
        StoreBackend::Scylla => Arc::new(
            ScyllaStore::connect(
                &config.store.nodes,
                &config.store.keyspace,
                &[config.store.table.as_str()],
            )
            .await?,
        ),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory order store; data is lost on exit");
            Arc::new(InMemoryStore::with_tables([config.store.table.clone()]))
        }
    };

    // === 2. Metrics ===
    let metrics = Arc::new(metrics::Metrics::new()?);
    tracing::info!(
        "📊 Metrics registry created with {} metrics",
        metrics.registry().gather().len()
    );

    // === 3. Handler set + local dispatcher ===
    let handlers = Arc::new(
        OrderHandlers::new(store, &config.store.table, config.request_shape)
            .with_metrics(metrics.clone()),
    );

    server::run_server(handlers, metrics, config.http_port).await?;

    tracing::info!("Order dispatcher stopped");
    Ok(())
}
