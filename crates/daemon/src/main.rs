//! Waitline - Main Entry Point
//! JSON-RPC server over the queue service

mod config;

use anyhow::Result;
use config::{DaemonConfig, StorageBackend};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Import workspace crates
use waitline_api_rpc::{RpcServer, RpcServerConfig};
use waitline_core::application::{QueueService, ServiceConfig};
use waitline_core::port::{
    QueueRepository, RandomAccessKeyProvider, SystemTimeProvider, UuidProvider,
};
use waitline_infra_memory::InMemoryQueueRepository;
use waitline_infra_sqlite::{
    close_pool, create_pool, run_migrations, PoolSettings, SqlitePool, SqliteQueueRepository,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const RPC_STOP_TIMEOUT: Duration = Duration::from_secs(5);
const DB_CLOSE_TIMEOUT: Duration = Duration::from_secs(10);

/// Repository plus the pool backing it, kept for shutdown
struct Storage {
    repo: Arc<dyn QueueRepository>,
    pool: Option<SqlitePool>,
}

/// Install the global subscriber. The returned guard flushes the file
/// writer and must live until shutdown.
fn init_logging(cfg: &DaemonConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("waitline=info"))?;

    let (file_layer, guard) = match &cfg.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "waitline.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().json().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry().with(env_filter).with(file_layer);

    match cfg.log_format.as_str() {
        // Production: JSON structured logging
        "json" => registry.with(fmt::layer().json()).init(),
        // Development: Pretty formatting with colors
        _ => registry.with(fmt::layer().pretty()).init(),
    }

    Ok(guard)
}

async fn build_storage(cfg: &DaemonConfig) -> Result<Storage> {
    let id_provider = Arc::new(UuidProvider);

    match cfg.storage {
        StorageBackend::Memory => {
            info!("Using in-memory storage (records are lost on exit)");
            Ok(Storage {
                repo: Arc::new(InMemoryQueueRepository::new(id_provider)),
                pool: None,
            })
        }
        StorageBackend::Sqlite => {
            info!(db_path = %cfg.db_path, "Initializing database...");

            if !cfg.db_path.starts_with("sqlite:") {
                if let Some(parent) = Path::new(&cfg.db_path).parent() {
                    std::fs::create_dir_all(parent)?;
                }
            }

            let pool = create_pool(&cfg.database_url(), &PoolSettings::default()).await?;
            run_migrations(&pool).await?;

            Ok(Storage {
                repo: Arc::new(
                    SqliteQueueRepository::new(pool.clone(), id_provider)
                        .with_op_timeout(cfg.db_timeout),
                ),
                pool: Some(pool),
            })
        }
    }
}

/// Close the database pool, if any. A slow close is logged, not fatal.
async fn close_storage(pool: Option<SqlitePool>) {
    let Some(pool) = pool else {
        return;
    };
    match close_pool(&pool, DB_CLOSE_TIMEOUT).await {
        Ok(()) => info!("Database pool closed"),
        Err(e) => warn!(error = %e, "Database pool did not close cleanly"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration
    let cfg = DaemonConfig::from_env()?;

    // 2. Initialize logging
    let _log_guard = init_logging(&cfg)?;

    info!("Waitline v{} starting...", VERSION);

    // 3. Storage
    let storage = build_storage(&cfg).await?;

    // 4. Setup dependencies (DI wiring)
    let service = Arc::new(QueueService::new(
        storage.repo,
        Arc::new(RandomAccessKeyProvider::new()),
        Arc::new(SystemTimeProvider),
        ServiceConfig {
            base_url: cfg.base_url.clone(),
        },
    ));

    // 5. Start JSON-RPC server
    let rpc_config = RpcServerConfig {
        host: cfg.rpc_host.clone(),
        port: cfg.rpc_port,
    };
    let (addr, rpc_handle) = RpcServer::new(rpc_config, service)
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    info!(%addr, base_url = %cfg.base_url, "System ready");
    info!("Press Ctrl+C to shutdown");

    // 6. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 7. Graceful shutdown
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    if tokio::time::timeout(RPC_STOP_TIMEOUT, rpc_handle.stopped())
        .await
        .is_err()
    {
        warn!(timeout = ?RPC_STOP_TIMEOUT, "RPC server did not stop in time");
    }
    close_storage(storage.pool).await;

    info!("Shutdown complete.");

    Ok(())
}
