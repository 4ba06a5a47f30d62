use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todolist_api::config::{ServerConfig, StorageBackend};
use todolist_api::router::build_app_router;
use todolist_api::state::AppState;
use todolist_core::clock::{Clock, SystemClock};
use todolist_core::overdue::OverdueCloser;
use todolist_core::service::TodoService;
use todolist_core::storage::{MemoryStorage, Storage};
use todolist_db::PgStorage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todolist_api=debug,todolist_core=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Invalid server configuration")?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        storage = config.storage_backend.as_str(),
        max_projects = config.todo.max_projects,
        max_tasks_per_project = config.todo.max_tasks_per_project,
        "Loaded server configuration"
    );

    // --- Storage ---
    let storage = build_storage(config.storage_backend).await?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // --- App state ---
    let service = Arc::new(TodoService::new(
        Arc::clone(&storage),
        Arc::clone(&clock),
        config.todo.clone(),
    ));
    let overdue = Arc::new(OverdueCloser::new(storage, clock));
    let state = AppState {
        service,
        overdue: Arc::clone(&overdue),
        config: Arc::new(config.clone()),
    };

    // --- Overdue scheduler ---
    let scheduler_cancel = CancellationToken::new();
    let scheduler_handle = config.scheduler_enabled.then(|| {
        tokio::spawn(todolist_worker::scheduler::run(
            overdue,
            config.todo.scheduler_interval,
            scheduler_cancel.clone(),
        ))
    });

    // --- Start server ---
    let app = build_app_router(state, &config);
    let host: IpAddr = config
        .host
        .parse()
        .with_context(|| format!("Invalid HOST address '{}'", config.host))?;
    let addr = SocketAddr::new(host, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    scheduler_cancel.cancel();
    if let Some(handle) = scheduler_handle {
        let timeout = Duration::from_secs(config.shutdown_timeout_secs);
        if tokio::time::timeout(timeout, handle).await.is_err() {
            tracing::warn!("Overdue scheduler did not stop within the shutdown timeout");
        } else {
            tracing::info!("Overdue scheduler stopped");
        }
    }

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Connect the configured storage adapter.
async fn build_storage(backend: StorageBackend) -> anyhow::Result<Arc<dyn Storage>> {
    match backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok(Arc::new(MemoryStorage::new()))
        }
        StorageBackend::Postgres => {
            let database_url =
                std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

            let pool = todolist_db::create_pool(&database_url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Database connection pool created");

            todolist_db::health_check(&pool)
                .await
                .context("Database health check failed")?;
            tracing::info!("Database health check passed");

            todolist_db::run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations applied");

            Ok(Arc::new(PgStorage::new(pool)))
        }
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
