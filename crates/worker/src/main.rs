//! `todolist-worker`: overdue auto-close against the PostgreSQL store.

use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use todolist_core::clock::SystemClock;
use todolist_core::config::TodoConfig;
use todolist_core::overdue::{CloseReport, OverdueCloser};
use todolist_db::PgStorage;
use todolist_worker::{report, scheduler};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Maintenance worker for todolist.
///
/// Closes tasks whose deadline has passed, either on a fixed interval or once
/// on demand.
#[derive(Parser, Debug)]
#[command(name = "todolist-worker")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// PostgreSQL connection string
    #[arg(long, global = true, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    /// Print reports as JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the auto-close loop every SCHEDULER_INTERVAL_MINUTES until stopped
    Run,

    /// Close overdue tasks once
    Close {
        /// Report what would be closed without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Treat this date (YYYY-MM-DD) as today
        #[arg(long, value_parser = parse_date)]
        as_of: Option<NaiveDate>,
    },

    /// Show overdue tasks without changing them
    Status {
        /// Treat this date (YYYY-MM-DD) as today
        #[arg(long, value_parser = parse_date)]
        as_of: Option<NaiveDate>,
    },
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    todolist_core::validation::parse_deadline(raw).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todolist_worker=debug,todolist_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = TodoConfig::from_env();

    let database_url = cli
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set")?;
    let pool = todolist_db::create_pool(database_url)
        .await
        .context("Failed to connect to database")?;
    todolist_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database ready");

    let closer = Arc::new(OverdueCloser::new(
        Arc::new(PgStorage::new(pool)),
        Arc::new(SystemClock),
    ));

    match cli.command {
        Command::Run => {
            let cancel = CancellationToken::new();
            let handle = tokio::spawn(scheduler::run(
                Arc::clone(&closer),
                config.scheduler_interval,
                cancel.clone(),
            ));
            shutdown_signal().await;
            cancel.cancel();
            handle.await.context("Scheduler task panicked")?;
            tracing::info!("Worker stopped");
        }
        Command::Close { dry_run, as_of } => {
            let as_of = as_of.unwrap_or_else(|| closer.today());
            let report = closer
                .close_overdue_tasks(as_of, dry_run)
                .await
                .context("Overdue run failed")?;
            print_report(&report, cli.json)?;
            if report.failed_count() > 0 {
                anyhow::bail!("{} task(s) could not be closed", report.failed_count());
            }
        }
        Command::Status { as_of } => {
            let as_of = as_of.unwrap_or_else(|| closer.today());
            let report = closer
                .close_overdue_tasks(as_of, true)
                .await
                .context("Overdue query failed")?;
            print_report(&report, cli.json)?;
        }
    }

    Ok(())
}

fn print_report(report: &CloseReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", report::render(report));
    }
    Ok(())
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
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
            tracing::info!("Received SIGINT (Ctrl-C), shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
