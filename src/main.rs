//! Library Server
//!
//! REST API for a lending library, with a Redis-backed job worker and the
//! overdue sweep scheduler running in the same process.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::watch;

use library_server::{
    api,
    config::AppConfig,
    jobs::{
        scheduler::{self, ScheduleState},
        worker, JobQueue, JobRunner, RedisJobQueue,
    },
    logging,
    repository::Repository,
    services::{email::EmailService, Services},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let _log_guard = logging::init(&config.logging);

    tracing::info!("Starting Library Server v{}", env!("CARGO_PKG_VERSION"));

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed");

    let queue = RedisJobQueue::new(&config.redis.url, config.jobs.queue_key.clone())
        .await
        .context("Failed to connect to Redis")?;

    tracing::info!("Connected to Redis");

    let producer: Arc<dyn JobQueue> = Arc::new(queue.clone());
    let schedule_state: Arc<dyn ScheduleState> = Arc::new(queue.clone());
    let services = Services::new(
        Repository::new(pool),
        producer.clone(),
        Arc::new(EmailService::new(config.email.clone())),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut background = Vec::new();

    if config.jobs.run_worker {
        background.push(tokio::spawn(worker::run_worker(
            queue,
            JobRunner::new(&services),
            config.jobs.poll_timeout_seconds,
            shutdown_rx.clone(),
        )));
    }
    if config.jobs.run_scheduler {
        background.push(tokio::spawn(scheduler::run_overdue_schedule(
            producer,
            schedule_state,
            config.jobs.overdue_sweep_interval_hours,
            shutdown_rx.clone(),
        )));
    }

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );

    let state = AppState {
        services: Arc::new(services),
    };
    let app = api::router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let mut server_shutdown = shutdown_rx;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = server_shutdown.wait_for(|stop| *stop).await;
        })
        .await?;

    for handle in background {
        if let Err(e) = handle.await {
            tracing::error!("Background task panicked: {}", e);
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}
