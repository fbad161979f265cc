use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{info, warn};

use cinematic_api::app::{create_router, AppState};
use cinematic_api::config::Config;
use cinematic_api::jobs::{
    EmailOutboxJob, JobScheduler, PoolMetricsJob, RateLimitCleanupJob, SubscriptionSweepJob,
};
use cinematic_api::middleware::{init_metrics, logging::init_logging};
use cinematic_api::services::admin_bootstrap::bootstrap_admin;
use cinematic_api::services::EmailService;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load().context("Failed to load configuration")?;

    init_logging(&config.logging).context("Failed to initialize logging")?;
    init_metrics().context("Failed to install Prometheus recorder")?;

    info!("Starting Cinematic API v{}", env!("CARGO_PKG_VERSION"));

    let pool = persistence::db::create_pool(&config.database.pool_config()).await?;
    persistence::db::run_migrations(&pool).await?;

    if bootstrap_admin(&pool, &config.admin).await? {
        info!("Admin bootstrap complete");
    }

    let state = AppState::new(config.clone(), pool.clone())?;
    let request_limit = state.settings.preload().await?;
    info!(request_limit, "Settings loaded");

    let mut scheduler = JobScheduler::new();
    if config.jobs.enabled {
        let email = EmailService::new(config.email.clone());
        if !email.is_enabled() {
            info!("Email delivery disabled; outbox rows will be marked sent without sending");
        }

        scheduler.register(SubscriptionSweepJob::new(pool.clone()));
        scheduler.register(EmailOutboxJob::new(
            pool.clone(),
            email,
            config.jobs.outbox_batch_size,
        ));
        scheduler.register(PoolMetricsJob::new(pool.clone()));
    } else {
        warn!("Background jobs disabled; outbox emails will not be delivered");
    }
    // Runs even with jobs disabled so limiter memory stays bounded.
    if let Some(limiter) = &state.auth_rate_limiter {
        scheduler.register(RateLimitCleanupJob::new(limiter.clone()));
    }
    scheduler.start();

    let app = create_router(state);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    scheduler.shutdown();
    scheduler
        .wait_for_shutdown(Duration::from_secs(config.server.shutdown_timeout_secs))
        .await;

    pool.close().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
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

    info!("Shutdown signal received");
}
