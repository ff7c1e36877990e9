//! PayInsight - payment transaction demo API
//!
//! Validates submitted transactions against fixed business rules and settles
//! accepted ones asynchronously with simulated outcomes.

use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use payinsight::clock::{Clock, SystemClock};
use payinsight::config::LogFormat;
use payinsight::jobs::JobScheduler;
use payinsight::random::ThreadRandom;
use payinsight::store::{
    InMemoryTransactionStore, InMemoryUserStore, PgTransactionStore, PgUserStore,
    TransactionStore, UserStore,
};
use payinsight::{api, db, AppState, Config};

/// Initialize tracing/logging
fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "payinsight=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!(environment = %config.environment, "Starting PayInsight server");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let (transactions, users, pool) = match &config.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(database_url)
                .await?;

            db::verify_connection(&pool).await?;
            if !db::check_schema(&pool).await? {
                tracing::error!("Database schema is not complete. Please run migrations.");
                return Err(anyhow::anyhow!("Database schema incomplete"));
            }
            tracing::info!("Database connected successfully");

            let transactions: Arc<dyn TransactionStore> =
                Arc::new(PgTransactionStore::new(pool.clone()));
            let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool.clone()));
            (transactions, users, Some(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory stores; data is lost on exit");
            let transactions: Arc<dyn TransactionStore> = Arc::new(InMemoryTransactionStore::new());
            let users: Arc<dyn UserStore> = Arc::new(InMemoryUserStore::new());
            (transactions, users, None::<PgPool>)
        }
    };

    db::seed_default_users(users.as_ref(), clock.as_ref()).await?;

    let state = AppState::new(
        &config,
        transactions,
        users.clone(),
        clock.clone(),
        Arc::new(ThreadRandom),
    );

    let scheduler = JobScheduler::new(users, clock).start();

    let app = api::build_router(state.clone(), &config.cors_allowed_origins);

    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Cleanup
    tracing::info!(
        abandoned_settlements = state.simulator.in_flight(),
        "Server shutting down..."
    );
    scheduler.abort();
    if let Some(pool) = pool {
        pool.close().await;
        tracing::info!("Database connections closed");
    }
    tracing::info!("Goodbye!");

    Ok(())
}

/// Shutdown signal handler for graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}
