//! Courier Server — webhook message dispatch service
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use courier_core::config::AppConfig;
use courier_core::error::AppError;

#[tokio::main]
async fn main() {
    let env = std::env::var("COURIER_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Courier v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db = courier_database::DatabasePool::connect(&config.database).await?;
    courier_database::migration::run_migrations(db.pool()).await?;

    // ── Step 2: Cache (optional) ─────────────────────────────────
    let cache = if config.cache.enabled {
        tracing::info!(
            "Initializing cache (provider: {})...",
            config.cache.provider
        );
        Some(Arc::new(
            courier_cache::CacheManager::new(&config.cache).await?,
        ))
    } else {
        tracing::info!("Cache disabled");
        None
    };

    // ── Step 3: Repositories and services ────────────────────────
    let message_repo = Arc::new(
        courier_database::repositories::message::MessageRepository::new(db.pool().clone()),
    );
    let message_service = Arc::new(courier_service::message::MessageService::new(Arc::clone(
        &message_repo,
    )));

    let webhook_client = Arc::new(courier_webhook::WebhookClient::new(&config.webhook)?);

    let sent_cache = cache
        .as_ref()
        .map(|c| courier_service::sender::SentMessageCache::new(c.as_ref().clone()));

    let sender_service = Arc::new(courier_service::sender::SenderService::new(
        Arc::clone(&message_repo) as Arc<dyn courier_database::repositories::MessageStore>,
        webhook_client,
        sent_cache,
        config.sender.batch_size,
        config.sender.on_failure,
    ));

    // ── Step 4: Sender job ───────────────────────────────────────
    let sender_job = Arc::new(
        courier_worker::SenderJob::new(
            sender_service,
            Duration::from_secs(config.sender.interval_seconds),
        )
        .map_err(AppError::from)?,
    );

    if config.sender.auto_start {
        sender_job.start().await.map_err(AppError::from)?;
        tracing::info!(
            interval_seconds = config.sender.interval_seconds,
            batch_size = config.sender.batch_size,
            "Message sender started"
        );
    } else {
        tracing::info!("Message sender not auto-started; use the sender API to start it");
    }

    // ── Step 5: Build and start HTTP server ──────────────────────
    let app_state = courier_api::AppState {
        config: Arc::new(config.clone()),
        db_pool: db.pool().clone(),
        cache,
        message_service,
        sender_job: Arc::clone(&sender_job),
    };

    let app = courier_api::build_router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Courier server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    // ── Step 6: Stop background work ─────────────────────────────
    tracing::info!("Shutdown signal received, stopping background sender...");
    if sender_job.is_running().await {
        if let Err(e) = sender_job.stop().await {
            tracing::warn!("Failed to stop sender job: {}", e);
        }
    }

    db.close().await;
    tracing::info!("Courier server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
