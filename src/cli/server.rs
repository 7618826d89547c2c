use std::{sync::Arc, time::Duration};

use anyhow::Result;
use consultoria_contact::SqliteContactStore;
use consultoria_notification::{Dispatcher, EmailService};

use crate::routes::AppState;

pub async fn serve(
    config: crate::config::Config,
    host_override: Option<String>,
    port_override: Option<u16>,
) -> Result<()> {
    tracing::info!("Starting consultoria server...");

    let host = host_override.unwrap_or(config.server.host.to_owned());
    let port = port_override.unwrap_or(config.server.port);

    let pool =
        crate::db::create_pool(&config.database.url, config.database.max_connections).await?;

    let store = Arc::new(SqliteContactStore(pool.clone()));
    let intake = consultoria_contact::Command::new(store, &config.intake.recipient);

    let dispatcher = if config.notification.enabled {
        tracing::info!("Starting notification dispatcher...");

        let mailer = Arc::new(EmailService::new(&config.email)?);
        let handle = Dispatcher::new(pool.clone(), mailer)
            .max_attempts(config.notification.max_attempts)
            .batch_size(config.notification.batch_size)
            .interval(Duration::from_secs(config.notification.interval_secs))
            .run();

        Some(handle)
    } else {
        tracing::info!("Notification dispatcher disabled");
        None
    };

    let state = AppState {
        intake,
        pool: pool.clone(),
    };

    let app = crate::routes::router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(dispatcher) = dispatcher {
        tracing::info!("Shutting down notification dispatcher...");
        if let Err(e) = dispatcher.shutdown_and_wait().await {
            tracing::error!("{e}");
        }
    }

    tracing::info!("Closing database pool...");
    pool.close().await;

    tracing::info!("Graceful shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
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
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }

    tracing::info!("Starting graceful shutdown...");
}
