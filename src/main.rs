use std::sync::Arc;

use lexilist_backend::config::Config;
use lexilist_backend::db::Database;
use lexilist_backend::services::email_provider::EmailService;
use lexilist_backend::state::AppState;
use lexilist_backend::workers::WorkerManager;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _file_log_guard = lexilist_backend::logging::init_tracing(&config.log_level);

    if config.jwt_secret.is_none() {
        tracing::warn!("JWT_SECRET is not set; login and registration will fail");
    }

    let db = match Database::connect(&config).await {
        Ok(db) => db,
        Err(err) => {
            tracing::error!(error = %err, path = %config.database_path.display(), "database init failed");
            std::process::exit(1);
        }
    };

    let email_service = EmailService::from_env();
    tracing::info!(provider = ?email_service.provider_type(), "email provider configured");

    let state = AppState::new(config.clone(), db.clone(), email_service);

    let worker_manager = if config.workers_enabled {
        match WorkerManager::new(db.clone(), state.sessions(), config.study_session_ttl).await {
            Ok(manager) => {
                if let Err(e) = manager.start().await {
                    tracing::error!(error = %e, "failed to start workers");
                }
                Some(Arc::new(manager))
            }
            Err(e) => {
                tracing::warn!(error = %e, "worker manager not initialized");
                None
            }
        }
    } else {
        tracing::info!("WORKERS_ENABLED is off, skipping worker startup");
        None
    };

    let app = lexilist_backend::build_app(state);

    let addr = config.bind_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, %addr, "bind listener failed");
            std::process::exit(1);
        }
    };
    tracing::info!(%addr, "lexilist-backend listening");

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());
    if let Err(e) = server.await {
        tracing::error!(error = %e, "server error");
    }

    tracing::info!("HTTP server stopped, initiating graceful shutdown sequence");

    if let Some(ref manager) = worker_manager {
        manager.stop().await;
    }
    db.close().await;

    tracing::info!("Graceful shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
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
}
