use std::{net::SocketAddr, sync::Arc};

use axum::{http::{header, Method}, Router};
use configs::{AppConfig, ServerConfig};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::errors::StartupError;
use crate::routes::{self, AppState};
use service::user::InMemoryUserStore;

/// Any origin; the methods and headers the user API accepts.
pub fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

fn load_bind_addr(server: &ServerConfig) -> Result<SocketAddr, StartupError> {
    server
        .bind_addr()
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("{}: {e}", server.bind_addr())))
}

/// Store plus router, without binding a socket.
pub fn build_app(cfg: &AppConfig) -> Router {
    let store = if cfg.store.seed_demo_users {
        InMemoryUserStore::with_demo_users()
    } else {
        InMemoryUserStore::new()
    };
    let state = AppState::new(Arc::new(store));
    routes::build_router(state, build_cors())
}

fn log_routes(addr: SocketAddr) {
    info!(%addr, "user api listening");
    for (method, path) in [
        ("GET", "/api/users"),
        ("GET", "/api/users/:id"),
        ("POST", "/api/users"),
        ("PUT", "/api/users/:id"),
        ("DELETE", "/api/users/:id"),
        ("GET", "/health"),
        ("GET", "/api-docs/openapi.json"),
    ] {
        info!(method, path, "route");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
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

    info!(event = "shutdown_signal", "shutdown signal received, draining connections");
}

/// Serve until a shutdown signal arrives and open connections drain.
pub async fn run_with_config(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg);
    let addr = load_bind_addr(&cfg.server)?;
    let listener = TcpListener::bind(addr).await.map_err(StartupError::from)?;
    log_routes(addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}
