// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Worldramp

mod api;
mod auth;
mod config;
mod error;
mod models;
mod providers;
mod session;
mod state;
mod storage;

use std::{env, net::SocketAddr, sync::Arc};

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use api::router;
use config::AppConfig;
use providers::DevPortalClient;
use state::AppState;
use storage::{RecordStore, StorePaths};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let format = env::var("LOG_FORMAT").unwrap_or_default();
    if format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = AppConfig::from_env();

    // A missing or unwritable data directory degrades the affected
    // endpoints to 503 instead of preventing startup.
    let mut store = RecordStore::new(StorePaths::new(&config.data_dir));
    let store = match store.initialize() {
        Ok(()) => Some(store),
        Err(e) => {
            warn!(data_dir = %config.data_dir, error = %e, "record store unavailable; running degraded");
            None
        }
    };

    let portal = if config.portal_configured() {
        match DevPortalClient::from_config(&config) {
            Ok(client) => Some(Arc::new(client) as Arc<dyn providers::TransactionStatusSource>),
            Err(e) => {
                warn!(error = %e, "Developer Portal client unavailable; verification disabled");
                None
            }
        }
    } else {
        warn!("WORLD_APP_ID / DEV_PORTAL_API_KEY not set; payment verification disabled");
        None
    };

    if config.platform_recipient_address.is_none() {
        warn!("PLATFORM_RECIPIENT_ADDRESS not set; payment initiation disabled");
    }

    let state = AppState::new(config, store, portal);
    let app = router(state);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    info!("Worldramp server listening on http://{addr} (docs at /docs)");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "server error");
        std::process::exit(1);
    }
}
