use axum::Router;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use campus_events_server::config::Config;
use campus_events_server::procedures::verify_contracts;
use campus_events_server::routes::create_routes;
use campus_events_server::store::mysql::MySqlStore;
use campus_events_server::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().expect("Invalid configuration");
    if config.production {
        info!("Running in production mode");
    }

    let store = MySqlStore::connect(&config)
        .await
        .expect("Failed to connect to database");

    let violations = verify_contracts(&store)
        .await
        .expect("Failed to read stored routine signatures");
    if !violations.is_empty() {
        if config.strict_procedures {
            error!(
                count = violations.len(),
                "Stored routines do not match their pinned contracts"
            );
            std::process::exit(1);
        }
        warn!(
            count = violations.len(),
            "Continuing with mismatched stored routines; set STRICT_PROCEDURES=true to refuse"
        );
    }

    let state = AppState::new(Arc::new(store));
    let app: Router = create_routes(state, config.production);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("🚀 Server running at http://{}/api", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");

    info!("Server stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
