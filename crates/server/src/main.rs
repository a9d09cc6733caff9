//! Persona Reply Engine Server Entry Point

use std::net::SocketAddr;
use std::time::Duration;

use persona_config::{load_settings, Settings};
use persona_server::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_dir = std::env::var("PERSONA_AGENT_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let settings = load_settings(&config_dir).unwrap_or_else(|e| {
        eprintln!("failed to load configuration from {config_dir}: {e}. using defaults.");
        Settings::default()
    });

    init_tracing();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), environment = ?settings.environment, "starting persona reply engine");

    let port = settings.server.port;
    let host = settings.server.host.clone();
    let reload_interval = Duration::from_secs(300);

    let state = AppState::build(settings).await?;
    spawn_periodic_reload(state.clone(), reload_interval);

    let app = create_router(state);
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    tracing::info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("server shutdown complete");
    Ok(())
}

/// Out-of-band refresh of the persisted rules/training/learning-stats
/// snapshot (spec.md §3 "Lifecycles: read-mostly; refreshed out-of-band").
/// Never runs on the request path.
fn spawn_periodic_reload(state: AppState, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = state.store.reload().await {
                tracing::warn!(error = %e, "periodic persistence reload failed, keeping previous snapshot");
            } else {
                tracing::debug!("persisted state reloaded");
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install sigterm handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl-c, shutting down"),
        _ = terminate => tracing::info!("received sigterm, shutting down"),
    }
}

fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "persona_server=info,persona_agent=info,tower_http=info".into());

    tracing_subscriber::registry().with(env_filter).with(tracing_subscriber::fmt::layer()).init();
}
