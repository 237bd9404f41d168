//! Translation Server Entry Point

use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use anuvaad_config::{load_settings, Settings};
use anuvaad_server::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Priority: env vars > config/{env}.toml > config/default.toml > defaults
    let env = std::env::var("ANUVAAD_ENV").ok();
    let settings = match load_settings(env.as_deref()) {
        Ok(settings) => {
            // Tracing not yet initialized, use eprintln for early logging
            eprintln!(
                "Loaded configuration from files (env: {})",
                env.as_deref().unwrap_or("default")
            );
            settings
        }
        Err(e) => {
            eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
            Settings::default()
        }
    };

    init_tracing(&settings);

    tracing::info!("Starting Translation Server v{}", env!("CARGO_PKG_VERSION"));

    tokio::fs::create_dir_all(&settings.storage.upload_dir).await?;
    tokio::fs::create_dir_all(&settings.storage.web_audio_dir).await?;

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    let state = AppState::new(settings)?;
    let app = create_router(state);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
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
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

fn init_tracing(settings: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_log_directives(&settings.observability.log_level).into());

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let fmt_layer = if settings.observability.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    subscriber.with(fmt_layer).init();
}

/// Fallback filter when RUST_LOG is unset: the configured level for the
/// workspace crates, debug for the HTTP trace layer.
fn default_log_directives(level: &str) -> String {
    format!(
        "anuvaad_core={level},anuvaad_config={level},anuvaad_pipeline={level},\
         anuvaad_server={level},tower_http=debug"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_directives_cover_workspace_crates() {
        let directives = default_log_directives("info");
        for directive in [
            "anuvaad_core=info",
            "anuvaad_config=info",
            "anuvaad_pipeline=info",
            "anuvaad_server=info",
            "tower_http=debug",
        ] {
            assert!(directives.contains(directive), "missing {directive} in {directives}");
        }
        assert!(tracing_subscriber::EnvFilter::try_new(&directives).is_ok());
    }
}
