use std::fs;
use std::sync::{Arc, OnceLock};

use anyhow::Context;
use genai::{GenAiClient, TextGenerator};
use predictpal_core::AppConfig;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

mod config;
mod routes;

use config::load_server_settings;
use routes::{router, AppState};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let settings = load_server_settings().context("failed to load server settings")?;
    settings.apply_runtime_env();

    let app_config = AppConfig::load_from_env().context("failed to load environment configuration")?;

    // Parse the embedded schedule before accepting requests.
    schedule::catalogue().context("schedule content is invalid")?;

    let generator: Option<Arc<dyn TextGenerator>> = match GenAiClient::from_app_config(&app_config) {
        Ok(client) => {
            info!(model = client.model(), "generative client ready");
            Some(Arc::new(client) as Arc<dyn TextGenerator>)
        }
        Err(err) => {
            warn!(%err, "generative client not configured; flow endpoints will report unavailable");
            None
        }
    };

    let state = AppState {
        generator,
        default_language: app_config.default_language,
    };

    let bind_addr = settings.bind_addr()?;
    let origins = settings.cors_origins()?;
    let cors = if origins.is_empty() {
        CorsLayer::new().allow_methods(Any).allow_headers(Any).allow_origin(Any)
    } else {
        CorsLayer::new()
            .allow_methods(Any)
            .allow_headers(Any)
            .allow_origin(AllowOrigin::list(origins))
    };

    let app = router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    info!("Starting API server on {bind_addr}");

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(%err, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}

fn init_tracing() {
    let log_dir = std::path::Path::new("logs");
    if let Err(err) = fs::create_dir_all(log_dir) {
        eprintln!("failed to create log directory {log_dir:?}: {err}");
    }

    let file_appender: RollingFileAppender =
        tracing_appender::rolling::daily(log_dir, "api-server.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    let env_filter = EnvFilter::from_default_env().add_directive(Level::INFO.into());

    let fmt_stdout = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);
    let fmt_file = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);

    let subscriber = Registry::default()
        .with(env_filter)
        .with(fmt_stdout)
        .with(fmt_file);

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::warn!("tracing already initialised");
    }
}
