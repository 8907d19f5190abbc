//! lms-ajax - course completion and feedback endpoints for the host LMS
//!
//! Serves `/api/ajax` (activitycompletion, participation, savefeedback) and
//! `/health` against the host's SQLite database.

use anyhow::{Context, Result};
use clap::Parser;
use lms_common::config::BootstrapConfig;
use lms_ajax::dispatch::DispatchSettings;
use lms_ajax::{build_router, AppState};
use std::path::PathBuf;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for lms-ajax
#[derive(Parser, Debug)]
#[command(name = "lms-ajax")]
#[command(about = "Course completion and questionnaire feedback endpoints")]
#[command(version)]
struct Args {
    /// TOML config file (defaults to <config dir>/lms-ajax/config.toml)
    #[arg(short, long, env = "LMS_AJAX_CONFIG")]
    config: Option<PathBuf>,

    /// Host database path
    #[arg(short, long, env = "LMS_AJAX_DATABASE")]
    database: Option<PathBuf>,

    /// Interface to bind
    #[arg(long, env = "LMS_AJAX_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "LMS_AJAX_PORT")]
    port: Option<u16>,

    /// Create the host schema if the database is missing (development only)
    #[arg(long)]
    init_db: bool,
}

impl Args {
    fn apply(&self, config: &mut BootstrapConfig) {
        if let Some(database) = &self.database {
            config.database_path = database.clone();
        }
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = BootstrapConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting lms-ajax v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Database path: {}", config.database_path.display());

    let opened = if args.init_db {
        lms_common::db::init_database(&config.database_path, config.busy_timeout_ms).await
    } else {
        lms_common::db::connect(&config.database_path, config.busy_timeout_ms).await
    };
    let pool = opened.context("Failed to open host database")?;
    info!("✓ Connected to database");

    let state = AppState::new(
        pool,
        DispatchSettings {
            session_cookie: config.session_cookie.clone(),
            session_timeout_secs: config.session_timeout_secs,
        },
    );
    let app = build_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("lms-ajax listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    info!("Shutdown signal received");
}
