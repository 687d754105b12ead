//! wspm-pe (Plan Editor) - support plan editing service
//!
//! Serves the JSON API used by the plan editor, plan list, dashboard and
//! audio upload pages. Plans are stored in a SQLite database under the
//! resolved root folder.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wspm_common::config::{LoggingConfig, RootFolderInitializer, RootFolderResolver};
use wspm_common::store::SqliteKeyValueStore;
use wspm_pe::{build_router, AppState};

const DEFAULT_PORT: u16 = 5730;

/// Command-line arguments for wspm-pe
#[derive(Parser, Debug)]
#[command(name = "wspm-pe")]
#[command(about = "Plan editor service for WSPM")]
#[command(version)]
struct Args {
    /// Port to listen on (falls back to the config file, then 5730)
    #[arg(short, long, env = "WSPM_PE_PORT")]
    port: Option<u16>,

    /// Root folder holding the plan database
    #[arg(short, long)]
    root_folder: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let resolver = RootFolderResolver::new("wspm-pe").with_cli_arg(args.root_folder);
    let config = resolver.load_config();

    init_tracing(&config.logging)?;

    // Build identification first, before any database work
    info!(
        "Starting WSPM Plan Editor (wspm-pe) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = resolver.resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer.ensure_directory_exists()?;
    info!("Root folder: {}", initializer.root_folder().display());

    let db_path = initializer.database_path();
    let backend = SqliteKeyValueStore::open(&db_path)
        .await
        .with_context(|| format!("Failed to open plan database {}", db_path.display()))?;

    let app = build_router(AppState::new(Arc::new(backend)));

    let port = args.port.or(config.port).unwrap_or(DEFAULT_PORT);
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("Failed to bind 127.0.0.1:{}", port))?;
    info!("wspm-pe listening on http://127.0.0.1:{}", port);
    info!("Health check: http://127.0.0.1:{}/health", port);

    axum::serve(listener, app).await?;

    Ok(())
}

/// `RUST_LOG` wins over the configured level
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=info", logging.level)));

    match &logging.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Arc::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
    Ok(())
}
