//! facewatch-co - Face Annotation Coordinator
//!
//! Hands uploaded media to the external detection worker over the job
//! queue, ingests worker callbacks into the database, and serves the
//! per-person detection history.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use facewatch_co::queue::MqttJobQueue;
use facewatch_co::{build_router, AppState};

#[derive(Parser, Debug)]
#[command(author, version, about = "Face annotation coordination service")]
struct Args {
    /// Root folder holding the database (defaults per-platform)
    #[arg(long)]
    root_folder: Option<PathBuf>,

    /// HTTP listen port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!(
        "Starting Facewatch coordinator (facewatch-co) v{}",
        env!("CARGO_PKG_VERSION")
    );

    let args = Args::parse();
    let config = facewatch_common::config::resolve_config(args.root_folder.as_deref(), args.port)?;

    facewatch_common::config::ensure_root_folder(&config.root_folder)?;

    let db_path = config.database_path();
    info!("Database: {}", db_path.display());
    let pool = facewatch_common::db::init_database(&db_path).await?;

    info!(
        "Job queue broker: {}:{} (queue '{}')",
        config.broker_host, config.broker_port, config.queue_name
    );
    let queue = Arc::new(MqttJobQueue::connect(
        &config.broker_host,
        config.broker_port,
        "facewatch-co",
    ));

    let state = AppState::new(pool, queue, config.queue_name.clone());
    let app = build_router(state);

    let listener =
        tokio::net::TcpListener::bind(("127.0.0.1", config.http_port)).await?;
    info!("Listening on http://127.0.0.1:{}", config.http_port);

    axum::serve(listener, app).await?;

    Ok(())
}
