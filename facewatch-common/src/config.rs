//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default HTTP port for the coordinator service
pub const DEFAULT_HTTP_PORT: u16 = 5740;

/// Queue name shared with the external detection worker
pub const DEFAULT_QUEUE_NAME: &str = "face";

/// Resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Root folder holding the database and any working files
    pub root_folder: PathBuf,
    /// HTTP listen port
    pub http_port: u16,
    /// Broker host for the job queue
    pub broker_host: String,
    /// Broker port for the job queue
    pub broker_port: u16,
    /// Queue name jobs are pushed to
    pub queue_name: String,
}

impl ServiceConfig {
    /// Path of the SQLite database inside the root folder
    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join("facewatch.db")
    }
}

/// Optional TOML config file contents (`facewatch/config.toml`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub root_folder: Option<PathBuf>,
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub queue: QueueSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerSection {
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueueSection {
    pub broker_host: Option<String>,
    pub broker_port: Option<u16>,
    pub name: Option<String>,
}

/// Resolve the service configuration following the priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_config(cli_root: Option<&Path>, cli_port: Option<u16>) -> Result<ServiceConfig> {
    let file = load_config_file().ok().unwrap_or_default();

    let root_folder = if let Some(path) = cli_root {
        path.to_path_buf()
    } else if let Ok(path) = std::env::var("FACEWATCH_ROOT") {
        PathBuf::from(path)
    } else if let Some(path) = file.root_folder.clone() {
        path
    } else {
        default_root_folder()
    };

    let http_port = cli_port
        .or(file.server.port)
        .unwrap_or(DEFAULT_HTTP_PORT);

    let broker_host = std::env::var("FACEWATCH_BROKER_HOST")
        .ok()
        .or(file.queue.broker_host.clone())
        .unwrap_or_else(|| "127.0.0.1".to_string());

    let broker_port = std::env::var("FACEWATCH_BROKER_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .or(file.queue.broker_port)
        .unwrap_or(1883);

    let queue_name = file
        .queue
        .name
        .unwrap_or_else(|| DEFAULT_QUEUE_NAME.to_string());

    Ok(ServiceConfig {
        root_folder,
        http_port,
        broker_host,
        broker_port,
        queue_name,
    })
}

/// Load the TOML config file from the platform config directory
fn load_config_file() -> Result<FileConfig> {
    let path = config_file_path()?;
    let contents = std::fs::read_to_string(&path)?;
    toml::from_str(&contents).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
}

fn config_file_path() -> Result<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("facewatch").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }
    let system_config = PathBuf::from("/etc/facewatch/config.toml");
    if system_config.exists() {
        return Ok(system_config);
    }
    Err(Error::Config("No config file found".to_string()))
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("facewatch"))
        .unwrap_or_else(|| PathBuf::from("./facewatch_data"))
}

/// Ensure the root folder directory exists, creating it if missing
pub fn ensure_root_folder(root: &Path) -> Result<()> {
    if !root.exists() {
        std::fs::create_dir_all(root)?;
        tracing::info!("Created root folder: {}", root.display());
    }
    Ok(())
}
