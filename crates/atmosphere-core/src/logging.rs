use anyhow::{anyhow, Result};
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the configured log filter
pub const LOG_ENV_VAR: &str = "ATMOSPHERE_LOG";

/// Send tracing output to `path`. The terminal belongs to the UI, so nothing
/// is ever written to stdout or stderr.
pub fn init_file_logging(path: &Path, default_filter: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    tracing::info!(path = %path.display(), "logging initialized");
    Ok(())
}
