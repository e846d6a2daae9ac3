//! File logging
//!
//! The TUI owns the terminal, so tracing output goes to
//! ~/.local/state/consulta/consulta.log. Filter with CONSULTA_LOG
//! (EnvFilter syntax, default `info`).

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config;

pub const LOG_ENV: &str = "CONSULTA_LOG";

pub fn log_path() -> Result<PathBuf> {
    Ok(config::state_dir()?.join("consulta.log"))
}

/// Install the global subscriber, appending to `path`
pub fn init_at(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .context("Logging already initialised")?;
    Ok(())
}

pub fn init() -> Result<PathBuf> {
    config::ensure_dirs()?;
    let path = log_path()?;
    init_at(&path)?;
    Ok(path)
}
