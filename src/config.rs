//! Configuration management with XDG paths
//!
//! ~/.config/consulta/config.json - backend URL, defaults (0600)
//! ~/.local/state/consulta/       - log file

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use crate::models::{self, Mode};

const APP_NAME: &str = "consulta";

pub const BACKEND_ENV: &str = "CONSULTA_BACKEND_URL";

/// Get config directory (~/.config/consulta/)
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .context("Could not determine config directory")?;
    Ok(base.join(APP_NAME))
}

/// Get state directory (~/.local/state/consulta/)
pub fn state_dir() -> Result<PathBuf> {
    let base = dirs::state_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".local/state")))
        .context("Could not determine state directory")?;
    Ok(base.join(APP_NAME))
}

/// Get config file path
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.json"))
}

/// Ensure all directories exist
pub fn ensure_dirs() -> Result<()> {
    fs::create_dir_all(config_dir()?)?;
    fs::create_dir_all(state_dir()?)?;
    Ok(())
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the question-answering backend
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    #[serde(default = "default_model")]
    pub default_model: String,

    #[serde(default = "default_mode")]
    pub default_mode: Mode,

    /// Whether the backend may search the web
    #[serde(default = "default_true")]
    pub network_allowed: bool,

    /// Client-side limit for one request. Agent runs can take many minutes.
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// Catalogue offered by the model picker
    #[serde(default = "models::default_models")]
    pub models: Vec<String>,
}

fn default_backend_url() -> String { "http://127.0.0.1:5000".into() }
fn default_model() -> String { "llama3".into() }
fn default_mode() -> Mode { Mode::Simple }
fn default_true() -> bool { true }
fn default_timeout() -> u64 { 900 }

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            default_model: default_model(),
            default_mode: default_mode(),
            network_allowed: default_true(),
            request_timeout_secs: default_timeout(),
            models: models::default_models(),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults
    pub fn load() -> Result<Self> {
        ensure_dirs()?;
        let mut cfg = Self::load_from(&config_path()?)?;

        // Environment variable takes precedence
        if let Ok(url) = std::env::var(BACKEND_ENV) {
            if !url.is_empty() {
                cfg.backend_url = url;
            }
        }
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to disk
    pub fn save(&self) -> Result<()> {
        ensure_dirs()?;
        self.save_to(&config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, &content)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(path, perms)?;

        Ok(())
    }

    /// Apply `consulta config set <key> <value>`
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "backend" | "backend_url" | "url" => {
                if !value.starts_with("http://") && !value.starts_with("https://") {
                    anyhow::bail!("Backend URL must start with http:// or https://");
                }
                self.backend_url = value.trim_end_matches('/').to_string();
            }
            "model" => {
                if value.trim().is_empty() {
                    anyhow::bail!("Model id cannot be empty");
                }
                self.default_model = value.to_string();
                if !self.models.iter().any(|m| m == value) {
                    self.models.push(value.to_string());
                }
            }
            "mode" => {
                let mode: Mode = value.parse()?;
                if !Mode::selectable().contains(&mode) {
                    anyhow::bail!("Mode {} cannot be selected", mode.name());
                }
                self.default_mode = mode;
            }
            "network" => {
                self.network_allowed = match value {
                    "on" | "true" | "yes" | "1" => true,
                    "off" | "false" | "no" | "0" => false,
                    _ => anyhow::bail!("Use on/off for network"),
                };
            }
            "timeout" => {
                let secs: u64 = value
                    .parse()
                    .with_context(|| format!("Invalid timeout: {}", value))?;
                if secs == 0 {
                    anyhow::bail!("Timeout must be at least one second");
                }
                self.request_timeout_secs = secs;
            }
            _ => {
                anyhow::bail!(
                    "Unknown config key: {}. Valid keys: backend, model, mode, network, timeout",
                    key
                );
            }
        }
        Ok(())
    }
}
