//! Telemetry configuration loading

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Telemetry configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TelemetryConfig {
    /// Whether command usage is reported (default: true)
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Debug mode - print events instead of sending (default: false)
    #[serde(default)]
    pub debug: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debug: false,
        }
    }
}

fn default_enabled() -> bool {
    true
}

impl TelemetryConfig {
    /// Whether finished events should leave the process at all
    pub fn should_forward(&self) -> bool {
        self.enabled || self.debug
    }
}

/// Load telemetry configuration with precedence:
/// 1. Environment variables (highest priority)
/// 2. User config (~/.gp/config.toml)
/// 3. Default (enabled=true)
pub fn load_telemetry_config() -> Result<TelemetryConfig> {
    let mut config = TelemetryConfig::default();

    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            match load_config_from_file(&user_config) {
                Ok(cfg) => config = cfg,
                Err(e) => tracing::warn!(
                    path = %user_config.display(),
                    "ignoring user config: {e:#}"
                ),
            }
        }
    }

    apply_env_overrides(&mut config);

    Ok(config)
}

/// Location of the user config file
pub fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".gp").join("config.toml"))
}

/// Load the `[telemetry]` table of a TOML config file
fn load_config_from_file(path: &Path) -> Result<TelemetryConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;

    #[derive(Deserialize)]
    struct FullConfig {
        #[serde(default)]
        telemetry: Option<TelemetryConfig>,
    }

    let full_config: FullConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;

    Ok(full_config.telemetry.unwrap_or_default())
}

/// Apply environment variable overrides
fn apply_env_overrides(config: &mut TelemetryConfig) {
    // GP_TELEMETRY_DISABLED=1 disables telemetry
    if env::var_os("GP_TELEMETRY_DISABLED").is_some() {
        config.enabled = false;
        config.debug = false;
        return;
    }

    // DO_NOT_TRACK=1 (universal opt-out)
    if env::var_os("DO_NOT_TRACK").is_some() {
        config.enabled = false;
        config.debug = false;
        return;
    }

    // GP_TELEMETRY_DEBUG=1 enables debug mode
    if env::var_os("GP_TELEMETRY_DEBUG").is_some() {
        config.debug = true;
    }
}
