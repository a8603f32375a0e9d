//! Configuration loader
//!
//! Builds a [`DispatcherConfig`] from an optional TOML file with environment
//! variable overrides applied on top.
//!
//! ## Environment Variables
//! - `BEACON_ENDPOINT`: Base endpoint of the vendor API
//! - `BEACON_FLUSH_INTERVAL_SECS`: Flush timer interval in seconds
//! - `BEACON_MAX_RETRIES`: Retry budget before a request is dropped
//! - `BEACON_REQUEST_TIMEOUT_SECS`: Per-attempt network timeout in seconds
//! - `BEACON_ENVIRONMENT`: Deployment environment identifier
//! - `BEACON_QUEUE_PATH`: Location of the durable queue snapshot

use std::path::{Path, PathBuf};
use std::time::Duration;

use beacon_domain::{BeaconError, DispatcherConfig, Result};
use serde::Deserialize;
use tracing::debug;

/// Optional fields of a TOML config file, overlaid onto the defaults.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    endpoint: Option<String>,
    flush_interval_secs: Option<u64>,
    max_retries: Option<u32>,
    request_timeout_secs: Option<u64>,
    sdk_version: Option<String>,
    environment: Option<String>,
    queue_path: Option<PathBuf>,
}

/// Load configuration, starting from defaults, then the file (when given),
/// then environment variables.
///
/// # Errors
/// Returns `BeaconError::Config` if the file exists but cannot be read or
/// parsed, or if an environment override carries an unparseable value.
pub fn load(path: Option<&Path>) -> Result<DispatcherConfig> {
    let mut config = match path {
        Some(path) if path.exists() => load_from_file(path)?,
        Some(path) => {
            debug!(path = %path.display(), "Config file not found; using defaults");
            DispatcherConfig::default()
        }
        None => DispatcherConfig::default(),
    };

    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Load configuration from a TOML file.
///
/// Missing keys fall back to the defaults.
pub fn load_from_file(path: &Path) -> Result<DispatcherConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| BeaconError::Config(format!("failed to read {}: {e}", path.display())))?;

    let file: ConfigFile = toml::from_str(&raw)
        .map_err(|e| BeaconError::Config(format!("failed to parse {}: {e}", path.display())))?;

    let mut config = DispatcherConfig::default();
    if let Some(endpoint) = file.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(secs) = file.flush_interval_secs {
        config.flush_interval = Duration::from_secs(secs);
    }
    if let Some(max_retries) = file.max_retries {
        config.max_retries = max_retries;
    }
    if let Some(secs) = file.request_timeout_secs {
        config.request_timeout = Duration::from_secs(secs);
    }
    if let Some(sdk_version) = file.sdk_version {
        config.sdk_version = sdk_version;
    }
    if let Some(environment) = file.environment {
        config.environment = environment;
    }
    if let Some(queue_path) = file.queue_path {
        config.queue_path = queue_path;
    }

    debug!(path = %path.display(), "Configuration loaded from file");
    Ok(config)
}

fn apply_env_overrides(config: &mut DispatcherConfig) -> Result<()> {
    if let Ok(endpoint) = std::env::var("BEACON_ENDPOINT") {
        config.endpoint = endpoint;
    }
    if let Ok(value) = std::env::var("BEACON_FLUSH_INTERVAL_SECS") {
        config.flush_interval = Duration::from_secs(parse_env("BEACON_FLUSH_INTERVAL_SECS", &value)?);
    }
    if let Ok(value) = std::env::var("BEACON_MAX_RETRIES") {
        config.max_retries = parse_env("BEACON_MAX_RETRIES", &value)?;
    }
    if let Ok(value) = std::env::var("BEACON_REQUEST_TIMEOUT_SECS") {
        config.request_timeout = Duration::from_secs(parse_env("BEACON_REQUEST_TIMEOUT_SECS", &value)?);
    }
    if let Ok(environment) = std::env::var("BEACON_ENVIRONMENT") {
        config.environment = environment;
    }
    if let Ok(queue_path) = std::env::var("BEACON_QUEUE_PATH") {
        config.queue_path = PathBuf::from(queue_path);
    }
    Ok(())
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| BeaconError::Config(format!("invalid value for {name}: {value}")))
}
