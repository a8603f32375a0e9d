//! Dispatcher configuration structures

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ENDPOINT, FLUSH_TIMER_INTERVAL, MAX_RETRIES, QUEUE_SNAPSHOT_FILENAME, REQUEST_TIMEOUT,
};

/// Configuration for the delivery dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Base endpoint of the vendor API
    pub endpoint: String,
    /// Interval of the one-shot flush timer
    pub flush_interval: Duration,
    /// Maximum failed attempts before a request is permanently dropped
    pub max_retries: u32,
    /// Per-attempt network timeout
    pub request_timeout: Duration,
    /// SDK version reported in identification headers
    pub sdk_version: String,
    /// Deployment environment reported in identification headers
    pub environment: String,
    /// Location of the durable queue snapshot
    pub queue_path: PathBuf,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            flush_interval: FLUSH_TIMER_INTERVAL,
            max_retries: MAX_RETRIES,
            request_timeout: REQUEST_TIMEOUT,
            sdk_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "production".to_string(),
            queue_path: PathBuf::from(QUEUE_SNAPSHOT_FILENAME),
        }
    }
}
