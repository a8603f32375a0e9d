//! Domain constants
//!
//! Centralized location for the delivery queue's fixed protocol and pacing
//! values.

use std::time::Duration;

// Flush pacing
pub const FLUSH_TIMER_INTERVAL: Duration = Duration::from_secs(30);

// Retry budget: a request is dropped once it has failed this many times
pub const MAX_RETRIES: u32 = 3;

// Per-attempt network timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

// Wire contract: {endpoint}/{API_VERSION}/{path}.{API_FORMAT}
pub const API_VERSION: &str = "v2";
pub const API_FORMAT: &str = "json";
pub const DEFAULT_ENDPOINT: &str = "https://api.beaconlinks.io";

// Well-known storage file for the durable queue snapshot
pub const QUEUE_SNAPSHOT_FILENAME: &str = "delivery_queue.json";

// Persisted snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;
