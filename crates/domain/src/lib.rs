//! # Beacon Domain
//!
//! Domain types and models for the Beacon delivery queue.
//!
//! This crate contains:
//! - The delivery request model (method, URL, token, payload, retry count)
//! - Domain error types and Result definitions
//! - Dispatcher configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other Beacon crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::DispatcherConfig;
pub use errors::{BeaconError, Result};
pub use types::{DeliveryRequest, RequestMethod};
