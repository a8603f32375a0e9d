//! # Beacon Infrastructure
//!
//! Infrastructure implementations of the core ports.
//!
//! This crate contains:
//! - The reqwest-based [`http::HttpTransport`]
//! - The file-backed [`store::FileQueueStore`] durable snapshot
//! - Configuration loading from TOML files and environment variables
//!
//! ## Architecture
//! - Implements traits defined in `beacon-core`
//! - Contains all "impure" code (network and filesystem I/O)

pub mod config;
pub mod http;
pub mod store;

// Re-export commonly used items
pub use http::HttpTransport;
pub use store::FileQueueStore;
