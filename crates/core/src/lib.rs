//! # Beacon Core
//!
//! The delivery dispatcher and the port interfaces it is built against.
//!
//! This crate contains:
//! - Port traits for the durable store, the transport, and connectivity
//! - Lifecycle signal types and the subscription helper
//! - The [`Dispatcher`]: serial execution, retry budget, flush timer
//!
//! ## Architecture
//! - Depends only on `beacon-domain`
//! - Infrastructure implementations of the ports live in `beacon-infra`

pub mod dispatcher;
pub mod ports;

// Re-export commonly used items
pub use dispatcher::Dispatcher;
pub use ports::{
    spawn_lifecycle_listener, ConnectivityProbe, LifecycleEvent, QueueStore, RequestTransport,
};
