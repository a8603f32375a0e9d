//! Port interfaces consumed by the dispatcher

use async_trait::async_trait;
use beacon_domain::{BeaconError, DeliveryRequest, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::dispatcher::Dispatcher;

/// Durable storage for the ordered pending-request queue.
///
/// The dispatcher writes a full snapshot after every queue mutation and reads
/// it back once at startup.
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Load the persisted queue snapshot, oldest first.
    async fn load(&self) -> Result<Vec<DeliveryRequest>>;

    /// Replace the persisted snapshot with the given queue contents.
    async fn save(&self, requests: &[DeliveryRequest]) -> Result<()>;
}

/// Executes a single delivery request against the network.
///
/// Exactly two outcomes: the decoded response body on success, or a
/// [`BeaconError`] covering both transport-level failures and server
/// responses with status >= 300.
#[async_trait]
pub trait RequestTransport: Send + Sync {
    async fn execute(&self, request: &DeliveryRequest)
        -> std::result::Result<serde_json::Value, BeaconError>;
}

/// Reports whether the host currently has network connectivity.
pub trait ConnectivityProbe: Send + Sync {
    fn has_connectivity(&self) -> bool;
}

/// App-lifecycle transitions the dispatcher reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// App moved to the foreground; the dispatcher attempts a flush.
    Foregrounded,
    /// App moved to the background; the idle flush timer is disarmed.
    Backgrounded,
}

/// Subscribe a dispatcher to a stream of lifecycle events.
///
/// Consumes events until the sender side is dropped. The returned handle can
/// be aborted at host shutdown.
pub fn spawn_lifecycle_listener(
    dispatcher: Dispatcher,
    mut events: mpsc::Receiver<LifecycleEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            dispatcher.on_lifecycle_event(event).await;
        }
        debug!("Lifecycle event channel closed");
    })
}
