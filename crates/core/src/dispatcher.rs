//! Delivery dispatcher: durable queue, retry budget, and flush timer.
//!
//! The dispatcher owns the in-memory queue of pending [`DeliveryRequest`]s,
//! persists a snapshot after every mutation, and drains the queue serially
//! (at most one request in flight). Flushes are paced by a single one-shot
//! timer and by connectivity/app-lifecycle transitions rather than by
//! enqueueing itself: callers enqueue, and a timer tick, a foreground
//! transition, or an explicit [`Dispatcher::attempt_flush`] drains.
//!
//! All queue and timer state lives behind one mutex, so mutations from the
//! enqueue path, the drain task, and the timer task are serialized.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use beacon_core::Dispatcher;
//! use beacon_domain::{DeliveryRequest, DispatcherConfig, RequestMethod};
//!
//! # async fn example(
//! #     store: Arc<dyn beacon_core::QueueStore>,
//! #     transport: Arc<dyn beacon_core::RequestTransport>,
//! #     connectivity: Arc<dyn beacon_core::ConnectivityProbe>,
//! # ) {
//! let dispatcher = Dispatcher::new(store, transport, connectivity, DispatcherConfig::default());
//! dispatcher.start().await;
//!
//! let request = DeliveryRequest::from_path(
//!     RequestMethod::Post,
//!     "https://api.beaconlinks.io",
//!     "sessions",
//!     Some("app-token".into()),
//!     Some(serde_json::json!({"session": {"duration": 12}})),
//! );
//! dispatcher.enqueue(request).await;
//! # }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use beacon_domain::{DeliveryRequest, DispatcherConfig};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::ports::{ConnectivityProbe, LifecycleEvent, QueueStore, RequestTransport};

/// The armed one-shot flush timer.
///
/// The epoch distinguishes a firing timer from a replacement armed after it
/// was disarmed, so a stale wakeup never clears a newer timer.
struct FlushTimer {
    epoch: u64,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Queue and timer state, guarded by a single lock.
struct DispatcherState {
    queue: Vec<DeliveryRequest>,
    timer: Option<FlushTimer>,
    timer_epoch: u64,
    draining: bool,
}

struct Inner {
    store: Arc<dyn QueueStore>,
    transport: Arc<dyn RequestTransport>,
    connectivity: Arc<dyn ConnectivityProbe>,
    config: DispatcherConfig,
    state: Mutex<DispatcherState>,
    started: AtomicBool,
}

/// Durable, retrying delivery dispatcher.
///
/// Cheap to clone; clones share the same queue, timer, and store.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

impl Dispatcher {
    /// Create a dispatcher over the given collaborators.
    ///
    /// The instance is inert until [`Dispatcher::start`] is called.
    pub fn new(
        store: Arc<dyn QueueStore>,
        transport: Arc<dyn RequestTransport>,
        connectivity: Arc<dyn ConnectivityProbe>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                transport,
                connectivity,
                config,
                state: Mutex::new(DispatcherState {
                    queue: Vec::new(),
                    timer: None,
                    timer_epoch: 0,
                    draining: false,
                }),
                started: AtomicBool::new(false),
            }),
        }
    }

    /// Load the persisted queue and immediately attempt a flush.
    ///
    /// Idempotent: a second call while the instance is running is a no-op.
    /// An unreadable snapshot degrades to an empty queue.
    pub async fn start(&self) {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            debug!("Dispatcher already started");
            return;
        }

        let loaded = match self.inner.store.load().await {
            Ok(requests) => requests,
            Err(err) => {
                warn!(error = %err, "Failed to load persisted queue; starting empty");
                Vec::new()
            }
        };

        info!(count = loaded.len(), "Dispatcher starting with persisted queue");

        {
            let mut state = self.inner.state.lock().await;
            state.queue = loaded;
        }

        self.attempt_flush().await;
    }

    /// Append a request to the tail of the queue and persist the snapshot.
    ///
    /// A request whose retry budget is exhausted is silently discarded: the
    /// queue and the snapshot are left untouched. Enqueueing never triggers a
    /// flush by itself.
    pub async fn enqueue(&self, request: DeliveryRequest) {
        let mut state = self.inner.state.lock().await;
        if self.inner.accept_locked(&mut state, request) {
            self.inner.persist_locked(&state).await;
        }
    }

    /// Attempt to drain the queue over the network.
    ///
    /// Arms the flush timer instead when the queue is empty or connectivity
    /// is unavailable. A drain pass already in progress is left alone. The
    /// pass itself runs on a spawned task; the caller never blocks on
    /// network I/O.
    pub async fn attempt_flush(&self) {
        Arc::clone(&self.inner).attempt_flush().await;
    }

    /// Arm the one-shot flush timer. No-op while a timer is armed.
    pub async fn start_flush_timer(&self) {
        let mut state = self.inner.state.lock().await;
        Inner::arm_timer(&self.inner, &mut state);
    }

    /// Disarm the flush timer. No-op while no timer is armed.
    ///
    /// Does not interrupt a drain pass in progress.
    pub async fn stop_flush_timer(&self) {
        let mut state = self.inner.state.lock().await;
        Inner::disarm_timer(&mut state);
    }

    /// React to an app-lifecycle transition.
    pub async fn on_lifecycle_event(&self, event: LifecycleEvent) {
        match event {
            LifecycleEvent::Foregrounded => {
                debug!("App foregrounded; attempting flush");
                self.attempt_flush().await;
            }
            LifecycleEvent::Backgrounded => {
                debug!("App backgrounded; disarming flush timer");
                self.stop_flush_timer().await;
            }
        }
    }

    /// Number of requests currently pending.
    pub async fn pending_len(&self) -> usize {
        self.inner.state.lock().await.queue.len()
    }

    /// Snapshot of the pending requests, in queue order.
    pub async fn pending(&self) -> Vec<DeliveryRequest> {
        self.inner.state.lock().await.queue.clone()
    }

    /// The configuration this dispatcher was built with.
    pub fn config(&self) -> &DispatcherConfig {
        &self.inner.config
    }
}

impl Inner {
    async fn attempt_flush(self: Arc<Self>) {
        let mut state = self.state.lock().await;

        if state.draining {
            debug!("Drain pass already in progress; skipping flush");
            return;
        }

        if state.queue.is_empty() || !self.connectivity.has_connectivity() {
            Self::arm_timer(&self, &mut state);
            return;
        }

        Self::disarm_timer(&mut state);
        state.draining = true;
        let snapshot = state.queue.clone();
        drop(state);

        info!(count = snapshot.len(), "Starting drain pass");
        let inner = Arc::clone(&self);
        tokio::spawn(async move {
            inner.drain_pass(snapshot).await;
        });
    }

    /// Execute one drain pass over an immutable snapshot of the queue.
    ///
    /// Requests run strictly one at a time. Completions mutate the live
    /// queue, so a request that fails retryably is re-appended at the tail
    /// and is not attempted again within this pass; a non-retryable failure
    /// drops the request outright. The timer is re-armed when the pass ends
    /// regardless of per-request outcomes.
    async fn drain_pass(self: Arc<Self>, snapshot: Vec<DeliveryRequest>) {
        for mut request in snapshot {
            match self.transport.execute(&request).await {
                Ok(body) => {
                    debug!(request_id = %request.id, response = %body, "Delivery succeeded");
                    let mut state = self.state.lock().await;
                    state.queue.retain(|queued| queued.id != request.id);
                    self.persist_locked(&state).await;
                }
                Err(err) => {
                    warn!(
                        request_id = %request.id,
                        retries = request.retry_count,
                        error = %err,
                        "Delivery failed"
                    );
                    let mut state = self.state.lock().await;
                    state.queue.retain(|queued| queued.id != request.id);
                    if err.is_retryable() {
                        request.increment_retries();
                        self.accept_locked(&mut state, request);
                    } else {
                        warn!(request_id = %request.id, "Failure is not retryable; dropping request");
                    }
                    self.persist_locked(&state).await;
                }
            }
        }

        let mut state = self.state.lock().await;
        state.draining = false;
        Self::arm_timer(&self, &mut state);
        debug!("Drain pass completed");
    }

    /// Append a request unless its retry budget is exhausted.
    fn accept_locked(&self, state: &mut DispatcherState, request: DeliveryRequest) -> bool {
        if !request.can_retry(self.config.max_retries) {
            warn!(
                request_id = %request.id,
                retries = request.retry_count,
                "Retry budget exhausted; dropping request"
            );
            return false;
        }

        debug!(request_id = %request.id, "Adding request to queue");
        state.queue.push(request);
        true
    }

    /// Persist the current queue, best effort. A write failure is logged and
    /// in-memory operation continues.
    async fn persist_locked(&self, state: &DispatcherState) {
        if let Err(err) = self.store.save(&state.queue).await {
            warn!(error = %err, "Failed to persist queue snapshot; continuing in memory");
        }
    }

    fn arm_timer(this: &Arc<Self>, state: &mut DispatcherState) {
        if state.timer.is_some() {
            return;
        }

        state.timer_epoch += 1;
        let epoch = state.timer_epoch;
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let interval = this.config.flush_interval;
        let inner = Arc::clone(this);

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(interval) => {
                    {
                        let mut state = inner.state.lock().await;
                        // A stale wakeup must not clear a newer timer.
                        if state.timer.as_ref().map(|timer| timer.epoch) != Some(epoch) {
                            return;
                        }
                        state.timer = None;
                    }
                    debug!("Flush timer fired");
                    inner.attempt_flush().await;
                }
            }
        });

        state.timer = Some(FlushTimer { epoch, cancel, handle });
        debug!(epoch, "Flush timer armed");
    }

    fn disarm_timer(state: &mut DispatcherState) {
        if let Some(timer) = state.timer.take() {
            timer.cancel.cancel();
            timer.handle.abort();
            debug!(epoch = timer.epoch, "Flush timer disarmed");
        }
    }
}
