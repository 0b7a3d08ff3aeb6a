//! Observer fan-out for change events

use super::ChangeEvent;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tracing::{debug, warn};

/// Failure reported by a subscriber; logged by the bus, never propagated
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ObserverError(String);

impl ObserverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Something that wants to hear about changes
///
/// `source` names the engine that published the event.
pub trait Observer: Send + Sync {
    fn on_change(&self, source: &str, event: &ChangeEvent) -> Result<(), ObserverError>;
}

impl<F> Observer for F
where
    F: Fn(&str, &ChangeEvent) -> Result<(), ObserverError> + Send + Sync,
{
    fn on_change(&self, source: &str, event: &ChangeEvent) -> Result<(), ObserverError> {
        self(source, event)
    }
}

/// Handle returned by [`ChangeBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Outcome of one `publish` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Subscribers that handled the event
    pub delivered: usize,
    /// Subscribers that returned an error or panicked
    pub failed: usize,
}

/// Ordered list of observers, invoked synchronously in subscription order
///
/// Every invocation is isolated: an observer that errors or panics is logged
/// and skipped, and the remaining observers still run.
pub struct ChangeBus {
    source: String,
    next_id: AtomicU64,
    observers: RwLock<Vec<(SubscriptionId, Arc<dyn Observer>)>>,
}

impl ChangeBus {
    /// Create a bus whose events are attributed to `source`
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            next_id: AtomicU64::new(0),
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Register an observer; the same observer may be registered more than once
    pub fn subscribe(&self, observer: Arc<dyn Observer>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, observer));
        debug!(subscription = id.0, "observer subscribed");
        id
    }

    /// Remove a registration; false if it was not (or no longer) registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self
            .observers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = observers.len();
        observers.retain(|(sid, _)| *sid != id);
        before != observers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Deliver `event` to every observer
    pub fn publish(&self, event: &ChangeEvent) -> PublishReport {
        // Snapshot so observers can subscribe or call back into the engine
        let observers: Vec<(SubscriptionId, Arc<dyn Observer>)> = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let mut report = PublishReport::default();
        for (id, observer) in observers {
            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| observer.on_change(&self.source, event)));
            match outcome {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(e)) => {
                    report.failed += 1;
                    warn!(subscription = id.0, event = event.kind(), error = %e, "observer failed");
                }
                Err(payload) => {
                    report.failed += 1;
                    warn!(
                        subscription = id.0,
                        event = event.kind(),
                        panic = panic_message(payload.as_ref()),
                        "observer panicked"
                    );
                }
            }
        }
        debug!(
            event = event.kind(),
            delivered = report.delivered,
            failed = report.failed,
            "change published"
        );
        report
    }
}

impl std::fmt::Debug for ChangeBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeBus")
            .field("source", &self.source)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

/// Observer that forwards every event into an `mpsc` channel
pub struct ChannelObserver {
    sender: mpsc::Sender<ChangeEvent>,
}

impl ChannelObserver {
    pub fn new() -> (Self, mpsc::Receiver<ChangeEvent>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }
}

impl Observer for ChannelObserver {
    fn on_change(&self, _source: &str, event: &ChangeEvent) -> Result<(), ObserverError> {
        self.sender
            .send(event.clone())
            .map_err(|_| ObserverError::new("receiver dropped"))
    }
}
