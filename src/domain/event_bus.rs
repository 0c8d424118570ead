//! In-process publish/subscribe channel between redirects and click accounting.
//!
//! The bus is a bounded FIFO queue ([`tokio::sync::mpsc`]). It is constructed
//! once by the composition root and cloned into every publisher; the
//! [`crate::domain::click_worker::ClickAggregator`] takes the single
//! [`Subscription`].
//!
//! # Delivery
//!
//! At-most-once, best-effort, non-durable. Anything still queued when the
//! process stops is lost. Events are handed out in enqueue order. When more
//! than one subscription exists they compete for events: each event reaches
//! exactly one of them.
//!
//! # Backpressure
//!
//! Detached publishes are capped at the queue size: at most `capacity` tasks
//! may be waiting to enqueue at once, further events are dropped with a
//! warning. A bus with no live [`Subscription`] is closed and rejects events.

use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Mutex, Semaphore, mpsc};
use tracing::{debug, warn};

use crate::domain::event::Event;

/// What [`EventBus::publish`] does when the queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Wait for free capacity.
    Block,
    /// Discard the event and log a warning.
    #[default]
    Drop,
}

impl FromStr for OverflowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "block" => Ok(Self::Block),
            "drop" => Ok(Self::Drop),
            other => Err(format!("unknown overflow policy '{other}'")),
        }
    }
}

/// Errors returned by [`EventBus::publish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BusError {
    #[error("event bus is full")]
    Full,
    #[error("event bus is closed")]
    Closed,
}

/// Cloneable publisher handle and subscription factory.
#[derive(Clone)]
pub struct EventBus {
    tx: mpsc::Sender<Event>,
    rx: Arc<Mutex<mpsc::Receiver<Event>>>,
    subscribers: Arc<AtomicUsize>,
    detached: Arc<Semaphore>,
    overflow: OverflowPolicy,
}

impl EventBus {
    /// Creates a bus buffering up to `capacity` events.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize, overflow: OverflowPolicy) -> Self {
        let (tx, rx) = mpsc::channel(capacity);

        Self {
            tx,
            rx: Arc::new(Mutex::new(rx)),
            subscribers: Arc::new(AtomicUsize::new(0)),
            detached: Arc::new(Semaphore::new(capacity)),
            overflow,
        }
    }

    /// Enqueues an event.
    ///
    /// With [`OverflowPolicy::Block`] this waits while the queue is full.
    /// With [`OverflowPolicy::Drop`] a full queue discards the event.
    ///
    /// # Errors
    ///
    /// - [`BusError::Full`] if the event was dropped on overflow
    /// - [`BusError::Closed`] if no subscription is attached
    pub async fn publish(&self, event: Event) -> Result<(), BusError> {
        if self.is_closed() {
            return Err(BusError::Closed);
        }

        match self.overflow {
            OverflowPolicy::Block => self.tx.send(event).await.map_err(|_| BusError::Closed),
            OverflowPolicy::Drop => self.tx.try_send(event).map_err(|e| match e {
                mpsc::error::TrySendError::Full(event) => {
                    warn!(kind = %event.kind(), "Event bus full, event dropped");
                    metrics::counter!("bus_events_dropped_total").increment(1);
                    BusError::Full
                }
                mpsc::error::TrySendError::Closed(_) => BusError::Closed,
            }),
        }
    }

    /// Publishes from a detached task so the caller never waits.
    ///
    /// The outcome is only logged; callers cannot observe it. When `capacity`
    /// detached publishes are already pending the event is dropped without
    /// spawning.
    pub fn publish_detached(&self, event: Event) {
        let permit = match self.detached.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!(kind = %event.kind(), "Too many pending publishes, event dropped");
                metrics::counter!("bus_events_dropped_total").increment(1);
                return;
            }
        };

        let bus = self.clone();
        tokio::spawn(async move {
            let kind = event.kind();
            if let Err(e) = bus.publish(event).await {
                debug!(kind = %kind, error = %e, "Detached publish failed");
            }
            drop(permit);
        });
    }

    /// Returns a receive handle competing for events with any other handle.
    pub fn subscribe(&self) -> Subscription {
        self.subscribers.fetch_add(1, Ordering::SeqCst);

        Subscription {
            rx: self.rx.clone(),
            subscribers: self.subscribers.clone(),
        }
    }

    /// Returns true while no [`Subscription`] is attached.
    pub fn is_closed(&self) -> bool {
        self.subscriber_count() == 0 || self.tx.is_closed()
    }

    /// Free slots currently available in the queue.
    pub fn capacity(&self) -> usize {
        self.tx.capacity()
    }

    /// Configured queue size.
    pub fn max_capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    /// Number of events waiting to be received.
    pub fn queued(&self) -> usize {
        self.max_capacity() - self.capacity()
    }

    /// Detached publishes spawned and not yet finished.
    pub fn pending_publishes(&self) -> usize {
        self.max_capacity() - self.detached.available_permits()
    }

    /// Number of live [`Subscription`] handles.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.load(Ordering::SeqCst)
    }

    pub fn overflow_policy(&self) -> OverflowPolicy {
        self.overflow
    }
}

/// Receive side of the bus.
pub struct Subscription {
    rx: Arc<Mutex<mpsc::Receiver<Event>>>,
    subscribers: Arc<AtomicUsize>,
}

impl Subscription {
    /// Waits for the next event.
    ///
    /// Returns `None` once every [`EventBus`] handle is dropped and the
    /// queue is empty.
    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.lock().await.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.subscribers.fetch_sub(1, Ordering::SeqCst);
    }
}
