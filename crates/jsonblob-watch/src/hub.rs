use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{debug, warn};

use crate::error::{WatchError, WatchResult};
use crate::event::ChangeEvent;

/// Configuration for a [`WatchHub`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Capacity of each subscriber's live-event queue. The snapshot replayed
    /// on subscribe is added on top of this.
    pub channel_capacity: usize,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
        }
    }
}

type ObjectFilter<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// A registered subscriber: a filter paired with the sending half of its queue.
struct Subscriber<T> {
    filter: ObjectFilter<T>,
    sender: broadcast::Sender<ChangeEvent<T>>,
}

struct HubInner<T> {
    subscribers: RwLock<HashMap<u64, Subscriber<T>>>,
    next_id: AtomicU64,
    config: WatchConfig,
}

impl<T> HubInner<T> {
    fn unsubscribe(&self, id: u64) -> bool {
        // Dropping the sender closes the queue; doing it under the write lock
        // guarantees no broadcast is mid-send on it.
        let removed = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some();
        if removed {
            debug!(subscription = id, "watch stopped");
        }
        removed
    }
}

/// Fan-out hub delivering change events to every matching subscriber.
///
/// Cloning is cheap and yields a handle to the same subscriber registry.
pub struct WatchHub<T> {
    inner: Arc<HubInner<T>>,
}

impl<T> Clone for WatchHub<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for WatchHub<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchHub")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + Send + Sync + 'static> Default for WatchHub<T> {
    fn default() -> Self {
        Self::new(WatchConfig::default())
    }
}

impl<T: Clone + Send + Sync + 'static> WatchHub<T> {
    pub fn new(config: WatchConfig) -> Self {
        Self {
            inner: Arc::new(HubInner {
                subscribers: RwLock::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                config,
            }),
        }
    }

    pub fn config(&self) -> &WatchConfig {
        &self.inner.config
    }

    /// Subscribe to live events for objects accepted by `filter`.
    pub fn subscribe<F>(&self, filter: F) -> Watch<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let empty = || Ok::<_, std::convert::Infallible>(Vec::new());
        match self.subscribe_with_snapshot(filter, empty) {
            Ok(watch) => watch,
            Err(never) => match never {},
        }
    }

    /// Subscribe with a snapshot-then-tail stream.
    ///
    /// `snapshot` runs while the registry is exclusively locked, so no
    /// broadcast can be issued between reading the snapshot and registering
    /// the subscriber. Each snapshot object is queued as an `Added` event
    /// ahead of any live event. If `snapshot` fails nothing is registered.
    pub fn subscribe_with_snapshot<F, S, E>(&self, filter: F, snapshot: S) -> Result<Watch<T>, E>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
        S: FnOnce() -> Result<Vec<T>, E>,
    {
        let mut subscribers = self
            .inner
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let initial = snapshot()?;
        let capacity = (self.inner.config.channel_capacity + initial.len()).max(1);
        let (sender, receiver) = broadcast::channel(capacity);

        let replayed = initial.len();
        for object in initial {
            // The receiver is alive and the queue has room for the whole
            // snapshot, so this cannot fail.
            let _ = sender.send(ChangeEvent::added(object));
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        subscribers.insert(
            id,
            Subscriber {
                filter: Arc::new(filter),
                sender,
            },
        );
        drop(subscribers);

        debug!(subscription = id, replayed, capacity, "watch started");
        Ok(Watch {
            id,
            receiver,
            canceller: WatchCanceller {
                id,
                inner: Arc::clone(&self.inner),
            },
        })
    }

    /// Push `event` onto the queue of every subscriber whose filter accepts
    /// its object. Returns the number of subscribers it was delivered to.
    ///
    /// Never blocks on a slow subscriber.
    pub fn broadcast(&self, event: ChangeEvent<T>) -> usize {
        let subscribers = self
            .inner
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        let mut delivered = 0;
        for sub in subscribers.values() {
            if !(sub.filter)(&event.object) {
                continue;
            }
            if sub.sender.send(event.clone()).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    /// Remove a subscriber and close its queue. Returns `false` if it was
    /// already gone.
    pub fn unsubscribe(&self, id: u64) -> bool {
        self.inner.unsubscribe(id)
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Handle that stops a watch from any thread.
pub struct WatchCanceller<T> {
    id: u64,
    inner: Arc<HubInner<T>>,
}

impl<T> Clone for WatchCanceller<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> WatchCanceller<T> {
    /// Stop the watch. Idempotent; returns `true` on the call that removed it.
    pub fn cancel(&self) -> bool {
        self.inner.unsubscribe(self.id)
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl<T> fmt::Debug for WatchCanceller<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchCanceller").field("id", &self.id).finish()
    }
}

/// The reading end of a subscription.
///
/// Dropping the watch unsubscribes it.
pub struct Watch<T> {
    id: u64,
    receiver: broadcast::Receiver<ChangeEvent<T>>,
    canceller: WatchCanceller<T>,
}

impl<T: Clone> Watch<T> {
    /// Subscription id, unique within the hub.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// A handle that can stop this watch from another thread or task.
    pub fn canceller(&self) -> WatchCanceller<T> {
        self.canceller.clone()
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once the watch is stopped and every queued event has
    /// been read. An overflow is reported once as `Some(Err(..))`; reading
    /// resumes with the oldest event still queued.
    pub async fn recv(&mut self) -> Option<WatchResult<ChangeEvent<T>>> {
        match self.receiver.recv().await {
            Ok(event) => Some(Ok(event)),
            Err(RecvError::Closed) => None,
            Err(RecvError::Lagged(skipped)) => Some(Err(self.overflow(skipped))),
        }
    }

    /// Blocking variant of [`Watch::recv`] for use outside an async runtime.
    pub fn blocking_recv(&mut self) -> Option<WatchResult<ChangeEvent<T>>> {
        match self.receiver.blocking_recv() {
            Ok(event) => Some(Ok(event)),
            Err(RecvError::Closed) => None,
            Err(RecvError::Lagged(skipped)) => Some(Err(self.overflow(skipped))),
        }
    }

    /// Take the next event if one is queued.
    ///
    /// `Ok(None)` means the queue is empty but the watch is live.
    pub fn try_recv(&mut self) -> WatchResult<Option<ChangeEvent<T>>> {
        match self.receiver.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Closed) => Err(WatchError::Closed),
            Err(TryRecvError::Lagged(skipped)) => Err(self.overflow(skipped)),
        }
    }

    /// Stop the watch.
    pub fn stop(self) {
        drop(self);
    }

    fn overflow(&self, skipped: u64) -> WatchError {
        warn!(subscription = self.id, skipped, "watch queue overflowed, oldest events dropped");
        WatchError::Overflow {
            subscription: self.id,
            skipped,
        }
    }
}

impl<T> Drop for Watch<T> {
    fn drop(&mut self) {
        self.canceller.cancel();
    }
}

impl<T> fmt::Debug for Watch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watch").field("id", &self.id).finish_non_exhaustive()
    }
}
