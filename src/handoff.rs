//! Shared producer/consumer hand-off protocol.
//!
//! One mutex per queue guards the backing store and the wait list. Every
//! enqueue first tries to satisfy the oldest parked consumer; a notification
//! only reaches the backing store when nobody is waiting. The lock is held
//! for bookkeeping only, never across a consumer's block: a parked consumer
//! sleeps on its own wait slot's condvar.
//!
//! The delicate case is a timed wait expiring while an enqueue is handing
//! the slot a notification. A producer always writes a slot while holding
//! the queue lock and unlinks the slot from the wait list in the same
//! critical section, so the timed-out consumer re-acquires the queue lock,
//! self-removes if it is still linked, and then trusts whatever its slot
//! holds. A notification handed to the slot in that window is returned, not
//! dropped.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use minstant::Instant;

use crate::notification::Sink;
use crate::store::OrderedStore;
use crate::trace::{debug, trace};

/// Timeout specification for blocking operations.
#[derive(Debug, Clone, Copy)]
pub enum Timeout {
    /// Wait indefinitely.
    Infinite,
    /// Wait for at most the specified duration.
    Duration(Duration),
}

impl From<Duration> for Timeout {
    fn from(d: Duration) -> Self {
        Self::Duration(d)
    }
}

/// Parking space for one blocked consumer.
///
/// The slot's own mutex/condvar pair is independent of the queue lock.
/// `item` is written at most once, always by a thread holding the queue
/// lock (a producer, or `wake_all` setting `ready` with no item).
struct WaitSlot<T> {
    state: Mutex<SlotState<T>>,
    available: Condvar,
}

struct SlotState<T> {
    item: Option<T>,
    ready: bool,
}

impl<T> WaitSlot<T> {
    fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                item: None,
                ready: false,
            }),
            available: Condvar::new(),
        }
    }

    /// Hands a notification to the parked consumer. Queue lock held.
    fn fulfill(&self, item: T) {
        let mut state = self.state.lock().unwrap();
        debug_assert!(!state.ready, "a wait slot is fulfilled at most once");
        state.item = Some(item);
        state.ready = true;
        self.available.notify_one();
    }

    /// Releases the consumer without a notification. Queue lock held.
    fn wake(&self) {
        let mut state = self.state.lock().unwrap();
        state.ready = true;
        self.available.notify_one();
    }

    /// Blocks until the slot is signaled, then takes whatever it holds.
    fn wait(&self) -> Option<T> {
        let mut state = self.state.lock().unwrap();
        while !state.ready {
            state = self.available.wait(state).unwrap();
        }
        state.item.take()
    }

    /// Blocks until the slot is signaled or `deadline` passes.
    ///
    /// Returns whether the signal arrived in time. Does not consume the
    /// item: on timeout the caller must go back through the queue lock
    /// before reading the slot.
    fn wait_until(&self, deadline: Instant) -> bool {
        let mut state = self.state.lock().unwrap();
        while !state.ready {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _) = self.available.wait_timeout(state, deadline - now).unwrap();
            state = guard;
        }
        true
    }

    /// Takes the slot's notification, if one was handed over.
    fn take(&self) -> Option<T> {
        self.state.lock().unwrap().item.take()
    }
}

/// The hand-off core shared by both queue flavors.
///
/// Generic over the [`OrderedStore`] that decides delivery order among
/// buffered notifications; the wait-list protocol is identical for both.
pub(crate) struct Handoff<S: OrderedStore> {
    inner: Mutex<Inner<S>>,
}

struct Inner<S: OrderedStore> {
    store: S,
    /// Parked consumers, oldest first. Non-empty only while `store` is empty.
    waiters: VecDeque<Arc<WaitSlot<S::Item>>>,
}

impl<S: OrderedStore> Handoff<S> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                store: S::default(),
                waiters: VecDeque::new(),
            }),
        }
    }

    /// Delivers to the oldest parked consumer, or buffers at `placement`.
    pub(crate) fn enqueue(&self, placement: S::Placement, item: S::Item) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(slot) = inner.waiters.pop_front() {
            debug_assert!(inner.store.is_empty());
            slot.fulfill(item);
            trace!("direct hand-off to parked consumer");
        } else {
            inner.store.insert(placement, item);
        }
    }

    /// Removes and returns the backing-store head, if any. Never blocks.
    pub(crate) fn dequeue(&self) -> Option<S::Item> {
        self.inner.lock().unwrap().store.take_head()
    }

    /// Returns the head, or parks the calling thread until a producer (or
    /// [`wake_all`](Self::wake_all)) releases it.
    pub(crate) fn dequeue_blocking(&self, timeout: Timeout) -> Option<S::Item> {
        let slot = {
            let mut inner = self.inner.lock().unwrap();
            if let Some(item) = inner.store.take_head() {
                return Some(item);
            }
            let slot = Arc::new(WaitSlot::new());
            inner.waiters.push_back(Arc::clone(&slot));
            trace!("queue empty, parking consumer");
            slot
        };

        match timeout {
            Timeout::Infinite => slot.wait(),
            Timeout::Duration(d) => {
                if slot.wait_until(Instant::now() + d) {
                    return slot.take();
                }
                // Expired. A producer may still fulfill the slot between the
                // timer firing and us getting the lock; once we hold the lock
                // and the slot is unlinked, its contents are final.
                let mut inner = self.inner.lock().unwrap();
                if let Some(pos) = inner.waiters.iter().position(|w| Arc::ptr_eq(w, &slot)) {
                    inner.waiters.remove(pos);
                }
                drop(inner);
                let item = slot.take();
                debug!(
                    delivered_during_expiry = item.is_some(),
                    "timed wait expired"
                );
                item
            }
        }
    }

    /// Releases every parked consumer empty-handed and clears the wait list.
    pub(crate) fn wake_all(&self) {
        let mut inner = self.inner.lock().unwrap();
        let _woken = inner.waiters.len();
        for slot in inner.waiters.drain(..) {
            slot.wake();
        }
        debug!(woken = _woken, "released all parked consumers");
    }

    /// Drains the backing store into `sink`, head first.
    ///
    /// The queue lock is held across the whole drain, serializing the pass
    /// with concurrent enqueues.
    pub(crate) fn dispatch<K>(&self, sink: &K)
    where
        K: Sink<S::Item> + ?Sized,
    {
        let mut inner = self.inner.lock().unwrap();
        while let Some(item) = inner.store.take_head() {
            sink.post(item);
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().store.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.lock().unwrap().store.len()
    }

    /// Whether any consumer is currently parked on the wait list.
    pub(crate) fn has_waiting_consumers(&self) -> bool {
        !self.inner.lock().unwrap().waiters.is_empty()
    }

    /// Drops everything buffered. Parked consumers stay parked.
    pub(crate) fn clear(&self) {
        self.inner.lock().unwrap().store.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FifoPlacement, FifoStore};

    fn fifo_core() -> Handoff<FifoStore<u32>> {
        Handoff::new()
    }

    #[test]
    fn test_enqueue_buffers_without_waiters() {
        let core = fifo_core();
        core.enqueue(FifoPlacement::Back, 1);
        core.enqueue(FifoPlacement::Back, 2);

        assert_eq!(core.len(), 2);
        assert_eq!(core.dequeue(), Some(1));
        assert_eq!(core.dequeue(), Some(2));
        assert_eq!(core.dequeue(), None);
    }

    #[test]
    fn test_blocking_fast_path_skips_the_wait_list() {
        let core = fifo_core();
        core.enqueue(FifoPlacement::Back, 7);

        assert_eq!(core.dequeue_blocking(Timeout::Infinite), Some(7));
        assert!(!core.has_waiting_consumers());
    }

    #[test]
    fn test_zero_timeout_returns_empty_and_unlinks_slot() {
        let core = fifo_core();
        let got = core.dequeue_blocking(Timeout::Duration(Duration::ZERO));

        assert_eq!(got, None);
        assert!(!core.has_waiting_consumers());
    }

    #[test]
    fn test_wake_all_on_idle_queue_is_a_noop() {
        let core = fifo_core();
        core.wake_all();
        assert!(core.is_empty());
        assert!(!core.has_waiting_consumers());
    }
}
