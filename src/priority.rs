//! Priority-ordered notification queue.
//!
//! Same hand-off protocol as [`crate::fifo`], with the buffer ordered by
//! ascending `i32` priority: lower values are served first. Relative order
//! among notifications sharing a priority is unspecified.
//!
//! ```
//! use postbox::PriorityNotificationQueue;
//!
//! let queue = PriorityNotificationQueue::new();
//! queue.enqueue("low", 5);
//! queue.enqueue("high", 1);
//! queue.enqueue("mid", 3);
//!
//! assert_eq!(queue.dequeue(), Some("high"));
//! assert_eq!(queue.dequeue(), Some("mid"));
//! assert_eq!(queue.dequeue(), Some("low"));
//! ```

use std::sync::OnceLock;

use crate::handoff::{Handoff, Timeout};
use crate::notification::{NotificationPtr, Sink};
use crate::store::PriorityStore;

/// Thread-safe delivery queue serving the lowest priority value first.
///
/// See [`NotificationQueue`](crate::NotificationQueue) for the shared
/// hand-off and teardown rules; only the buffer order differs.
pub struct PriorityNotificationQueue<T: Send> {
    core: Handoff<PriorityStore<T>>,
}

impl<T: Send> PriorityNotificationQueue<T> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            core: Handoff::new(),
        }
    }

    /// Enqueues a notification with the given priority; lower values are
    /// dequeued first.
    ///
    /// If a consumer is parked, the notification is handed to the oldest
    /// waiter regardless of priority. Never blocks.
    pub fn enqueue(&self, notification: T, priority: i32) {
        self.core.enqueue(priority, notification);
    }

    /// Removes and returns the minimum-priority notification, or `None`
    /// when the queue is empty. Never blocks.
    #[must_use]
    pub fn dequeue(&self) -> Option<T> {
        self.core.dequeue()
    }

    /// Removes and returns the minimum-priority notification, parking the
    /// calling thread while the queue is empty.
    ///
    /// Returns `None` on timeout or after
    /// [`wake_all`](Self::wake_all); see
    /// [`NotificationQueue::dequeue_blocking`](crate::NotificationQueue::dequeue_blocking).
    #[must_use]
    pub fn dequeue_blocking(&self, timeout: Timeout) -> Option<T> {
        self.core.dequeue_blocking(timeout)
    }

    /// Drains every buffered notification into `sink` in ascending
    /// priority order, holding the queue lock for the whole drain.
    pub fn dispatch<K>(&self, sink: &K)
    where
        K: Sink<T> + ?Sized,
    {
        self.core.dispatch(sink);
    }

    /// Releases every parked consumer empty-handed.
    pub fn wake_all(&self) {
        self.core.wake_all();
    }

    /// Whether the buffer is empty at this instant.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.core.is_empty()
    }

    /// Number of buffered notifications at this instant.
    #[must_use]
    pub fn len(&self) -> usize {
        self.core.len()
    }

    /// Whether any consumer is currently parked waiting for a
    /// notification.
    #[must_use]
    pub fn has_waiting_consumers(&self) -> bool {
        self.core.has_waiting_consumers()
    }

    /// Drops every buffered notification. Parked consumers are unaffected.
    pub fn clear(&self) {
        self.core.clear();
    }
}

impl<T: Send> Default for PriorityNotificationQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl PriorityNotificationQueue<NotificationPtr> {
    /// Process-wide default priority queue.
    ///
    /// Lazily constructed on first use and never torn down.
    #[must_use]
    pub fn default_queue() -> &'static Self {
        static DEFAULT: OnceLock<PriorityNotificationQueue<NotificationPtr>> = OnceLock::new();
        DEFAULT.get_or_init(Self::new)
    }
}
