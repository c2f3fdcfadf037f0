//! First-in-first-out notification queue.
//!
//! # Overview
//!
//! - [`enqueue`](NotificationQueue::enqueue) - append behind everything
//!   already buffered
//! - [`enqueue_urgent`](NotificationQueue::enqueue_urgent) - jump ahead of
//!   everything already buffered
//! - [`dequeue`](NotificationQueue::dequeue) /
//!   [`dequeue_blocking`](NotificationQueue::dequeue_blocking) - consume
//!
//! Urgency only decides where a notification lands in the buffer. When a
//! consumer is already parked, either enqueue variant hands the
//! notification straight to the oldest waiter.
//!
//! # Example
//!
//! ```
//! use postbox::NotificationQueue;
//!
//! let queue = NotificationQueue::new();
//! queue.enqueue("first");
//! queue.enqueue("second");
//! queue.enqueue_urgent("now");
//!
//! assert_eq!(queue.dequeue(), Some("now"));
//! assert_eq!(queue.dequeue(), Some("first"));
//! assert_eq!(queue.dequeue(), Some("second"));
//! ```

use std::sync::OnceLock;

use crate::handoff::{Handoff, Timeout};
use crate::notification::{NotificationPtr, Sink};
use crate::store::{FifoPlacement, FifoStore};

/// Thread-safe FIFO delivery queue.
///
/// Any number of producers and consumers may share one instance (behind an
/// `Arc` or a `&'static` borrow). Dropping a queue while consumers are
/// still parked in [`dequeue_blocking`](Self::dequeue_blocking) is a usage
/// error; call [`wake_all`](Self::wake_all) first so every waiter returns.
pub struct NotificationQueue<T: Send> {
    core: Handoff<FifoStore<T>>,
}

impl<T: Send> NotificationQueue<T> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            core: Handoff::new(),
        }
    }

    /// Enqueues a notification at the back of the queue.
    ///
    /// If a consumer is parked, the notification is handed to the oldest
    /// waiter instead and never touches the buffer. Never blocks.
    pub fn enqueue(&self, notification: T) {
        self.core.enqueue(FifoPlacement::Back, notification);
    }

    /// Enqueues a notification at the front of the queue, ahead of
    /// everything already buffered.
    ///
    /// Hand-off to a parked consumer works exactly as in
    /// [`enqueue`](Self::enqueue); urgency never reorders the wait list.
    pub fn enqueue_urgent(&self, notification: T) {
        self.core.enqueue(FifoPlacement::Front, notification);
    }

    /// Removes and returns the front notification, or `None` when the
    /// queue is empty. Never blocks.
    #[must_use]
    pub fn dequeue(&self) -> Option<T> {
        self.core.dequeue()
    }

    /// Removes and returns the front notification, parking the calling
    /// thread while the queue is empty.
    ///
    /// Returns `None` when a [`Timeout::Duration`] elapses with nothing
    /// delivered, or when [`wake_all`](Self::wake_all) releases the waiter.
    /// A notification that races against the timeout is still returned,
    /// never dropped.
    #[must_use]
    pub fn dequeue_blocking(&self, timeout: Timeout) -> Option<T> {
        self.core.dequeue_blocking(timeout)
    }

    /// Drains every buffered notification into `sink`, front to back.
    ///
    /// The queue lock is held for the whole drain, so concurrent enqueues
    /// observe either the full backlog or an empty queue.
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
    ///
    /// Notifications handed directly to a parked consumer are never
    /// counted here; they bypass the buffer entirely.
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

impl<T: Send> Default for NotificationQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationQueue<NotificationPtr> {
    /// Process-wide default queue.
    ///
    /// Lazily constructed on first use and never torn down; reachable from
    /// anywhere in the process without explicit wiring.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use postbox::{Notification, NotificationQueue};
    ///
    /// struct Tick;
    /// impl Notification for Tick {}
    ///
    /// NotificationQueue::default_queue().enqueue(Arc::new(Tick));
    /// let n = NotificationQueue::default_queue().dequeue().unwrap();
    /// assert!(n.downcast_ref::<Tick>().is_some());
    /// ```
    #[must_use]
    pub fn default_queue() -> &'static Self {
        static DEFAULT: OnceLock<NotificationQueue<NotificationPtr>> = OnceLock::new();
        DEFAULT.get_or_init(Self::new)
    }
}
