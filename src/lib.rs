//! In-process notification delivery queues.
//!
//! Producers on any thread hand discrete payload items ("notifications") to
//! consumers on any other thread, either in strict FIFO order or in ascending
//! numeric priority order. Consumers can poll, block indefinitely, or block
//! with a timeout.
//!
//! # Overview
//!
//! - [`NotificationQueue`] - FIFO ordering, plus an urgent front-insert
//! - [`PriorityNotificationQueue`] - lowest priority value served first
//! - [`Timeout`] - blocking mode for `dequeue_blocking`
//! - [`Notification`] / [`NotificationPtr`] - payload contract for the
//!   process-wide default queues
//!
//! Both queue flavors run the same hand-off protocol: an enqueued
//! notification is delivered straight to the oldest parked consumer when one
//! is waiting, and only touches the backing store when nobody is. A timed
//! wait that expires concurrently with an enqueue never loses the
//! notification: the consumer re-checks its wait slot under the queue lock
//! before giving up.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use postbox::{NotificationQueue, Timeout};
//!
//! let queue = NotificationQueue::new();
//! queue.enqueue("ping");
//!
//! assert_eq!(queue.dequeue(), Some("ping"));
//! assert_eq!(queue.dequeue(), None);
//!
//! // Timed wait on an empty queue comes back empty.
//! assert_eq!(
//!     queue.dequeue_blocking(Timeout::Duration(Duration::from_millis(10))),
//!     None
//! );
//! ```

pub mod fifo;
pub mod notification;
pub mod priority;

mod handoff;
mod store;
mod trace;

pub use fifo::NotificationQueue;
pub use handoff::Timeout;
pub use notification::{Notification, NotificationPtr, Sink};
pub use priority::PriorityNotificationQueue;
pub use trace::init_tracing;
