//! Functional tests for the priority notification queue.
//!
//! Ordering among equal priorities is unspecified, so these tests only
//! assert set membership for same-priority notifications, never order.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, Once};
use std::thread;
use std::time::{Duration, Instant};

use postbox::{PriorityNotificationQueue, Timeout};

static INIT_TRACING: Once = Once::new();

/// Initialize tracing for tests (only once).
fn init_test_tracing() {
    INIT_TRACING.call_once(|| {
        postbox::init_tracing();
    });
}

/// Polls `cond` until it holds, panicking after five seconds.
fn wait_for(cond: impl Fn() -> bool, what: &str) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !cond() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn test_lowest_priority_value_served_first() {
    init_test_tracing();
    let queue = PriorityNotificationQueue::new();

    queue.enqueue("low", 5);
    queue.enqueue("high", 1);
    queue.enqueue("mid", 3);

    assert_eq!(queue.dequeue(), Some("high"));
    assert_eq!(queue.dequeue(), Some("mid"));
    assert_eq!(queue.dequeue(), Some("low"));
    assert_eq!(queue.dequeue(), None);
}

#[test]
fn test_negative_priorities_come_before_zero() {
    init_test_tracing();
    let queue = PriorityNotificationQueue::new();

    queue.enqueue("zero", 0);
    queue.enqueue("below", -4);

    assert_eq!(queue.dequeue(), Some("below"));
    assert_eq!(queue.dequeue(), Some("zero"));
}

#[test]
fn test_equal_priorities_are_all_delivered() {
    init_test_tracing();
    let queue = PriorityNotificationQueue::new();

    for id in 0..5u32 {
        queue.enqueue(id, 7);
    }

    let mut received = HashSet::new();
    while let Some(id) = queue.dequeue() {
        assert!(received.insert(id), "notification {id} delivered twice");
    }
    assert_eq!(received, (0..5).collect());
}

#[test]
fn test_parked_consumer_receives_any_priority_directly() {
    init_test_tracing();
    let queue = Arc::new(PriorityNotificationQueue::new());

    let consumer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || queue.dequeue_blocking(Timeout::Infinite))
    };

    wait_for(|| queue.has_waiting_consumers(), "consumer to park");
    queue.enqueue("direct", 100);

    assert_eq!(queue.len(), 0);
    assert_eq!(consumer.join().unwrap(), Some("direct"));
}

#[test]
fn test_timed_wait_on_empty_queue_returns_none() {
    init_test_tracing();
    let queue: PriorityNotificationQueue<u32> = PriorityNotificationQueue::new();

    let got = queue.dequeue_blocking(Timeout::Duration(Duration::from_millis(10)));

    assert_eq!(got, None);
    assert!(!queue.has_waiting_consumers());
}

#[test]
fn test_wake_all_releases_parked_consumers() {
    init_test_tracing();
    let queue: Arc<PriorityNotificationQueue<u32>> = Arc::new(PriorityNotificationQueue::new());

    let consumers: Vec<_> = (0..2)
        .map(|_| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.dequeue_blocking(Timeout::Duration(Duration::from_secs(10))))
        })
        .collect();

    wait_for(|| queue.has_waiting_consumers(), "wait list to fill");
    thread::sleep(Duration::from_millis(100));

    queue.wake_all();

    for consumer in consumers {
        assert_eq!(consumer.join().unwrap(), None);
    }
    assert!(!queue.has_waiting_consumers());
}

#[test]
fn test_dispatch_drains_in_ascending_priority() {
    init_test_tracing();
    let queue = PriorityNotificationQueue::new();
    queue.enqueue("c", 30);
    queue.enqueue("a", 10);
    queue.enqueue("d", 40);
    queue.enqueue("b", 20);

    let forwarded = Mutex::new(Vec::new());
    queue.dispatch(&|n| forwarded.lock().unwrap().push(n));

    assert_eq!(*forwarded.lock().unwrap(), vec!["a", "b", "c", "d"]);
    assert!(queue.is_empty());
}

#[test]
fn test_clear_drops_all_priorities() {
    init_test_tracing();
    let queue = PriorityNotificationQueue::new();
    queue.enqueue(1u32, -1);
    queue.enqueue(2u32, 0);
    queue.enqueue(3u32, 1);
    assert_eq!(queue.len(), 3);

    queue.clear();
    assert!(queue.is_empty());
    assert_eq!(queue.dequeue(), None);

    queue.clear();
    assert!(queue.is_empty());
}

#[test]
fn test_default_queue_is_one_shared_instance() {
    init_test_tracing();

    let from_thread = thread::spawn(|| {
        PriorityNotificationQueue::default_queue() as *const _ as usize
    })
    .join()
    .unwrap();

    let queue = PriorityNotificationQueue::default_queue();
    assert_eq!(queue as *const _ as usize, from_thread);
}
