//! Payload contract for the delivery queues.
//!
//! The queues themselves are generic over any `T: Send` and never look at
//! payload content. This module supplies the contract used by the
//! process-wide default queues: a [`Notification`] trait object behind an
//! [`Arc`], so a notification can be shared between the queue, the consumer
//! that received it, and any observers it gets forwarded to, with release
//! handled by the reference count at every hand-off point.

use std::any::Any;
use std::sync::Arc;

/// A polymorphic notification payload.
///
/// Implementors only need `impl Notification for MyType {}`; the default
/// [`name`](Notification::name) reports the concrete type name.
pub trait Notification: Any + Send + Sync {
    /// Identifying name for this notification, used for routing or logging.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Shared-ownership handle to a type-erased notification.
pub type NotificationPtr = Arc<dyn Notification>;

impl dyn Notification {
    /// Downcasts a borrowed notification to a concrete type.
    #[must_use]
    pub fn downcast_ref<T: Notification>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }
}

/// Receiver end of a drain-and-forward pass.
///
/// [`dispatch`](crate::NotificationQueue::dispatch) calls
/// [`post`](Sink::post) once per buffered notification, in queue head order,
/// while the queue lock is held. How a sink fans notifications out to
/// interested parties is its own business.
pub trait Sink<T> {
    /// Accepts ownership of one drained notification.
    fn post(&self, notification: T);
}

impl<T, F> Sink<T> for F
where
    F: Fn(T),
{
    fn post(&self, notification: T) {
        self(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FileChanged {
        path: &'static str,
    }

    impl Notification for FileChanged {}

    #[test]
    fn test_default_name_is_type_name() {
        let n = FileChanged { path: "/etc/hosts" };
        assert!(n.name().ends_with("FileChanged"));
    }

    #[test]
    fn test_downcast_through_trait_object() {
        let n: NotificationPtr = Arc::new(FileChanged { path: "/etc/hosts" });

        let concrete = n.downcast_ref::<FileChanged>().expect("should downcast");
        assert_eq!(concrete.path, "/etc/hosts");
    }

    #[test]
    fn test_downcast_to_wrong_type_fails() {
        struct Other;
        impl Notification for Other {}

        let n: NotificationPtr = Arc::new(FileChanged { path: "/" });
        assert!(n.downcast_ref::<Other>().is_none());
    }
}
