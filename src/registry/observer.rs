//! Channel observers
//!
//! An observer receives every content change of the channels it is
//! subscribed to. The registry identifies observers by the id of their
//! handle, never by value, so a handle can be cloned, stored and later used
//! to remove exactly the registration it created.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_OBSERVER_ID: AtomicU64 = AtomicU64::new(1);

/// Position of a content change in a registry's history
///
/// Every stored change (publish, withdrawal, entry creation) takes the next
/// sequence while the registry lock is held, so sequences order changes
/// exactly as they were stored. Deliveries from concurrent publishes can
/// still arrive out of that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sequence(pub(crate) u64);

impl Sequence {
    /// Raw sequence value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of an observer handle
///
/// Allocated once per [`ObserverHandle::new`] and never reused within the
/// process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

impl ObserverId {
    fn next() -> Self {
        Self(NEXT_OBSERVER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value, for logs
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ObserverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Receiver of channel content pushes
///
/// Called synchronously from inside `publish`, after the registry lock has
/// been released. Implementations may call back into the registry.
pub trait Observer<C>: Send + Sync {
    /// New content for `channel`, or `None` when it was withdrawn
    fn notify(&self, channel: &str, content: Option<&C>);

    /// Same push, tagged with the sequence of the change
    ///
    /// The registry always delivers through this method. Observers that
    /// keep the latest value override it to drop deliveries older than one
    /// they already hold.
    fn notify_sequenced(&self, channel: &str, sequence: Sequence, content: Option<&C>) {
        let _ = sequence;
        self.notify(channel, content)
    }
}

impl<C, F> Observer<C> for F
where
    F: Fn(&str, Option<&C>) + Send + Sync,
{
    fn notify(&self, channel: &str, content: Option<&C>) {
        self(channel, content)
    }
}

/// Shared reference to an observer, compared by handle id
pub struct ObserverHandle<C> {
    id: ObserverId,
    observer: Arc<dyn Observer<C>>,
}

impl<C: 'static> ObserverHandle<C> {
    /// Wrap an observer in a new handle with a fresh identity
    pub fn new<O>(observer: O) -> Self
    where
        O: Observer<C> + 'static,
    {
        Self::from_arc(Arc::new(observer))
    }

    /// Wrap an already shared observer in a new handle
    ///
    /// The handle gets a fresh identity; clone the handle, not the `Arc`,
    /// to refer to the same registration.
    pub fn from_arc(observer: Arc<dyn Observer<C>>) -> Self {
        Self {
            id: ObserverId::next(),
            observer,
        }
    }
}

impl<C> ObserverHandle<C> {
    /// Identity of this handle
    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Deliver an untagged push
    pub fn notify(&self, channel: &str, content: Option<&C>) {
        self.observer.notify(channel, content)
    }

    /// Deliver a push tagged with its sequence
    pub fn deliver(&self, channel: &str, sequence: Sequence, content: Option<&C>) {
        self.observer.notify_sequenced(channel, sequence, content)
    }
}

impl<C> Clone for ObserverHandle<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            observer: Arc::clone(&self.observer),
        }
    }
}

impl<C> PartialEq for ObserverHandle<C> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<C> Eq for ObserverHandle<C> {}

impl<C> std::fmt::Debug for ObserverHandle<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ObserverHandle").field(&self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn test_identity() {
        let a = ObserverHandle::<String>::new(|_: &str, _: Option<&String>| {});
        let b = ObserverHandle::<String>::new(|_: &str, _: Option<&String>| {});

        assert_eq!(a, a.clone());
        assert_eq!(a.id(), a.clone().id());
        assert_ne!(a, b);
    }

    #[test]
    fn test_ids_not_reused_after_drop() {
        let first = ObserverHandle::<String>::new(|_: &str, _: Option<&String>| {});
        let first_id = first.id();
        drop(first);

        // A new allocation may land at the same address; the id must not
        let second = ObserverHandle::<String>::new(|_: &str, _: Option<&String>| {});
        assert!(second.id() > first_id);
    }

    #[test]
    fn test_closure_notify() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handle = ObserverHandle::new(move |channel: &str, content: Option<&String>| {
            sink.lock()
                .unwrap()
                .push((channel.to_string(), content.cloned()));
        });

        handle.notify("aloha", Some(&"hi".to_string()));
        handle.deliver("aloha", Sequence(7), None);

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0], ("aloha".to_string(), Some("hi".to_string())));
        assert_eq!(seen[1], ("aloha".to_string(), None));
    }

    #[test]
    fn test_from_arc_gets_fresh_identity() {
        let shared: Arc<dyn Observer<u32>> = Arc::new(|_: &str, _: Option<&u32>| {});
        let a = ObserverHandle::from_arc(Arc::clone(&shared));
        let b = ObserverHandle::from_arc(shared);

        assert_ne!(a, b);
    }
}
