//! Consumer node
//!
//! An outlet listens to one channel and displays whatever is published
//! there, or its own default content while the channel is empty.
//!
//! The last received value lives in a `tokio::sync::watch` channel, so
//! async code can await changes with [`Outlet::watch`] while synchronous
//! hosts simply call [`Outlet::displayed`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::watch;

use crate::content::Content;
use crate::registry::{ChannelName, ChannelRegistry, Observer, ObserverHandle, Sequence};

use super::phase::{NodePhase, Transition};

/// Channel binding of an outlet
#[derive(Default)]
struct Binding {
    phase: NodePhase,
    /// Sequence of the newest change accepted for the current channel
    accepted: Option<Sequence>,
}

/// State shared between an outlet and its registered observer
struct OutletShared<C> {
    binding: Mutex<Binding>,
    received: watch::Sender<Option<C>>,
}

impl<C: Content> OutletShared<C> {
    fn lock_binding(&self) -> MutexGuard<'_, Binding> {
        self.binding.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn receive(&self, channel: &str, sequence: Option<Sequence>, content: Option<&C>) {
        let mut binding = self.lock_binding();

        // A rename made during an in-flight fan-out can leave us in that
        // fan-out's snapshot of the old channel.
        if !binding.phase.is_on(channel) {
            tracing::trace!(channel, "Outlet ignored push for a channel it left");
            return;
        }

        if let Some(sequence) = sequence {
            // Racing publishes on other threads can deliver out of order
            if binding.accepted.is_some_and(|accepted| sequence <= accepted) {
                tracing::trace!(
                    channel,
                    sequence = sequence.get(),
                    "Outlet ignored push older than its content"
                );
                return;
            }
            binding.accepted = Some(sequence);
        }

        self.received.send_replace(content.cloned());
    }
}

/// The observer identity an outlet registers under
///
/// Holds only a weak reference so a registration that outlives the outlet
/// inside an in-flight snapshot does nothing.
struct OutletObserver<C> {
    shared: Weak<OutletShared<C>>,
}

impl<C: Content> Observer<C> for OutletObserver<C> {
    fn notify(&self, channel: &str, content: Option<&C>) {
        if let Some(shared) = self.shared.upgrade() {
            shared.receive(channel, None, content);
        }
    }

    fn notify_sequenced(&self, channel: &str, sequence: Sequence, content: Option<&C>) {
        if let Some(shared) = self.shared.upgrade() {
            shared.receive(channel, Some(sequence), content);
        }
    }
}

/// Displays the content of a named channel
pub struct Outlet<C: Content> {
    registry: Arc<ChannelRegistry<C>>,
    shared: Arc<OutletShared<C>>,
    /// Same handle for the whole life of the outlet
    observer: ObserverHandle<C>,
    default: Option<C>,
}

impl<C: Content> Outlet<C> {
    /// Create an outlet listening to `name`
    ///
    /// The outlet starts with the channel's current content, if any.
    pub fn new(registry: Arc<ChannelRegistry<C>>, name: Option<&str>, default: Option<C>) -> Self {
        let (received, _) = watch::channel(None);
        let shared = Arc::new(OutletShared {
            binding: Mutex::new(Binding::default()),
            received,
        });
        let observer = ObserverHandle::new(OutletObserver {
            shared: Arc::downgrade(&shared),
        });

        let mut outlet = Self {
            registry,
            shared,
            observer,
            default,
        };
        outlet.set_name(name);
        outlet
    }

    /// Channel this outlet listens to
    pub fn name(&self) -> Option<ChannelName> {
        self.shared.lock_binding().phase.channel().cloned()
    }

    /// Current attachment state
    pub fn phase(&self) -> NodePhase {
        self.shared.lock_binding().phase.clone()
    }

    /// Observer identity registered with the registry
    pub fn observer(&self) -> &ObserverHandle<C> {
        &self.observer
    }

    /// Listen to another channel (or to none)
    ///
    /// The old subscription is replaced in a single registry step and the
    /// new channel's current content is adopted immediately.
    pub fn set_name(&mut self, name: Option<&str>) {
        let next = name.and_then(ChannelName::optional);

        // Held across the switch so no push is judged against a stale binding
        let mut binding = self.shared.lock_binding();
        let transition = binding.phase.transition(next.as_ref());
        if transition == Transition::Stay {
            return;
        }

        let (content, sequence) = self.registry.switch_sequenced(
            transition.leaving().map(ChannelName::as_str),
            transition.entering().map(ChannelName::as_str),
            &self.observer,
        );
        binding.phase = NodePhase::from_name(next);
        binding.accepted = sequence;

        self.shared.received.send_if_modified(|current| {
            if *current == content {
                return false;
            }
            *current = content;
            true
        });

        tracing::debug!(
            scope = %self.registry.config().scope,
            from = ?transition.leaving().map(ChannelName::as_str),
            to = ?transition.entering().map(ChannelName::as_str),
            observer = %self.observer.id(),
            "Outlet switched channel"
        );
    }

    /// Replace the fallback content
    pub fn set_default(&mut self, default: Option<C>) {
        self.default = default;
    }

    /// Apply new properties in one step
    pub fn update(&mut self, name: Option<&str>, default: Option<C>) {
        self.set_default(default);
        self.set_name(name);
    }

    /// Fallback content shown while the channel is empty
    pub fn default_content(&self) -> Option<&C> {
        self.default.as_ref()
    }

    /// Last value pushed by the channel
    pub fn received(&self) -> Option<C> {
        self.shared.received.borrow().clone()
    }

    /// Content to render: the received value unless it is absent or
    /// blank, in which case the default
    pub fn displayed(&self) -> Option<C> {
        let received = self.shared.received.borrow();
        match received.as_ref() {
            Some(content) if !content.is_blank() => Some(content.clone()),
            _ => self.default.clone(),
        }
    }

    /// Watch the received value from async code
    pub fn watch(&self) -> watch::Receiver<Option<C>> {
        self.shared.received.subscribe()
    }

    /// Unsubscribe and drop the outlet
    pub fn detach(self) {}
}

impl<C: Content> Drop for Outlet<C> {
    fn drop(&mut self) {
        let binding = self.shared.lock_binding();
        if let Some(channel) = binding.phase.channel() {
            self.registry.unsubscribe(channel, &self.observer);
        }
    }
}

impl<C: Content + std::fmt::Debug> std::fmt::Debug for Outlet<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Outlet")
            .field("phase", &self.phase())
            .field("observer", &self.observer)
            .field("received", &self.received())
            .field("default", &self.default)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn registry() -> Arc<ChannelRegistry<String>> {
        Arc::new(ChannelRegistry::new())
    }

    fn text(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_seeded_on_attach() {
        let registry = registry();
        registry.publish("aloha", text("hi"));

        let outlet = Outlet::new(Arc::clone(&registry), Some("aloha"), None);

        assert_eq!(outlet.received(), text("hi"));
        assert_eq!(outlet.displayed(), text("hi"));
    }

    #[test]
    fn test_default_fallback() {
        let registry = registry();
        let outlet = Outlet::new(Arc::clone(&registry), Some("aloha"), text("Default content"));
        assert_eq!(outlet.displayed(), text("Default content"));

        registry.publish("aloha", text("Overridden content"));
        assert_eq!(outlet.displayed(), text("Overridden content"));

        registry.publish("aloha", None);
        assert_eq!(outlet.received(), None);
        assert_eq!(outlet.displayed(), text("Default content"));
    }

    #[test]
    fn test_blank_content_shows_default() {
        let registry = registry();
        let outlet = Outlet::new(Arc::clone(&registry), Some("aloha"), text("fallback"));

        registry.publish("aloha", text(""));

        assert_eq!(outlet.received(), text(""));
        assert_eq!(outlet.displayed(), text("fallback"));
    }

    #[test]
    fn test_unnamed_outlet_shows_default() {
        let registry = registry();
        registry.publish("aloha", text("hi"));

        let outlet = Outlet::new(Arc::clone(&registry), None, text("mine"));

        assert_eq!(outlet.displayed(), text("mine"));
        assert_eq!(registry.stats().subscribes, 0);
    }

    #[test]
    fn test_rename_keeps_observer_identity() {
        let registry = registry();
        registry.publish("second", text("two"));
        let mut outlet = Outlet::new(Arc::clone(&registry), Some("first"), None);
        let identity = outlet.observer().clone();

        outlet.set_name(Some("second"));

        assert_eq!(outlet.observer(), &identity);
        assert_eq!(outlet.received(), text("two"));
        assert!(!registry.contains("first"));
        assert_eq!(registry.channel_stats("second").unwrap().observer_count, 1);
    }

    #[test]
    fn test_leave_channel() {
        let registry = registry();
        registry.publish("greeting", text("Hello, World!"));
        let mut outlet = Outlet::new(Arc::clone(&registry), Some("greeting"), None);

        outlet.set_name(None);

        assert_eq!(outlet.phase(), NodePhase::Unattached);
        assert_eq!(outlet.displayed(), None);
        assert_eq!(registry.channel_stats("greeting").unwrap().observer_count, 0);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let registry = registry();
        let outlet = Outlet::new(Arc::clone(&registry), Some("aloha"), None);
        assert!(registry.contains("aloha"));

        outlet.detach();

        assert!(!registry.contains("aloha"));
        assert_eq!(registry.publish("aloha", text("hi")), 0);
    }

    #[test]
    fn test_stale_push_ignored() {
        let registry = registry();
        let outlet = Outlet::new(Arc::clone(&registry), Some("first"), None);

        // Simulate delivery from a snapshot taken before a rename
        outlet.observer().notify("second", Some(&"stale".to_string()));

        assert_eq!(outlet.received(), None);
    }

    #[test]
    fn test_older_push_ignored() {
        let registry = registry();
        let outlet = Outlet::new(Arc::clone(&registry), Some("aloha"), None);
        let observer = outlet.observer();

        observer.deliver("aloha", Sequence(100), Some(&"new".to_string()));
        observer.deliver("aloha", Sequence(50), Some(&"old".to_string()));
        observer.deliver("aloha", Sequence(100), None);

        assert_eq!(outlet.received(), text("new"));

        observer.deliver("aloha", Sequence(101), None);
        assert_eq!(outlet.received(), None);
    }

    #[test]
    fn test_push_older_than_seed_ignored() {
        let registry = registry();
        registry.publish("aloha", text("hi"));
        let seeded = registry.channel_stats("aloha").unwrap().sequence;

        let outlet = Outlet::new(Arc::clone(&registry), Some("aloha"), None);
        outlet
            .observer()
            .deliver("aloha", seeded, Some(&"stale".to_string()));

        assert_eq!(outlet.received(), text("hi"));
    }

    #[test]
    fn test_rename_to_equal_content_keeps_watchers_idle() {
        let registry = registry();
        registry.publish("first", text("same"));
        registry.publish("second", text("same"));
        let mut outlet = Outlet::new(Arc::clone(&registry), Some("first"), None);
        let rx = outlet.watch();

        outlet.set_name(Some("second"));
        assert!(!rx.has_changed().unwrap());

        outlet.set_name(Some("nowhere"));
        assert!(rx.has_changed().unwrap());
        assert_eq!(outlet.received(), None);
    }

    #[tokio::test]
    async fn test_watch_changes() {
        let registry = registry();
        let outlet = Outlet::new(Arc::clone(&registry), Some("aloha"), None);
        let mut rx = outlet.watch();

        let publisher = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                registry.publish("aloha", Some("pushed".to_string()));
            })
        };

        tokio::time::timeout(Duration::from_secs(1), rx.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rx.borrow().as_deref(), Some("pushed"));
        publisher.await.unwrap();
    }
}
