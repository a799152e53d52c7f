//! Channel registry implementation
//!
//! The broker that owns every channel of one scope and routes content from
//! inlets to outlet observers.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use crate::content::Content;
use crate::error::Result;
use crate::stats::{RegistryMetrics, RegistryStats};

use super::channel::ChannelName;
use super::config::RegistryConfig;
use super::entry::{ChannelEntry, ChannelStats, PublisherId};
use super::event::RegistryEvent;
use super::observer::{ObserverHandle, Sequence};

type ChannelMap<C> = HashMap<ChannelName, ChannelEntry<C>>;

/// Registry of all channels within one scope
///
/// Thread-safe via a single `Mutex` over the whole channel map, which
/// serializes every publish, subscribe and unsubscribe. The lock is never
/// held while observers run: fan-out iterates a snapshot of the observer
/// list taken at publish time, so observers may call back into the registry
/// from `notify`.
///
/// Each stored change takes a [`Sequence`] under the lock and every push
/// carries it. Pushes from publishes racing on different threads can reach
/// an observer out of order; outlets use the sequence to keep only the
/// newest.
pub struct ChannelRegistry<C> {
    /// Map of channel name to channel entry
    channels: Mutex<ChannelMap<C>>,

    /// Configuration
    config: RegistryConfig,

    /// Monitoring tap
    events: broadcast::Sender<RegistryEvent>,

    /// Traffic counters
    metrics: RegistryMetrics,

    /// Next publisher ID to hand out
    next_publisher_id: AtomicU64,

    /// Next change sequence, only taken while `channels` is locked
    next_sequence: AtomicU64,
}

impl<C: Content> ChannelRegistry<C> {
    /// Create a new channel registry with default configuration
    pub fn new() -> Self {
        Self::build(RegistryConfig::default())
    }

    /// Create a new channel registry with custom configuration
    pub fn with_config(config: RegistryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: RegistryConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity);

        Self {
            channels: Mutex::new(HashMap::new()),
            config,
            events,
            metrics: RegistryMetrics::new(),
            next_publisher_id: AtomicU64::new(1),
            next_sequence: AtomicU64::new(1),
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, ChannelMap<C>> {
        // Every mutation completes before user code runs, so a poisoned map
        // is still consistent.
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_sequence(&self) -> Sequence {
        Sequence(self.next_sequence.fetch_add(1, Ordering::Relaxed))
    }

    /// Allocate an identity for a new publisher
    pub fn register_publisher(&self) -> PublisherId {
        PublisherId(self.next_publisher_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Publish content to a channel, or withdraw it with `None`
    ///
    /// Every observer subscribed at call time is notified exactly once, in
    /// subscription order. Returns the number of observers notified. An
    /// empty name is a no-op.
    pub fn publish(&self, name: &str, content: Option<C>) -> usize {
        self.publish_from(None, name, content)
    }

    /// Publish on behalf of a registered publisher
    ///
    /// Same as [`publish`](Self::publish), except that a withdrawal is
    /// ignored when the channel's current content came from a different
    /// publisher. A producer leaving a channel therefore never clears what
    /// another producer published there after it.
    pub fn publish_as(&self, publisher: PublisherId, name: &str, content: Option<C>) -> usize {
        self.publish_from(Some(publisher), name, content)
    }

    fn publish_from(&self, publisher: Option<PublisherId>, name: &str, content: Option<C>) -> usize {
        let Some(channel) = ChannelName::optional(name) else {
            return 0;
        };

        match content {
            Some(content) => self.publish_content(channel, content, publisher),
            None => self.withdraw(channel, publisher),
        }
    }

    fn publish_content(
        &self,
        channel: ChannelName,
        content: C,
        publisher: Option<PublisherId>,
    ) -> usize {
        let mut events = Vec::with_capacity(2);

        let (observers, sequence) = {
            let mut channels = self.lock();
            let entry = self.entry_locked(&mut channels, &channel, &mut events);
            let sequence = self.next_sequence();
            entry.set_content(Some(content.clone()), publisher, sequence);
            (entry.snapshot(), sequence)
        };

        events.push(RegistryEvent::Published {
            channel: channel.clone(),
            observers: observers.len(),
        });
        self.emit(events);

        self.fan_out(&channel, sequence, Some(&content), &observers)
    }

    fn withdraw(&self, channel: ChannelName, publisher: Option<PublisherId>) -> usize {
        let mut events = Vec::with_capacity(2);

        let (observers, sequence) = {
            let mut channels = self.lock();
            let Some(entry) = channels.get_mut(&channel) else {
                return 0;
            };

            if !entry.may_withdraw(publisher) {
                tracing::debug!(
                    scope = %self.config.scope,
                    channel = %channel,
                    requester = ?publisher.map(|p| p.get()),
                    owner = ?entry.publisher.map(|p| p.get()),
                    "Withdrawal ignored, content owned by another publisher"
                );
                return 0;
            }

            let sequence = self.next_sequence();
            entry.set_content(None, None, sequence);
            let observers = entry.snapshot();

            events.push(RegistryEvent::Withdrawn {
                channel: channel.clone(),
                observers: observers.len(),
            });
            Self::remove_if_vacant(&mut channels, &channel, &mut events);

            (observers, sequence)
        };

        self.emit(events);

        self.fan_out(&channel, sequence, None, &observers)
    }

    /// Subscribe an observer to a channel
    ///
    /// Returns the channel's current content so the caller can render
    /// immediately. Subscribing never notifies anyone. Subscribing the same
    /// observer twice keeps a single registration.
    pub fn subscribe(&self, name: &str, observer: &ObserverHandle<C>) -> Option<C> {
        self.switch(None, Some(name), observer)
    }

    /// Unsubscribe an observer from a channel
    ///
    /// Unknown channels and observers are ignored.
    pub fn unsubscribe(&self, name: &str, observer: &ObserverHandle<C>) {
        let Some(channel) = ChannelName::optional(name) else {
            return;
        };

        let mut events = Vec::with_capacity(2);
        {
            let mut channels = self.lock();
            Self::detach_locked(&mut channels, &channel, observer, &mut events);
        }
        self.emit(events);
    }

    /// Move an observer from one channel to another under a single lock
    ///
    /// Either side may be absent. No caller ever sees the observer
    /// registered on both channels. Returns the content of `to`.
    pub fn switch(
        &self,
        from: Option<&str>,
        to: Option<&str>,
        observer: &ObserverHandle<C>,
    ) -> Option<C> {
        self.switch_sequenced(from, to, observer).0
    }

    /// Like [`switch`](Self::switch), also returning the sequence of the
    /// last change stored in `to`
    ///
    /// Any push for `to` with a sequence at or below it carries content
    /// that is the returned value or older.
    pub fn switch_sequenced(
        &self,
        from: Option<&str>,
        to: Option<&str>,
        observer: &ObserverHandle<C>,
    ) -> (Option<C>, Option<Sequence>) {
        let from = from.and_then(ChannelName::optional);
        let to = to.and_then(ChannelName::optional);

        let mut events = Vec::with_capacity(4);
        let seeded = {
            let mut channels = self.lock();

            if let Some(from) = from.as_ref().filter(|from| to.as_ref() != Some(*from)) {
                Self::detach_locked(&mut channels, from, observer, &mut events);
            }

            to.as_ref().map(|to| {
                let entry = self.entry_locked(&mut channels, to, &mut events);
                if entry.add_observer(observer) {
                    events.push(RegistryEvent::Subscribed {
                        channel: to.clone(),
                        observer: observer.id(),
                    });
                }
                (entry.content.clone(), entry.sequence)
            })
        };

        self.emit(events);
        match seeded {
            Some((content, sequence)) => (content, Some(sequence)),
            None => (None, None),
        }
    }

    fn entry_locked<'a>(
        &self,
        channels: &'a mut ChannelMap<C>,
        channel: &ChannelName,
        events: &mut Vec<RegistryEvent>,
    ) -> &'a mut ChannelEntry<C> {
        match channels.entry(channel.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(slot) => {
                events.push(RegistryEvent::ChannelCreated {
                    channel: channel.clone(),
                });
                slot.insert(ChannelEntry::new(self.next_sequence()))
            }
        }
    }

    fn detach_locked(
        channels: &mut ChannelMap<C>,
        channel: &ChannelName,
        observer: &ObserverHandle<C>,
        events: &mut Vec<RegistryEvent>,
    ) {
        let Some(entry) = channels.get_mut(channel) else {
            return;
        };

        if entry.remove_observer(observer) {
            events.push(RegistryEvent::Unsubscribed {
                channel: channel.clone(),
                observer: observer.id(),
            });
            Self::remove_if_vacant(channels, channel, events);
        }
    }

    fn remove_if_vacant(
        channels: &mut ChannelMap<C>,
        channel: &ChannelName,
        events: &mut Vec<RegistryEvent>,
    ) {
        if channels.get(channel).is_some_and(ChannelEntry::is_vacant) {
            channels.remove(channel);
            events.push(RegistryEvent::ChannelRemoved {
                channel: channel.clone(),
            });
        }
    }

    fn fan_out(
        &self,
        channel: &ChannelName,
        sequence: Sequence,
        content: Option<&C>,
        observers: &[ObserverHandle<C>],
    ) -> usize {
        for observer in observers {
            tracing::trace!(
                scope = %self.config.scope,
                channel = %channel,
                observer = %observer.id(),
                sequence = sequence.get(),
                withdrawn = content.is_none(),
                "Notifying observer"
            );
            observer.deliver(channel, sequence, content);
        }

        observers.len()
    }

    /// Record, log and broadcast registry events
    fn emit(&self, events: Vec<RegistryEvent>) {
        let scope = self.config.scope.as_str();

        for event in events {
            match &event {
                RegistryEvent::ChannelCreated { channel } => {
                    self.metrics.record_channel_created();
                    tracing::info!(scope, channel = %channel, "Channel created");
                }
                RegistryEvent::Published { channel, observers } => {
                    self.metrics.record_publish(*observers);
                    tracing::debug!(scope, channel = %channel, observers, "Content published");
                }
                RegistryEvent::Withdrawn { channel, observers } => {
                    self.metrics.record_withdraw(*observers);
                    tracing::debug!(scope, channel = %channel, observers, "Content withdrawn");
                }
                RegistryEvent::Subscribed { channel, observer } => {
                    self.metrics.record_subscribe();
                    tracing::debug!(scope, channel = %channel, observer = %observer, "Observer subscribed");
                }
                RegistryEvent::Unsubscribed { channel, observer } => {
                    self.metrics.record_unsubscribe();
                    tracing::debug!(
                        scope,
                        channel = %channel,
                        observer = %observer,
                        "Observer unsubscribed"
                    );
                }
                RegistryEvent::ChannelRemoved { channel } => {
                    self.metrics.record_channel_removed();
                    tracing::info!(scope, channel = %channel, "Channel removed");
                }
            }

            // Err only means nobody is listening
            let _ = self.events.send(event);
        }
    }

    /// Subscribe to the registry event tap
    pub fn events(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    /// Current content of a channel
    pub fn content(&self, name: &str) -> Option<C> {
        self.lock().get(name).and_then(|entry| entry.content.clone())
    }

    /// Check if a channel entry exists
    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains_key(name)
    }

    /// Get channel statistics
    pub fn channel_stats(&self, name: &str) -> Option<ChannelStats> {
        self.lock().get(name).map(ChannelEntry::stats)
    }

    /// Get total number of channel entries
    pub fn channel_count(&self) -> usize {
        self.lock().len()
    }

    /// Names of all channel entries, sorted
    pub fn channel_names(&self) -> Vec<ChannelName> {
        let mut names: Vec<ChannelName> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Get registry-wide statistics
    pub fn stats(&self) -> RegistryStats {
        let active = self.channel_count();
        self.metrics.snapshot(active)
    }
}

impl<C: Content> Default for ChannelRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> std::fmt::Debug for ChannelRegistry<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let channels = self
            .channels
            .lock()
            .map(|channels| channels.len())
            .unwrap_or_default();

        f.debug_struct("ChannelRegistry")
            .field("scope", &self.config.scope)
            .field("channels", &channels)
            .finish()
    }
}
