//! Channel entry and stats types
//!
//! This module defines the per-channel state stored in the registry.

use std::time::Instant;

use super::observer::{ObserverHandle, Sequence};

/// Identity of a content publisher
///
/// Allocated by the registry. A publisher can only withdraw content it
/// published itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublisherId(pub(super) u64);

impl PublisherId {
    /// Raw id value, for logs
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PublisherId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Entry for a single channel in the registry
pub(super) struct ChannelEntry<C> {
    /// Latest published content (None once withdrawn)
    pub(super) content: Option<C>,

    /// Who published the current content (None if anonymous or withdrawn)
    pub(super) publisher: Option<PublisherId>,

    /// Subscribed observers, in subscription order
    pub(super) observers: Vec<ObserverHandle<C>>,

    /// Number of content publications to this channel
    pub(super) revision: u64,

    /// Sequence of the last stored change (or of the entry's creation)
    pub(super) sequence: Sequence,

    /// When the channel entry was created
    pub(super) created_at: Instant,
}

impl<C> ChannelEntry<C> {
    /// Create an empty channel entry
    pub(super) fn new(sequence: Sequence) -> Self {
        Self {
            content: None,
            publisher: None,
            observers: Vec::new(),
            revision: 0,
            sequence,
            created_at: Instant::now(),
        }
    }

    /// Add an observer unless it is already subscribed
    ///
    /// Returns false if the observer was already present.
    pub(super) fn add_observer(&mut self, observer: &ObserverHandle<C>) -> bool {
        if self.observers.contains(observer) {
            return false;
        }
        self.observers.push(observer.clone());
        true
    }

    /// Remove an observer by identity
    ///
    /// Returns false if the observer was not subscribed.
    pub(super) fn remove_observer(&mut self, observer: &ObserverHandle<C>) -> bool {
        let before = self.observers.len();
        self.observers.retain(|o| o != observer);
        self.observers.len() != before
    }

    /// Replace the stored content
    pub(super) fn set_content(
        &mut self,
        content: Option<C>,
        publisher: Option<PublisherId>,
        sequence: Sequence,
    ) {
        self.sequence = sequence;
        if content.is_some() {
            self.revision += 1;
            self.publisher = publisher;
        } else {
            self.publisher = None;
        }
        self.content = content;
    }

    /// Whether `publisher` may withdraw the current content
    ///
    /// Anonymous withdrawals always may; a named publisher may not clear
    /// content someone else published after it.
    pub(super) fn may_withdraw(&self, publisher: Option<PublisherId>) -> bool {
        match (publisher, self.publisher) {
            (Some(requester), Some(owner)) => requester == owner,
            _ => true,
        }
    }

    /// Whether the entry holds nothing and may be removed
    pub(super) fn is_vacant(&self) -> bool {
        self.content.is_none() && self.observers.is_empty()
    }

    /// Snapshot of the current observers for fan-out
    pub(super) fn snapshot(&self) -> Vec<ObserverHandle<C>> {
        self.observers.clone()
    }

    pub(super) fn stats(&self) -> ChannelStats {
        ChannelStats {
            observer_count: self.observers.len(),
            has_content: self.content.is_some(),
            publisher: self.publisher,
            revision: self.revision,
            sequence: self.sequence,
            age: self.created_at.elapsed(),
        }
    }
}

/// Statistics for a channel
#[derive(Debug, Clone)]
pub struct ChannelStats {
    /// Number of subscribed observers
    pub observer_count: usize,
    /// Whether content is currently published
    pub has_content: bool,
    /// Publisher of the current content, if published by one
    pub publisher: Option<PublisherId>,
    /// Number of content publications since the entry was created
    pub revision: u64,
    /// Sequence of the last stored change
    pub sequence: Sequence,
    /// Time since the entry was created
    pub age: std::time::Duration,
}
