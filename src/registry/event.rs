//! Registry events
//!
//! A monitoring tap over registry traffic. Events are sent on a
//! `tokio::sync::broadcast` channel after the registry lock is released;
//! they carry no content, only what happened to which channel.

use super::channel::ChannelName;
use super::observer::ObserverId;

/// Something that happened inside a registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// Channel entry created by a first publish or subscribe
    ChannelCreated { channel: ChannelName },
    /// Content published to a channel
    Published {
        channel: ChannelName,
        /// Number of observers notified
        observers: usize,
    },
    /// Content withdrawn from a channel
    Withdrawn {
        channel: ChannelName,
        /// Number of observers notified
        observers: usize,
    },
    /// Observer added to a channel
    Subscribed {
        channel: ChannelName,
        observer: ObserverId,
    },
    /// Observer removed from a channel
    Unsubscribed {
        channel: ChannelName,
        observer: ObserverId,
    },
    /// Channel entry dropped from the registry
    ChannelRemoved { channel: ChannelName },
}

impl RegistryEvent {
    /// The channel this event refers to
    pub fn channel(&self) -> &ChannelName {
        match self {
            RegistryEvent::ChannelCreated { channel }
            | RegistryEvent::Published { channel, .. }
            | RegistryEvent::Withdrawn { channel, .. }
            | RegistryEvent::Subscribed { channel, .. }
            | RegistryEvent::Unsubscribed { channel, .. }
            | RegistryEvent::ChannelRemoved { channel } => channel,
        }
    }
}
