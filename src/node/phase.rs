//! Node attachment state machine
//!
//! Inlets and outlets are either attached to one channel or to none. Every
//! lifecycle event is reduced to a `Transition` first and then applied to
//! the registry, so the two node kinds share one definition of which moves
//! are legal.

use crate::registry::ChannelName;

/// Attachment state of an inlet or outlet
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NodePhase {
    /// Not registered under any channel
    #[default]
    Unattached,
    /// Registered under the given channel
    Attached(ChannelName),
}

/// Registry work needed to move between two phases
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Same channel (or still none); nothing to do
    Stay,
    /// `Unattached -> Attached(to)`
    Attach { to: ChannelName },
    /// `Attached(from) -> Attached(to)`
    Move { from: ChannelName, to: ChannelName },
    /// `Attached(from) -> Unattached`
    Detach { from: ChannelName },
}

impl NodePhase {
    /// Phase for an optional channel name
    pub fn from_name(name: Option<ChannelName>) -> Self {
        match name {
            Some(name) => NodePhase::Attached(name),
            None => NodePhase::Unattached,
        }
    }

    /// The channel this node is attached to
    pub fn channel(&self) -> Option<&ChannelName> {
        match self {
            NodePhase::Attached(name) => Some(name),
            NodePhase::Unattached => None,
        }
    }

    /// Check if the node is attached
    pub fn is_attached(&self) -> bool {
        matches!(self, NodePhase::Attached(_))
    }

    /// Check if the node is attached to `name`
    pub fn is_on(&self, name: &str) -> bool {
        self.channel().is_some_and(|channel| channel == name)
    }

    /// Compute the transition to a new channel name
    pub fn transition(&self, next: Option<&ChannelName>) -> Transition {
        match (self.channel(), next) {
            (None, None) => Transition::Stay,
            (Some(current), Some(next)) if current == next => Transition::Stay,
            (None, Some(to)) => Transition::Attach { to: to.clone() },
            (Some(from), Some(to)) => Transition::Move {
                from: from.clone(),
                to: to.clone(),
            },
            (Some(from), None) => Transition::Detach { from: from.clone() },
        }
    }
}

impl Transition {
    /// Channel left by this transition
    pub fn leaving(&self) -> Option<&ChannelName> {
        match self {
            Transition::Move { from, .. } | Transition::Detach { from } => Some(from),
            Transition::Stay | Transition::Attach { .. } => None,
        }
    }

    /// Channel entered by this transition
    pub fn entering(&self) -> Option<&ChannelName> {
        match self {
            Transition::Attach { to } | Transition::Move { to, .. } => Some(to),
            Transition::Stay | Transition::Detach { .. } => None,
        }
    }
}
