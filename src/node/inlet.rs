//! Producer node
//!
//! An inlet publishes its content under its channel name for as long as it
//! lives. It renders nothing itself.

use std::sync::Arc;

use crate::content::Content;
use crate::registry::{ChannelName, ChannelRegistry, PublisherId};

use super::phase::{NodePhase, Transition};

/// Publishes content into a named channel
///
/// The binding is owned by the inlet and only changes through its own
/// lifecycle methods. Dropping the inlet withdraws its content, unless
/// another inlet has published to the same channel since.
pub struct Inlet<C: Content> {
    registry: Arc<ChannelRegistry<C>>,
    id: PublisherId,
    phase: NodePhase,
    content: Option<C>,
}

impl<C: Content> Inlet<C> {
    /// Create an inlet and publish `content` under `name`
    ///
    /// An absent or empty name leaves the inlet unattached; it will not
    /// touch the registry until it is given a name.
    pub fn new(registry: Arc<ChannelRegistry<C>>, name: Option<&str>, content: Option<C>) -> Self {
        let id = registry.register_publisher();
        let mut inlet = Self {
            registry,
            id,
            phase: NodePhase::Unattached,
            content,
        };

        let transition = inlet
            .phase
            .transition(name.and_then(ChannelName::optional).as_ref());
        inlet.apply(transition);
        inlet
    }

    /// Publisher identity of this inlet
    pub fn id(&self) -> PublisherId {
        self.id
    }

    /// Channel this inlet publishes to
    pub fn name(&self) -> Option<&ChannelName> {
        self.phase.channel()
    }

    /// Current attachment state
    pub fn phase(&self) -> &NodePhase {
        &self.phase
    }

    /// Content this inlet holds
    pub fn content(&self) -> Option<&C> {
        self.content.as_ref()
    }

    /// Replace the content, republishing it if it changed
    pub fn set_content(&mut self, content: Option<C>) {
        if content == self.content {
            return;
        }

        self.content = content;
        if let Some(channel) = self.phase.channel() {
            self.registry.publish_as(self.id, channel, self.content.clone());
        }
    }

    /// Move to another channel (or to none)
    ///
    /// The old channel is cleared before the content appears under the new
    /// name.
    pub fn set_name(&mut self, name: Option<&str>) {
        let next = name.and_then(ChannelName::optional);
        let transition = self.phase.transition(next.as_ref());
        self.apply(transition);
    }

    /// Apply new properties in one step
    ///
    /// A rename carries the new content with it; otherwise only a content
    /// change is published.
    pub fn update(&mut self, name: Option<&str>, content: Option<C>) {
        let next = name.and_then(ChannelName::optional);

        match self.phase.transition(next.as_ref()) {
            Transition::Stay => self.set_content(content),
            transition => {
                self.content = content;
                self.apply(transition);
            }
        }
    }

    /// Withdraw the content and drop the inlet
    pub fn detach(self) {}

    fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::Stay => {}
            Transition::Attach { to } => {
                self.registry.publish_as(self.id, &to, self.content.clone());
                tracing::debug!(
                    scope = %self.registry.config().scope,
                    inlet = self.id.get(),
                    channel = %to,
                    "Inlet attached"
                );
                self.phase = NodePhase::Attached(to);
            }
            Transition::Move { from, to } => {
                self.registry.publish_as(self.id, &from, None);
                self.phase = NodePhase::Attached(to.clone());
                self.registry.publish_as(self.id, &to, self.content.clone());
                tracing::debug!(
                    scope = %self.registry.config().scope,
                    inlet = self.id.get(),
                    from = %from,
                    to = %to,
                    "Inlet renamed"
                );
            }
            Transition::Detach { from } => {
                self.registry.publish_as(self.id, &from, None);
                self.phase = NodePhase::Unattached;
                tracing::debug!(
                    scope = %self.registry.config().scope,
                    inlet = self.id.get(),
                    channel = %from,
                    "Inlet left channel"
                );
            }
        }
    }
}

impl<C: Content> Drop for Inlet<C> {
    fn drop(&mut self) {
        let transition = self.phase.transition(None);
        self.apply(transition);
    }
}

impl<C: Content + std::fmt::Debug> std::fmt::Debug for Inlet<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inlet")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("content", &self.content)
            .finish()
    }
}
