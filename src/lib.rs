//! # content-pipe
//!
//! A named-channel content router for view trees.
//!
//! Inlets publish content under a channel name; outlets anywhere else in the
//! same scope display the latest content published to the name they listen
//! to, falling back to their own default content while the channel is
//! empty. Producers and consumers can attach, detach and rename at any time;
//! the registry stays free of stale subscriptions and empty entries.
//!
//! ```
//! use content_pipe::Provider;
//!
//! let provider = Provider::<Vec<&'static str>>::new();
//! let inlet = provider.inlet(Some("aloha"), Some(vec!["How are you?", "I am fine."]));
//! let outlet = provider.outlet(Some("aloha"), None);
//!
//! assert_eq!(outlet.displayed(), Some(vec!["How are you?", "I am fine."]));
//!
//! drop(inlet);
//! assert_eq!(outlet.displayed(), None);
//! ```
//!
//! Everything is synchronous: a publish has reached every subscribed outlet
//! by the time it returns.

pub mod content;
pub mod error;
pub mod node;
pub mod provider;
pub mod registry;
pub mod stats;

pub use content::Content;
pub use error::{PipeError, Result};
pub use node::{Inlet, NodePhase, Outlet};
pub use provider::Provider;
pub use registry::{
    ChannelName, ChannelRegistry, ChannelStats, Observer, ObserverHandle, ObserverId, PublisherId,
    RegistryConfig, RegistryEvent, Sequence,
};
pub use stats::RegistryStats;
