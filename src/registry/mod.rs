//! Channel registry for named content routing
//!
//! The registry owns every channel of one scope. Inlets publish content
//! under a channel name; outlets subscribe an observer to a channel name and
//! receive each new value synchronously, in subscription order.
//!
//! # Architecture
//!
//! ```text
//!                        Arc<ChannelRegistry<C>>
//!                   ┌──────────────────────────────┐
//!                   │ channels: Mutex<HashMap<     │
//!                   │   ChannelName,               │
//!                   │   ChannelEntry {             │
//!                   │     content: Option<C>,      │
//!                   │     observers: Vec<Handle>,  │
//!                   │   }                          │
//!                   │ >>                           │
//!                   └──────────────┬───────────────┘
//!                                  │
//!         ┌────────────────────────┼────────────────────────┐
//!         │                        │                        │
//!         ▼                        ▼                        ▼
//!      [Inlet]                 [Outlet]                 [Outlet]
//!   publish(name, c)       observer.notify()        observer.notify()
//!         │                        ▲                        ▲
//!         └──► snapshot observers ─┴────────────────────────┘
//! ```
//!
//! # Invariants
//!
//! - A channel with no content and no observers is never kept.
//! - An observer is registered at most once per channel.
//! - Fan-out runs outside the lock over a snapshot, so observers may
//!   re-enter the registry.
//! - Every stored change takes the next [`Sequence`] under the lock; pushes
//!   carry it so observers can drop deliveries that arrive late.

pub mod channel;
pub mod config;
pub mod entry;
pub mod event;
pub mod observer;
pub mod store;

pub use channel::ChannelName;
pub use config::RegistryConfig;
pub use entry::{ChannelStats, PublisherId};
pub use event::RegistryEvent;
pub use observer::{Observer, ObserverHandle, ObserverId, Sequence};
pub use store::ChannelRegistry;
