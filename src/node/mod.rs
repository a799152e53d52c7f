//! Pipe endpoints
//!
//! - [`Inlet`]: publishes content under a channel name
//! - [`Outlet`]: displays the content of a channel name, or its default
//!
//! Both follow the same attachment state machine ([`NodePhase`]):
//! `Unattached -> Attached(name)` on creation with a name,
//! `Attached(a) -> Attached(b)` on rename and `Attached(name) -> Unattached`
//! when the name is cleared or the node is dropped.

pub mod inlet;
pub mod outlet;
pub mod phase;

pub use inlet::Inlet;
pub use outlet::Outlet;
pub use phase::{NodePhase, Transition};
