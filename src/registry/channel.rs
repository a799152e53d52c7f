//! Channel names
//!
//! Channels are keyed by a non-empty string. The name is shared between the
//! registry map, node state and emitted events, so it is reference counted.

use std::borrow::Borrow;
use std::ops::Deref;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{PipeError, Result};

/// Unique identifier for a channel within one registry
///
/// Hashes and compares exactly like the underlying `str`, so the registry
/// can be queried with a plain `&str`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelName(Arc<str>);

impl ChannelName {
    /// Parse a channel name, rejecting the empty string
    pub fn parse(name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(PipeError::EmptyChannelName);
        }
        Ok(Self(Arc::from(name)))
    }

    /// Parse a channel name, treating the empty string as "no channel"
    pub fn optional(name: &str) -> Option<Self> {
        Self::parse(name).ok()
    }

    /// Get the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for ChannelName {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ChannelName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ChannelName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ChannelName {
    type Err = PipeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for ChannelName {
    type Error = PipeError;

    fn try_from(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ChannelName {
    type Error = PipeError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl PartialEq<str> for ChannelName {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for ChannelName {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl std::fmt::Display for ChannelName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
