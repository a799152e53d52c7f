//! Error types
//!
//! Core pipe operations are total: publishing to an empty name, removing an
//! observer that was never registered and similar misuse are no-ops. Errors
//! only surface at the typed boundaries (name parsing, configuration).

/// Error type for pipe construction and parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipeError {
    /// A channel name was empty
    EmptyChannelName,
    /// Registry configuration rejected
    InvalidConfig(String),
}

impl std::fmt::Display for PipeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipeError::EmptyChannelName => write!(f, "Channel name must not be empty"),
            PipeError::InvalidConfig(reason) => write!(f, "Invalid registry config: {}", reason),
        }
    }
}

impl std::error::Error for PipeError {}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, PipeError>;
