//! Error types for discovery beacon parsing.

use thiserror::Error;

/// Errors that can occur while turning a discovery payload into a
/// [`crate::beacon::RadioDescriptor`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    /// A required key (`serial`, `model`, `ip`, `port`) was missing.
    #[error("discovery beacon missing required key: {0}")]
    MissingKey(&'static str),

    /// A recognized key's value could not be parsed.
    #[error("discovery beacon field {field} has unparsable value {value:?}")]
    InvalidField { field: &'static str, value: String },
}

/// Convenience alias for results from this crate.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;
