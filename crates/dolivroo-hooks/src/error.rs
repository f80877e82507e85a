use thiserror::Error;

use crate::client::Failure;

/// An accessor was called from a scope no provider covers
///
/// This is a programming error in the consuming code and is returned before
/// any hook state exists or changes.
#[derive(Debug, Clone, Error)]
#[error("{accessor} must be used within a DolivrooProvider")]
pub struct UsageError {
    accessor: &'static str,
}

impl UsageError {
    pub(crate) fn new(accessor: &'static str) -> Self {
        Self { accessor }
    }

    /// Name of the accessor that was misused
    pub fn accessor(&self) -> &'static str {
        self.accessor
    }
}

/// Errors returned to callers of `UseCreateParcel::create_parcel`
#[derive(Debug, Clone, Error)]
pub enum MutationError {
    /// No credential was given to the provider
    #[error("Dolivroo client not initialized")]
    NotInitialized,

    /// The client rejected the call; the same value is stored in hook state
    #[error("{0}")]
    Operation(Failure),
}

impl MutationError {
    /// The client failure, if the call reached the client
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            MutationError::NotInitialized => None,
            MutationError::Operation(failure) => Some(failure),
        }
    }
}

/// Errors raised while loading a `ClientConfig`
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Read {
        /// File that was being read
        path: String,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The config is not valid TOML or has unexpected fields
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
