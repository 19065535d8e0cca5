//! Error types for the library layer.

use std::fmt;

/// Errors produced by the library layer, wrapping upstream API errors and
/// adding serialization failures.
#[derive(Debug)]
pub enum UtilityRatesError {
    /// An error from the underlying API client.
    Api(usurdb_api::Error),
    /// JSON serialization or deserialization failed.
    Serialization(serde_json::Error),
}

impl fmt::Display for UtilityRatesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(e) => write!(f, "API error: {}", e),
            Self::Serialization(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for UtilityRatesError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Api(e) => Some(e),
            Self::Serialization(e) => Some(e),
        }
    }
}

impl From<usurdb_api::Error> for UtilityRatesError {
    fn from(e: usurdb_api::Error) -> Self {
        Self::Api(e)
    }
}

impl From<serde_json::Error> for UtilityRatesError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e)
    }
}
