// ---------------------------------------------------------------------------
// Error types for the civic core boundaries
// ---------------------------------------------------------------------------

use std::fmt;

/// Failure of an upstream environmental (or chat) provider.
///
/// Never surfaces past the aggregator: every variant maps to the documented
/// fallback readings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// Connection refused, DNS failure, reset, etc.
    Transport(String),
    /// The provider did not answer within the configured timeout.
    Timeout { after_ms: u64 },
    /// Non-success HTTP status.
    Status(u16),
    /// Body was not the expected JSON shape (missing or null fields included).
    Decode(String),
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamError::Transport(msg) => write!(f, "Transport error: {msg}"),
            UpstreamError::Timeout { after_ms } => {
                write!(f, "Upstream timed out after {after_ms} ms")
            }
            UpstreamError::Status(code) => write!(f, "Upstream returned HTTP {code}"),
            UpstreamError::Decode(msg) => write!(f, "Decoding error: {msg}"),
        }
    }
}

impl std::error::Error for UpstreamError {}

impl From<serde_json::Error> for UpstreamError {
    fn from(e: serde_json::Error) -> Self {
        UpstreamError::Decode(e.to_string())
    }
}

/// A write the store refused. The store is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// `update_hospital` for an id that is not on the roster. The roster is
    /// never extended by an update.
    NoSuchHospital { id: String },
    /// `beds_available` exceeds `total_beds`.
    InvalidCapacity {
        id: String,
        beds_available: u32,
        total_beds: u32,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NoSuchHospital { id } => write!(f, "No such hospital: {id}"),
            StoreError::InvalidCapacity {
                id,
                beds_available,
                total_beds,
            } => write!(
                f,
                "Hospital {id}: {beds_available} beds available exceeds {total_beds} total"
            ),
        }
    }
}

impl std::error::Error for StoreError {}

/// Missing or malformed configuration. There is no safe default for these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingCredential {
        provider: &'static str,
        variable: &'static str,
    },
    UnknownProvider(String),
    InvalidValue { variable: String, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingCredential { provider, variable } => write!(
                f,
                "API key not configured for {provider}: set {variable}"
            ),
            ConfigError::UnknownProvider(name) => write!(f, "Unsupported provider: {name}"),
            ConfigError::InvalidValue { variable, value } => {
                write!(f, "Invalid value for {variable}: {value:?}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
