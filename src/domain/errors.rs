//! Domain error types
//!
//! This module defines the error hierarchy for tripdata. Errors fall in three
//! groups:
//!
//! - run-fatal errors raised before any work is dispatched (configuration file
//!   problems and the aggregated [`ConfigurationError`]),
//! - per-descriptor errors ([`FetchError`], [`ConversionError`], [`LoadError`])
//!   that carry the identity and a typed cause and are turned into failed
//!   outcomes at the worker boundary,
//! - the run-level [`TripdataError::CircuitBreakerAborted`], derived from an
//!   aborted run report.
//!
//! No third-party error types are exposed.

use super::ids::DescriptorId;
use std::fmt;
use thiserror::Error;

/// Main tripdata error type
#[derive(Debug, Error)]
pub enum TripdataError {
    /// Configuration file missing, unreadable or malformed
    #[error("Configuration file error: {0}")]
    ConfigFile(String),

    /// Dataset groups failed validation
    #[error(transparent)]
    InvalidConfiguration(#[from] ConfigurationError),

    /// Remote transfer failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Columnar conversion failed
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// Warehouse load failed
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The run stopped after too many consecutive failures
    #[error("Run aborted by circuit breaker after {consecutive_failures} consecutive failures")]
    CircuitBreakerAborted { consecutive_failures: usize },

    /// A component could not be set up (HTTP client, warehouse)
    #[error("Initialization error: {0}")]
    Initialization(String),

    /// Warehouse errors outside a per-descriptor load
    #[error("Warehouse error: {0}")]
    Warehouse(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// A single problem found in the dataset configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigViolation {
    /// Index of the offending group; `None` for problems with the list itself
    pub group: Option<usize>,

    /// Field within the group (`taxi_types`, `years`, `months`) or `datasets`
    pub field: String,

    /// What is wrong
    pub message: String,
}

impl ConfigViolation {
    /// Violation inside a specific group
    pub fn in_group(group: usize, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            group: Some(group),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Violation of the top-level `datasets` list
    pub fn top_level(message: impl Into<String>) -> Self {
        Self {
            group: None,
            field: "datasets".to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.group {
            Some(index) => write!(f, "datasets[{index}].{}: {}", self.field, self.message),
            None => write!(f, "{}: {}", self.field, self.message),
        }
    }
}

/// Aggregated dataset configuration error
///
/// Holds every violation found across all groups, never just the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ConfigurationError {
    violations: Vec<ConfigViolation>,
}

impl ConfigurationError {
    /// Create from a non-empty list of violations
    pub fn new(violations: Vec<ConfigViolation>) -> Self {
        Self { violations }
    }

    /// All violations, in discovery order
    pub fn violations(&self) -> &[ConfigViolation] {
        &self.violations
    }

    /// Violations reported for one group
    pub fn for_group(&self, group: usize) -> impl Iterator<Item = &ConfigViolation> {
        self.violations
            .iter()
            .filter(move |v| v.group == Some(group))
    }
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid dataset configuration ({} problem{})",
            self.violations.len(),
            if self.violations.len() == 1 { "" } else { "s" }
        )?;
        for violation in &self.violations {
            write!(f, "\n  - {violation}")?;
        }
        Ok(())
    }
}

/// Cause of a failed transfer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    /// Credentials were rejected (401/403)
    #[error("authentication rejected (HTTP {status})")]
    Authentication { status: u16 },

    /// The archive does not publish this file
    #[error("not found in archive (HTTP 404)")]
    NotFound,

    /// Too many requests (429)
    #[error("rate limited by archive (HTTP 429)")]
    RateLimited,

    /// Any other non-success status
    #[error("unexpected HTTP status {status}")]
    Http { status: u16 },

    /// Connection, TLS, timeout or body read failure
    #[error("network error: {0}")]
    Network(String),

    /// Fewer bytes arrived than the server announced
    #[error("incomplete transfer: received {received} of {expected} bytes")]
    Incomplete { expected: u64, received: u64 },

    /// Writing the artifact locally failed
    #[error("local write failed: {0}")]
    Io(String),
}

impl FetchFailure {
    /// Whether repeating the request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchFailure::RateLimited
            | FetchFailure::Network(_)
            | FetchFailure::Incomplete { .. } => true,
            FetchFailure::Http { status } => *status >= 500,
            FetchFailure::Authentication { .. } | FetchFailure::NotFound | FetchFailure::Io(_) => {
                false
            }
        }
    }
}

/// Transfer error for one descriptor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to fetch {id}: {cause}")]
pub struct FetchError {
    /// Descriptor identity
    pub id: DescriptorId,
    /// Underlying cause
    pub cause: FetchFailure,
}

impl FetchError {
    /// Create a new fetch error
    pub fn new(id: DescriptorId, cause: FetchFailure) -> Self {
        Self { id, cause }
    }
}

/// Cause of a failed conversion
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionFailure {
    /// Neither raw nor columnar artifact exists
    #[error("raw artifact missing: {0}")]
    MissingInput(String),

    /// The columnar engine rejected the input
    #[error("conversion engine error: {0}")]
    Engine(String),

    /// Filesystem error around the conversion
    #[error("I/O error: {0}")]
    Io(String),
}

/// Conversion error for one descriptor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to convert {id}: {cause}")]
pub struct ConversionError {
    /// Descriptor identity
    pub id: DescriptorId,
    /// Underlying cause
    pub cause: ConversionFailure,
}

impl ConversionError {
    /// Create a new conversion error
    pub fn new(id: DescriptorId, cause: ConversionFailure) -> Self {
        Self { id, cause }
    }
}

/// Cause of a failed load
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadFailure {
    /// The store cannot be reached or is locked
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Columnar file does not fit the existing table
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Any other store error
    #[error("query failed: {0}")]
    Query(String),
}

/// Load error for one descriptor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to load {id}: {cause}")]
pub struct LoadError {
    /// Descriptor identity
    pub id: DescriptorId,
    /// Underlying cause
    pub cause: LoadFailure,
}

impl LoadError {
    /// Create a new load error
    pub fn new(id: DescriptorId, cause: LoadFailure) -> Self {
        Self { id, cause }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for TripdataError {
    fn from(err: std::io::Error) -> Self {
        TripdataError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for TripdataError {
    fn from(err: serde_json::Error) -> Self {
        TripdataError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for TripdataError {
    fn from(err: toml::de::Error) -> Self {
        TripdataError::ConfigFile(format!("TOML parse error: {err}"))
    }
}
