//! Error type shared by every stage of the extraction pipeline.

use std::fmt;

/// Error type for location parsing, identity resolution and reshaping
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TidyError {
    /// Location text has the wrong number of parts or a non-integer index
    MalformedLocation {
        location: String,
        reason: String,
    },
    /// One or more identity locations do not yield exactly one value per message
    AmbiguousIdentity {
        locations: Vec<String>,
    },
    /// Resolved message identifiers are not unique across the batch
    DuplicateIdentity {
        duplicates: Vec<String>,
    },
    /// Paired sequences differ in length
    LengthMismatch {
        expected: usize,
        actual: usize,
    },
    /// An operation that needs at least one location or table received none
    NoLocations,
    /// Two tables being joined carry the same column label
    DuplicateColumn {
        label: String,
    },
    /// Data locations span several segments while a single segment is required
    MixedSegments {
        segments: Vec<String>,
    },
    Config(String),
    Io(String),
}

impl fmt::Display for TidyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TidyError::MalformedLocation { location, reason } => {
                write!(f, "Malformed location '{}': {}", location, reason)
            }
            TidyError::AmbiguousIdentity { locations } => write!(
                f,
                "One or more ID locations do not yield exactly one value per message: {}",
                locations.join(", ")
            ),
            TidyError::DuplicateIdentity { duplicates } => {
                write!(f, "Message IDs are not unique: {}", duplicates.join("; "))
            }
            TidyError::LengthMismatch { expected, actual } => {
                write!(f, "Length mismatch: expected {}, got {}", expected, actual)
            }
            TidyError::NoLocations => write!(f, "At least one location is required"),
            TidyError::DuplicateColumn { label } => {
                write!(f, "Column '{}' appears in more than one joined table", label)
            }
            TidyError::MixedSegments { segments } => write!(
                f,
                "Data locations must come from a single segment, found: {}",
                segments.join(", ")
            ),
            TidyError::Config(msg) => write!(f, "Config error: {}", msg),
            TidyError::Io(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for TidyError {}

impl From<std::io::Error> for TidyError {
    fn from(err: std::io::Error) -> Self {
        TidyError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TidyError {
    fn from(err: serde_json::Error) -> Self {
        TidyError::Io(format!("JSON error: {}", err))
    }
}
