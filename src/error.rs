//! Custom error types for ledger-core
//!
//! This module defines the error hierarchy for the crate using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for ledger operations
///
/// Every fallible operation in the crate either fully succeeds or leaves
/// the touched structure exactly as it was before the call; allocations
/// required by a mutation are made before any part of the mutation is
/// applied.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// An allocation failed while growing a container
    #[error("out of memory")]
    OutOfMemory,

    /// A malformed field, date, or index was supplied by the caller
    #[error("invalid {what}: {why}")]
    InvalidArgument { what: &'static str, why: String },

    /// A stored line failed to deserialize during bulk load
    ///
    /// `line` is the 1-based line number of the offending line.
    #[error("corrupt ledger data at line {line}")]
    CorruptData { line: usize },

    /// The ledger exceeds the structural maximum record count
    #[error("ledger exceeds the maximum of {max} records")]
    TooManyRecords { max: usize },

    /// File I/O errors from the persistence layer
    #[error("I/O error: {0}")]
    Io(String),
}

impl LedgerError {
    /// Create an [`InvalidArgument`](Self::InvalidArgument) error
    pub fn invalid(what: &'static str, why: impl Into<String>) -> Self {
        Self::InvalidArgument {
            what,
            why: why.into(),
        }
    }

    /// Check if this is a corrupt-data error
    pub fn is_corrupt_data(&self) -> bool {
        matches!(self, Self::CorruptData { .. })
    }

    /// Check if this is an invalid-argument error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<std::collections::TryReserveError> for LedgerError {
    fn from(_: std::collections::TryReserveError) -> Self {
        Self::OutOfMemory
    }
}

/// Result type alias for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LedgerError::CorruptData { line: 7 };
        assert_eq!(err.to_string(), "corrupt ledger data at line 7");
        assert!(err.is_corrupt_data());
    }

    #[test]
    fn test_invalid_argument() {
        let err = LedgerError::invalid("category", "must not be empty");
        assert_eq!(err.to_string(), "invalid category: must not be empty");
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: LedgerError = io_err.into();
        assert!(matches!(err, LedgerError::Io(_)));
    }
}
