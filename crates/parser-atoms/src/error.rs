//! Core error types for the parser-atoms crate
//!
//! Interning has exactly one failure mode, running out of memory. Parsing an
//! atom as a number has its own, independent error type so callers can pick
//! a fallback without confusing it with allocation failure.

use thiserror::Error;

/// Error type for every allocating atom operation
///
/// # Examples
///
/// ```
/// use parser_atoms::{AtomsConfig, AtomsError, ParserAtomsTable, WellKnownParserAtoms};
///
/// let well_known = WellKnownParserAtoms::<u32>::new().unwrap();
/// let config = AtomsConfig::default().with_memory_limit(0);
/// let mut table = ParserAtomsTable::with_config(&well_known, &config);
///
/// match table.intern_utf8("not_preinterned") {
///     Err(AtomsError::OutOfMemory { requested }) => assert!(requested > 0),
///     Ok(_) => unreachable!("no memory budget left"),
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AtomsError {
    /// An allocation could not be satisfied
    ///
    /// **When returned:** the memory budget is exhausted, or the system
    /// allocator refused a fallible reservation.
    ///
    /// **Recovery strategy:** none inside the table; the failed operation
    /// left the table untouched, so the caller may abort the parse or retry
    /// after freeing memory.
    #[error("out of memory: failed to allocate {requested} bytes for parser atoms")]
    OutOfMemory { requested: usize },
}

impl AtomsError {
    /// Build an out-of-memory error, reporting it through the log facade
    pub(crate) fn out_of_memory(requested: usize) -> Self {
        log::warn!("parser atoms out of memory: requested {} bytes", requested);
        AtomsError::OutOfMemory { requested }
    }
}

/// Error type for numeric conversion of an atom's text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumberError {
    /// The text does not match the numeric string grammar
    #[error("invalid numeric literal: {text:?}")]
    InvalidLiteral { text: String },
}

/// Result type alias for atom operations
pub type AtomsResult<T> = std::result::Result<T, AtomsError>;

/// Result type alias for numeric conversions
pub type NumberResult<T> = std::result::Result<T, NumberError>;
