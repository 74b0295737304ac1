//! Error types for diagnostic record decoding

use thiserror::Error;

/// Errors that make a diagnostic record undecodable.
///
/// Records that are well-formed but simply not interesting (foreign record
/// classes, unknown protocol ids, unhandled message types) are not errors;
/// they are reported as [`crate::SkipReason`] instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiagError {
    /// Record is shorter than its header or one of its length fields implies
    #[error("Truncated record: expected at least {expected} bytes, got {actual}")]
    TruncatedRecord { expected: usize, actual: usize },

    /// Payload does not fit into the radio message buffer
    #[error("Payload too large: {len} bytes does not fit in a {capacity} byte message")]
    PayloadTooLarge { len: usize, capacity: usize },
}

impl DiagError {
    /// True for errors caused by an oversized payload rather than a short buffer.
    pub fn is_oversized(&self) -> bool {
        matches!(self, DiagError::PayloadTooLarge { .. })
    }
}

/// Errors raised by a [`crate::RadioSink`] when a session cannot be opened.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The sink refused to start
    #[error("Session start failed: {0}")]
    StartFailed(String),

    /// Session configuration is unusable
    #[error("Invalid session configuration: {0}")]
    InvalidConfig(String),
}
