//! Structured error types for the Caliper toolkit.

use thiserror::Error;

/// Unified error type for all Caliper operations.
///
/// Every failure mode is deterministic and fully determined by input shape;
/// there are no transient errors to retry.
#[derive(Debug, Error)]
pub enum CaliperError {
    /// Two paired input sequences have different lengths.
    #[error("length mismatch: {left} vs {right}")]
    LengthMismatch {
        /// Length of the first sequence.
        left: usize,
        /// Length of the second sequence.
        right: usize,
    },

    /// Unrecognized ordering-method name.
    #[error("invalid ordering method: {0:?} (expected \"label\" or \"score\")")]
    InvalidMethod(String),

    /// A rate whose denominator is structurally zero (a class is entirely
    /// absent from the tabulated counts).
    #[error("undefined rate: {0}")]
    UndefinedRate(&'static str),

    /// A concordance ratio whose denominator is zero (degenerate reference
    /// sequence with no unequal pairs).
    #[error("undefined concordance: {0}")]
    UndefinedConcordance(String),

    /// A curve operation that divides by the positive count was requested on
    /// input with no positive samples.
    #[error("no positive samples")]
    NoPositiveSamples,

    /// Invalid input (bad arguments, out-of-range values)
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience alias used throughout the Caliper toolkit.
pub type Result<T> = std::result::Result<T, CaliperError>;
