use thiserror::Error;

/// Crate-wide error type for all fallible primitives.
///
/// Proof *verification* never reports semantic mismatches through this type;
/// those accumulate in [`crate::verification::VerificationResult`]. Errors
/// here are raised for malformed inputs, broken invariants and violated
/// service preconditions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("invalid group parameters: {0}")]
    InvalidGroupParameters(String),

    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("precondition violation: {0}")]
    PreconditionViolation(String),

    #[error("element {0} is not invertible")]
    NotInvertible(String),
}

impl CryptoError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        CryptoError::InvalidArgument(message.into())
    }

    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        CryptoError::InvariantViolation(message.into())
    }

    pub(crate) fn precondition(message: impl Into<String>) -> Self {
        CryptoError::PreconditionViolation(message.into())
    }
}
