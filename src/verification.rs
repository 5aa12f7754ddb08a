//! Verification outcome type for proof verifiers.
//!
//! Verifiers are total: semantic mismatches never raise, they accumulate
//! into a [`VerificationResult::Failure`] carrying a stack of messages.

use crate::errors::CryptoError;

/// Outcome of verifying a proof or argument.
///
/// Combines with [`VerificationResult::and`], which short-circuits at the
/// first failure. Failure messages stack innermost-first; callers add
/// context on the way out with [`VerificationResult::add_error_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
    Success,
    Failure(Vec<String>),
}

impl VerificationResult {
    /// A failure carrying a single message.
    pub fn failure(message: impl Into<String>) -> Self {
        VerificationResult::Failure(vec![message.into()])
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, VerificationResult::Success)
    }

    /// Short-circuiting conjunction: `other` is only evaluated on success.
    pub fn and(self, other: impl FnOnce() -> VerificationResult) -> VerificationResult {
        match self {
            VerificationResult::Success => other(),
            failure => failure,
        }
    }

    /// Pushes a higher-level context message onto a failure; success passes
    /// through untouched.
    pub fn add_error_message(self, message: impl Into<String>) -> VerificationResult {
        match self {
            VerificationResult::Success => VerificationResult::Success,
            VerificationResult::Failure(mut messages) => {
                messages.push(message.into());
                VerificationResult::Failure(messages)
            }
        }
    }

    /// The accumulated failure messages, innermost first.
    ///
    /// Querying the messages of a success is a caller bug.
    pub fn error_messages(&self) -> Result<&[String], CryptoError> {
        match self {
            VerificationResult::Success => Err(CryptoError::precondition(
                "a successful verification result carries no error messages",
            )),
            VerificationResult::Failure(messages) => Ok(messages),
        }
    }
}

/// Builds a result from a boolean check and its failure message.
pub fn verify_that(condition: bool, message: impl Into<String>) -> VerificationResult {
    if condition {
        VerificationResult::Success
    } else {
        VerificationResult::failure(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_short_circuits_on_failure() {
        let first = VerificationResult::failure("first check failed");
        let result = first.and(|| panic!("must not be evaluated"));
        assert_eq!(result, VerificationResult::failure("first check failed"));
    }

    #[test]
    fn and_chains_successes() {
        let result = VerificationResult::Success
            .and(|| VerificationResult::Success)
            .and(|| verify_that(true, "unused"));
        assert!(result.is_verified());
    }

    #[test]
    fn context_messages_stack_on_failures() {
        let result = verify_that(false, "inner check failed").add_error_message("outer context");
        let messages = result.error_messages().unwrap();
        assert_eq!(messages, ["inner check failed", "outer context"]);
    }

    #[test]
    fn success_has_no_messages() {
        assert!(VerificationResult::Success.error_messages().is_err());
    }
}
