//! # Amount Validation
//!
//! Local checks applied before anything is encrypted or submitted.

use crate::domain::ExecutorError;

/// Largest amount the client accepts: the biggest integer a UI number
/// field represents exactly (2^53 - 1).
pub const MAX_AMOUNT: u64 = 9_007_199_254_740_991;

/// Validate an amount before encryption.
///
/// Zero and over-limit amounts are rejected locally; nothing leaves the
/// client for an invalid amount.
pub fn validate_amount(amount: u64) -> Result<(), ExecutorError> {
    if amount == 0 {
        return Err(ExecutorError::Validation(
            "amount must be positive".to_string(),
        ));
    }
    if amount > MAX_AMOUNT {
        return Err(ExecutorError::Validation(format!(
            "amount exceeds maximum of {MAX_AMOUNT}"
        )));
    }
    Ok(())
}
