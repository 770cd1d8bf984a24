//! Pure validation logic for the operation executor.

pub mod validation;

pub use validation::{validate_amount, MAX_AMOUNT};
