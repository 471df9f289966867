use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MortgageSimError {
    #[error("Insufficient input: {missing} missing; supply at least three of principal, annual rate, duration and monthly payment")]
    InsufficientInput { missing: String },

    #[error("Invalid payment: {0}")]
    InvalidPayment(String),

    #[error("Rate did not converge after {iterations} iterations (residual: {last_delta}): {reason}")]
    NonConvergentRate {
        reason: String,
        iterations: u32,
        last_delta: Decimal,
    },

    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl MortgageSimError {
    pub(crate) fn invalid_input(field: &str, reason: impl Into<String>) -> Self {
        MortgageSimError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for MortgageSimError {
    fn from(e: serde_json::Error) -> Self {
        MortgageSimError::SerializationError(e.to_string())
    }
}
