pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "loan")]
pub mod loan;

#[cfg(feature = "capacity")]
pub mod capacity;

pub use error::MortgageSimError;
pub use types::*;

/// Standard result type for all mortgage-sim operations
pub type MortgageSimResult<T> = Result<T, MortgageSimError>;
