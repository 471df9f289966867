use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::MortgageSimError;

/// Currency amounts, never f64.
pub type Money = Decimal;

/// Rates. Annual rates are carried as percentages (3.5 = 3.5%), monthly
/// rates as decimals (0.003 = 0.3% per month); field names say which.
pub type Rate = Decimal;

/// Whole months of amortisation
pub type Months = u32;

/// Version stamped into every computation envelope.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Borrower insurance charged when a request does not name a rate (0.36%/yr).
pub const DEFAULT_INSURANCE_RATE_PERCENT: Rate = dec!(0.36);

/// Highest annual insurance rate accepted, in percent.
pub const MAX_INSURANCE_RATE_PERCENT: Rate = dec!(100);

pub(crate) fn default_insurance_rate() -> Rate {
    DEFAULT_INSURANCE_RATE_PERCENT
}

/// Decimal overflow while computing `field`.
pub(crate) fn too_large(field: &str) -> MortgageSimError {
    MortgageSimError::invalid_input(field, "Value is too large to compute")
}

/// Round a currency amount to cents, half away from zero.
pub fn round_money(amount: Money) -> Money {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Envelope returned by every engine entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Wrap `result` with its methodology, assumptions and timing.
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: ENGINE_VERSION.to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
