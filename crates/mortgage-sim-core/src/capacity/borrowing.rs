//! Borrowing capacity: the largest principal a fixed monthly budget can carry.
//!
//! The insurance premium is proportional to the principal being solved for,
//! so it is folded into the per-unit cost of borrowing:
//!
//!   P_max = M_max / (annuity(r, n) + insurance% / 1200)
//!
//! with annuity(0, n) = 1/n.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::MortgageSimError;
use crate::time_value::{annuity_factor, RateConvention};
use crate::types::{
    default_insurance_rate, round_money, too_large, with_metadata, ComputationOutput, Money,
    Months, Rate, MAX_INSURANCE_RATE_PERCENT,
};
use crate::MortgageSimResult;

/// Longest horizon accepted, in years.
const MAX_DURATION_YEARS: u32 = 50;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityRequest {
    /// Monthly budget, insurance included.
    pub max_monthly_payment: Money,
    pub annual_rate_percent: Rate,
    pub duration_years: u32,
    #[serde(default = "default_insurance_rate")]
    pub insurance_annual_rate_percent: Rate,
    #[serde(default)]
    pub rate_convention: RateConvention,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityResult {
    pub max_borrowable_principal: Money,
    pub duration_months: Months,
    /// Insurance premium on the maximum principal.
    pub monthly_insurance: Money,
    /// Share of the budget that amortises the loan.
    pub amortising_payment: Money,
    /// Budget paid over the whole duration.
    pub total_repaid: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Maximum principal affordable for `max_monthly_payment`.
pub fn calculate_capacity(
    input: &CapacityRequest,
) -> MortgageSimResult<ComputationOutput<CapacityResult>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    let months: Months = input.duration_years * 12;
    let monthly_rate = input.rate_convention.monthly_rate(input.annual_rate_percent)?;
    let annuity = annuity_factor(monthly_rate, months)?;
    let insurance_per_unit = input.insurance_annual_rate_percent / dec!(1200);

    let denominator = annuity + insurance_per_unit;
    if denominator <= Decimal::ZERO {
        return Err(MortgageSimError::invalid_input(
            "annual_rate_percent",
            "Cost of borrowing per unit of principal must be positive",
        ));
    }

    let principal = input
        .max_monthly_payment
        .checked_div(denominator)
        .ok_or_else(|| too_large("max_monthly_payment"))?;
    let monthly_insurance = principal
        .checked_mul(insurance_per_unit)
        .ok_or_else(|| too_large("insurance_annual_rate_percent"))?;
    let amortising_payment = principal
        .checked_mul(annuity)
        .ok_or_else(|| too_large("max_monthly_payment"))?;
    let total_repaid = input
        .max_monthly_payment
        .checked_mul(Decimal::from(months))
        .ok_or_else(|| too_large("max_monthly_payment"))?;

    let output = CapacityResult {
        max_borrowable_principal: round_money(principal),
        duration_months: months,
        monthly_insurance: round_money(monthly_insurance),
        amortising_payment: round_money(amortising_payment),
        total_repaid: round_money(total_repaid),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Borrowing Capacity (annuity factor plus flat insurance)",
        &serde_json::json!({
            "max_monthly_payment": input.max_monthly_payment.to_string(),
            "monthly_rate": monthly_rate.to_string(),
            "months": months,
            "rate_convention": input.rate_convention,
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn validate_input(input: &CapacityRequest) -> MortgageSimResult<()> {
    if input.max_monthly_payment <= Decimal::ZERO {
        return Err(MortgageSimError::invalid_input(
            "max_monthly_payment",
            "Maximum monthly payment must be positive",
        ));
    }
    if input.duration_years == 0 || input.duration_years > MAX_DURATION_YEARS {
        return Err(MortgageSimError::invalid_input(
            "duration_years",
            format!("Duration must be between 1 and {MAX_DURATION_YEARS} years"),
        ));
    }
    if input.annual_rate_percent < Decimal::ZERO {
        return Err(MortgageSimError::invalid_input(
            "annual_rate_percent",
            "Annual rate must be >= 0",
        ));
    }
    if input.insurance_annual_rate_percent < Decimal::ZERO
        || input.insurance_annual_rate_percent > MAX_INSURANCE_RATE_PERCENT
    {
        return Err(MortgageSimError::invalid_input(
            "insurance_annual_rate_percent",
            format!("Insurance rate must be between 0 and {MAX_INSURANCE_RATE_PERCENT}%"),
        ));
    }
    Ok(())
}
