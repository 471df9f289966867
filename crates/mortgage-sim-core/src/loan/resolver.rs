//! Derive the one missing loan parameter from the other three.
//!
//! Payment, principal and duration have closed forms. The rate does not and
//! is found by bisection on the annuity equation. No value is rounded here;
//! rounding to cents happens when the schedule is built.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::MortgageSimError;
use crate::loan::request::{LoanField, LoanRequest, RateType, Resolution, MAX_DURATION_MONTHS};
use crate::time_value::{self, RateConvention};
use crate::types::{Money, Months, Rate};
use crate::MortgageSimResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Convergence tolerance on the payment residual, in currency units.
const RATE_TOLERANCE: Decimal = dec!(0.000000001);

/// Maximum bisection iterations.
const RATE_MAX_ITERATIONS: u32 = 100;

/// Upper bracket for the monthly rate (100% per month).
const RATE_UPPER_BOUND: Rate = dec!(1);

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// A fully determined loan, ready for amortisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLoanParameters {
    pub principal: Money,
    pub annual_rate_percent: Rate,
    pub duration_months: Months,
    /// Level payment excluding insurance.
    pub monthly_payment: Money,
    /// Decimal monthly rate under `rate_convention`.
    pub monthly_rate: Rate,
    pub insurance_annual_rate_percent: Rate,
    pub rate_type: RateType,
    pub rate_convention: RateConvention,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solved_for: Option<LoanField>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Fill in the missing field of `request`.
pub fn resolve_parameters(request: &LoanRequest) -> MortgageSimResult<ResolvedLoanParameters> {
    resolve_with_warnings(request).map(|(params, _)| params)
}

pub(crate) fn resolve_with_warnings(
    request: &LoanRequest,
) -> MortgageSimResult<(ResolvedLoanParameters, Vec<String>)> {
    let mut warnings = Vec::new();
    let convention = request.rate_convention;

    let (principal, annual_rate_percent, duration_months, monthly_payment, monthly_rate, solved_for) =
        match request.resolution()? {
            Resolution::Complete {
                principal,
                annual_rate_percent,
                duration_months,
                monthly_payment,
            } => {
                let r = convention.monthly_rate(annual_rate_percent)?;
                (principal, annual_rate_percent, duration_months, monthly_payment, r, None)
            }
            Resolution::MonthlyPayment {
                principal,
                annual_rate_percent,
                duration_months,
            } => {
                let r = convention.monthly_rate(annual_rate_percent)?;
                let payment = time_value::payment(principal, r, duration_months)?;
                (
                    principal,
                    annual_rate_percent,
                    duration_months,
                    payment,
                    r,
                    Some(LoanField::MonthlyPayment),
                )
            }
            Resolution::Principal {
                annual_rate_percent,
                duration_months,
                monthly_payment,
            } => {
                let r = convention.monthly_rate(annual_rate_percent)?;
                let principal = time_value::present_value(monthly_payment, r, duration_months)?;
                (
                    principal,
                    annual_rate_percent,
                    duration_months,
                    monthly_payment,
                    r,
                    Some(LoanField::Principal),
                )
            }
            Resolution::Duration {
                principal,
                annual_rate_percent,
                monthly_payment,
            } => {
                let r = convention.monthly_rate(annual_rate_percent)?;
                let months = solve_duration(principal, r, monthly_payment, &mut warnings)?;
                (
                    principal,
                    annual_rate_percent,
                    months,
                    monthly_payment,
                    r,
                    Some(LoanField::Duration),
                )
            }
            Resolution::AnnualRate {
                principal,
                duration_months,
                monthly_payment,
            } => {
                let r = solve_monthly_rate(principal, duration_months, monthly_payment)?;
                let annual = convention.annual_rate_percent(r)?;
                (
                    principal,
                    annual,
                    duration_months,
                    monthly_payment,
                    r,
                    Some(LoanField::AnnualRate),
                )
            }
        };

    if let Some(field) = solved_for {
        debug!(solved_for = %field, %principal, %annual_rate_percent, duration_months, %monthly_payment, "loan parameters resolved");
    }

    Ok((
        ResolvedLoanParameters {
            principal,
            annual_rate_percent,
            duration_months,
            monthly_payment,
            monthly_rate,
            insurance_annual_rate_percent: request.insurance_annual_rate_percent,
            rate_type: request.rate_type,
            rate_convention: convention,
            solved_for,
        },
        warnings,
    ))
}

// ---------------------------------------------------------------------------
// Solvers
// ---------------------------------------------------------------------------

/// Whole months for `payment` to amortise `principal`, nearest month with
/// ties rounded up.
fn solve_duration(
    principal: Money,
    monthly_rate: Rate,
    payment: Money,
    warnings: &mut Vec<String>,
) -> MortgageSimResult<Months> {
    let raw = time_value::periods_to_amortise(principal, monthly_rate, payment)?;
    let rounded = raw
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .max(Decimal::ONE);

    let months = rounded
        .to_u32()
        .filter(|m| *m <= MAX_DURATION_MONTHS)
        .ok_or_else(|| {
            MortgageSimError::InvalidPayment(format!(
                "payment needs {} months to amortize the loan, beyond the {MAX_DURATION_MONTHS} month maximum",
                raw.round_dp(2)
            ))
        })?;

    if rounded != raw {
        warnings.push(format!(
            "Solved duration of {} months rounded to {months}; the final instalment absorbs the difference",
            raw.round_dp(2)
        ));
    }
    Ok(months)
}

/// Monthly rate at which `principal` over `periods` costs `payment`.
///
/// Bisection over [0, RATE_UPPER_BOUND]; the residual
/// f(r) = P*r / (1 - (1+r)^-n) - M is increasing in r.
pub(crate) fn solve_monthly_rate(
    principal: Money,
    periods: Months,
    payment: Money,
) -> MortgageSimResult<Rate> {
    let residual = |r: Rate| -> MortgageSimResult<Decimal> {
        Ok(time_value::payment(principal, r, periods)? - payment)
    };

    let f_lo = residual(Decimal::ZERO)?;
    if f_lo.abs() < RATE_TOLERANCE {
        return Ok(Decimal::ZERO);
    }
    if f_lo > Decimal::ZERO {
        return Err(MortgageSimError::NonConvergentRate {
            reason: "payment is below principal / duration, no non-negative rate reaches it".into(),
            iterations: 0,
            last_delta: f_lo,
        });
    }

    let f_hi = residual(RATE_UPPER_BOUND)?;
    if f_hi < Decimal::ZERO {
        return Err(MortgageSimError::NonConvergentRate {
            reason: "payment exceeds what any rate up to 100% per month requires".into(),
            iterations: 0,
            last_delta: f_hi.abs(),
        });
    }

    let mut lo = Decimal::ZERO;
    let mut hi = RATE_UPPER_BOUND;
    let mut last_delta = f_lo.abs();

    for iter in 0..RATE_MAX_ITERATIONS {
        let mid = (lo + hi) / dec!(2);
        let f_mid = residual(mid)?;
        last_delta = f_mid.abs();

        if last_delta < RATE_TOLERANCE {
            debug!(iterations = iter + 1, monthly_rate = %mid, "rate solver converged");
            return Ok(mid);
        }

        if f_mid > Decimal::ZERO {
            hi = mid;
        } else {
            lo = mid;
        }
    }

    Err(MortgageSimError::NonConvergentRate {
        reason: "iteration cap exhausted".into(),
        iterations: RATE_MAX_ITERATIONS,
        last_delta,
    })
}
