use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::MortgageSimError;
use crate::loan::request::MAX_DURATION_MONTHS;
use crate::loan::resolver::ResolvedLoanParameters;
use crate::types::{round_money, too_large, Money, Months, Rate, MAX_INSURANCE_RATE_PERCENT};
use crate::MortgageSimResult;

/// One month of the amortisation table. Money fields are in cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub month: Months,
    /// Total instalment: principal + interest + insurance.
    pub monthly_payment: Money,
    pub interest: Money,
    pub insurance: Money,
    pub principal: Money,
    pub remaining_balance: Money,
}

/// Flat monthly insurance premium on the original principal.
pub fn monthly_insurance(
    principal: Money,
    insurance_annual_rate_percent: Rate,
) -> MortgageSimResult<Money> {
    principal
        .checked_mul(insurance_annual_rate_percent)
        .and_then(|annual| annual.checked_div(Decimal::from(1200)))
        .map(round_money)
        .ok_or_else(|| too_large("insurance_annual_rate_percent"))
}

/// Build the month-by-month table for a resolved loan.
pub fn generate_schedule(params: &ResolvedLoanParameters) -> MortgageSimResult<Vec<ScheduleRow>> {
    let mut warnings = Vec::new();
    build_schedule(params, &mut warnings)
}

pub(crate) fn build_schedule(
    params: &ResolvedLoanParameters,
    warnings: &mut Vec<String>,
) -> MortgageSimResult<Vec<ScheduleRow>> {
    validate_parameters(params)?;

    let months = params.duration_months;
    let rate = params.monthly_rate;
    let insurance = monthly_insurance(params.principal, params.insurance_annual_rate_percent)?;

    let mut rows = Vec::with_capacity(months as usize);
    let mut balance = round_money(params.principal);
    let mut repaid_at: Option<Months> = None;

    for month in 1..=months {
        let interest = balance
            .checked_mul(rate)
            .map(round_money)
            .ok_or_else(|| too_large("monthly_rate"))?;

        let principal = if month == months {
            // Final instalment clears whatever rounding left behind
            balance
        } else {
            let scheduled = round_money(params.monthly_payment - interest);
            if scheduled < Decimal::ZERO {
                return Err(MortgageSimError::InvalidPayment(format!(
                    "month {month}: payment of {} does not cover interest of {interest}",
                    round_money(params.monthly_payment)
                )));
            }
            scheduled.min(balance)
        };

        balance -= principal;
        if balance.is_zero() && month < months && repaid_at.is_none() {
            repaid_at = Some(month);
        }

        let instalment = principal
            .checked_add(interest)
            .and_then(|total| total.checked_add(insurance))
            .ok_or_else(|| too_large("monthly_payment"))?;

        rows.push(ScheduleRow {
            month,
            monthly_payment: instalment,
            interest,
            insurance,
            principal,
            remaining_balance: balance,
        });
    }

    if let Some(month) = repaid_at {
        warnings.push(format!(
            "Loan is fully repaid at month {month} of {months}; later rows carry insurance only"
        ));
    }

    debug!(months, "schedule generated");
    Ok(rows)
}

fn validate_parameters(params: &ResolvedLoanParameters) -> MortgageSimResult<()> {
    if params.duration_months == 0 || params.duration_months > MAX_DURATION_MONTHS {
        return Err(MortgageSimError::invalid_input(
            "duration_months",
            format!("Duration must be between 1 and {MAX_DURATION_MONTHS} months"),
        ));
    }
    if params.principal <= Decimal::ZERO {
        return Err(MortgageSimError::invalid_input(
            "principal",
            "Principal must be positive",
        ));
    }
    if params.monthly_payment <= Decimal::ZERO {
        return Err(MortgageSimError::invalid_input(
            "monthly_payment",
            "Monthly payment must be positive",
        ));
    }
    if params.monthly_rate < Decimal::ZERO {
        return Err(MortgageSimError::invalid_input(
            "monthly_rate",
            "Monthly rate must be >= 0",
        ));
    }
    if params.insurance_annual_rate_percent < Decimal::ZERO
        || params.insurance_annual_rate_percent > MAX_INSURANCE_RATE_PERCENT
    {
        return Err(MortgageSimError::invalid_input(
            "insurance_annual_rate_percent",
            format!("Insurance rate must be between 0 and {MAX_INSURANCE_RATE_PERCENT}%"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::request::RateType;
    use crate::time_value::RateConvention;
    use rust_decimal_macros::dec;

    fn params(principal: Money, monthly_rate: Rate, months: Months, payment: Money) -> ResolvedLoanParameters {
        ResolvedLoanParameters {
            principal,
            annual_rate_percent: monthly_rate * dec!(1200),
            duration_months: months,
            monthly_payment: payment,
            monthly_rate,
            insurance_annual_rate_percent: dec!(0.36),
            rate_type: RateType::Fixed,
            rate_convention: RateConvention::Nominal,
            solved_for: None,
        }
    }

    #[test]
    fn test_first_row() {
        let p = params(dec!(200000), dec!(0.003), 240, dec!(1170.2229336940593));
        let rows = generate_schedule(&p).unwrap();
        assert_eq!(rows.len(), 240);

        let first = &rows[0];
        assert_eq!(first.month, 1);
        assert_eq!(first.interest, dec!(600.00));
        assert_eq!(first.insurance, dec!(60.00));
        assert_eq!(first.principal, dec!(570.22));
        assert_eq!(first.monthly_payment, dec!(1230.22));
        assert_eq!(first.remaining_balance, dec!(199429.78));
    }

    #[test]
    fn test_last_row_clears_balance() {
        let p = params(dec!(200000), dec!(0.003), 240, dec!(1170.2229336940593));
        let rows = generate_schedule(&p).unwrap();
        let last = rows.last().unwrap();
        assert_eq!(last.month, 240);
        assert_eq!(last.remaining_balance, Decimal::ZERO);

        let repaid: Decimal = rows.iter().map(|r| r.principal).sum();
        assert_eq!(repaid, dec!(200000));
    }

    #[test]
    fn test_payment_below_interest_fails() {
        let p = params(dec!(100000), dec!(0.01), 12, dec!(900));
        let err = generate_schedule(&p).unwrap_err();
        assert!(matches!(err, MortgageSimError::InvalidPayment(_)));
    }

    #[test]
    fn test_oversized_payment_repays_early() {
        let p = params(dec!(1000), Decimal::ZERO, 12, dec!(500));
        let mut warnings = Vec::new();
        let rows = build_schedule(&p, &mut warnings).unwrap();
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[1].remaining_balance, Decimal::ZERO);
        assert_eq!(rows[5].principal, Decimal::ZERO);
        assert_eq!(rows[5].monthly_payment, rows[5].insurance);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_zero_duration_rejected() {
        let p = params(dec!(1000), dec!(0.003), 0, dec!(100));
        assert!(generate_schedule(&p).is_err());
    }

    #[test]
    fn test_duration_beyond_cap_rejected() {
        let p = params(dec!(1000), dec!(0.003), u32::MAX, dec!(100));
        let err = generate_schedule(&p).unwrap_err();
        assert!(matches!(err, MortgageSimError::InvalidInput { ref field, .. } if field == "duration_months"));

        let p = params(dec!(1000), dec!(0.003), MAX_DURATION_MONTHS + 1, dec!(100));
        assert!(generate_schedule(&p).is_err());
    }

    #[test]
    fn test_insurance_rate_capped() {
        let mut p = params(dec!(200000), dec!(0.003), 240, dec!(1170.2229336940593));
        p.insurance_annual_rate_percent = dec!(1000000000000000000000000000);
        let err = generate_schedule(&p).unwrap_err();
        assert!(matches!(err, MortgageSimError::InvalidInput { .. }));
    }

    #[test]
    fn test_monthly_insurance_overflow_is_an_error() {
        let err = monthly_insurance(dec!(70000000000000000000000000000), dec!(100)).unwrap_err();
        assert!(matches!(err, MortgageSimError::InvalidInput { .. }));
        assert_eq!(monthly_insurance(dec!(200000), dec!(0.36)).unwrap(), dec!(60.00));
    }
}
