use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::MortgageSimError;
use crate::types::{too_large, Money, Months, Rate};
use crate::MortgageSimResult;

/// Annual percentage to monthly decimal under the nominal convention.
const NOMINAL_DIVISOR: Decimal = dec!(1200);

/// How an annual percentage rate maps to the monthly rate used for
/// amortisation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateConvention {
    /// r = annual / 12 (proportional rate)
    #[default]
    Nominal,
    /// r = (1 + annual)^(1/12) - 1 (equivalent compound rate)
    #[serde(alias = "actuariel")]
    Actuarial,
}

impl RateConvention {
    /// Monthly decimal rate for an annual percentage (3.6 -> 0.003 nominal).
    pub fn monthly_rate(self, annual_rate_percent: Rate) -> MortgageSimResult<Rate> {
        if annual_rate_percent < Decimal::ZERO {
            return Err(MortgageSimError::invalid_input(
                "annual_rate_percent",
                "Annual rate must be >= 0",
            ));
        }
        if annual_rate_percent.is_zero() {
            return Ok(Decimal::ZERO);
        }

        match self {
            RateConvention::Nominal => Ok(annual_rate_percent / NOMINAL_DIVISOR),
            RateConvention::Actuarial => {
                let annual = annual_rate_percent / dec!(100);
                let factor = (Decimal::ONE + annual)
                    .checked_powd(Decimal::ONE / dec!(12))
                    .ok_or_else(|| {
                        MortgageSimError::invalid_input(
                            "annual_rate_percent",
                            "Annual rate too large for actuarial conversion",
                        )
                    })?;
                Ok(factor - Decimal::ONE)
            }
        }
    }

    /// Inverse of [`RateConvention::monthly_rate`].
    pub fn annual_rate_percent(self, monthly_rate: Rate) -> MortgageSimResult<Rate> {
        match self {
            RateConvention::Nominal => Ok(monthly_rate * NOMINAL_DIVISOR),
            RateConvention::Actuarial => {
                let factor = (Decimal::ONE + monthly_rate).checked_powi(12).ok_or_else(|| {
                    MortgageSimError::invalid_input(
                        "monthly_rate",
                        "Monthly rate too large for actuarial conversion",
                    )
                })?;
                Ok((factor - Decimal::ONE) * dec!(100))
            }
        }
    }
}

/// (1 + r)^n, or `None` when the factor exceeds Decimal range.
pub fn growth_factor(monthly_rate: Rate, periods: Months) -> Option<Decimal> {
    (Decimal::ONE + monthly_rate).checked_powi(i64::from(periods))
}

/// Level payment per unit of principal: r / (1 - (1+r)^-n), or 1/n at r = 0.
pub fn annuity_factor(monthly_rate: Rate, periods: Months) -> MortgageSimResult<Rate> {
    if periods == 0 {
        return Err(MortgageSimError::invalid_input(
            "periods",
            "Number of periods must be > 0",
        ));
    }
    if monthly_rate < Decimal::ZERO {
        return Err(MortgageSimError::invalid_input(
            "monthly_rate",
            "Monthly rate must be >= 0",
        ));
    }

    let n = Decimal::from(periods);
    if monthly_rate.is_zero() {
        return Ok(Decimal::ONE / n);
    }

    match growth_factor(monthly_rate, periods) {
        Some(g) => {
            let excess = g - Decimal::ONE;
            if excess.is_zero() {
                // Rate below Decimal resolution
                Ok(Decimal::ONE / n)
            } else {
                // r*g past Decimal range means g is huge and the factor is r
                Ok(monthly_rate
                    .checked_mul(g)
                    .and_then(|scaled| scaled.checked_div(excess))
                    .unwrap_or(monthly_rate))
            }
        }
        // (1+r)^-n underflows to zero
        None => Ok(monthly_rate),
    }
}

/// Level monthly payment amortising `principal` over `periods`.
pub fn payment(principal: Money, monthly_rate: Rate, periods: Months) -> MortgageSimResult<Money> {
    principal
        .checked_mul(annuity_factor(monthly_rate, periods)?)
        .ok_or_else(|| too_large("monthly_payment"))
}

/// Principal that a level `payment` amortises over `periods`.
pub fn present_value(payment: Money, monthly_rate: Rate, periods: Months) -> MortgageSimResult<Money> {
    let factor = annuity_factor(monthly_rate, periods)?;
    if factor.is_zero() {
        return Err(MortgageSimError::invalid_input(
            "periods",
            "Annuity factor is zero",
        ));
    }
    payment
        .checked_div(factor)
        .ok_or_else(|| too_large("principal"))
}

/// Fractional number of periods for `payment` to amortise `principal`:
/// n = -ln(1 - P*r/M) / ln(1 + r), or P/M at r = 0.
pub fn periods_to_amortise(
    principal: Money,
    monthly_rate: Rate,
    payment: Money,
) -> MortgageSimResult<Decimal> {
    if payment <= Decimal::ZERO {
        return Err(MortgageSimError::invalid_input(
            "monthly_payment",
            "Monthly payment must be positive",
        ));
    }
    if monthly_rate.is_zero() {
        return principal
            .checked_div(payment)
            .ok_or_else(|| too_large("duration_months"));
    }

    let first_interest = principal
        .checked_mul(monthly_rate)
        .ok_or_else(|| too_large("principal"))?;
    if payment <= first_interest {
        return Err(MortgageSimError::InvalidPayment(format!(
            "payment too low to amortize: {payment} does not exceed the first month's interest of {}",
            first_interest.round_dp(2)
        )));
    }

    let argument = Decimal::ONE - first_interest / payment;
    let numerator = argument.checked_ln().ok_or_else(|| {
        MortgageSimError::InvalidPayment("payment too low to amortize".into())
    })?;
    let denominator = (Decimal::ONE + monthly_rate).checked_ln().ok_or_else(|| {
        MortgageSimError::invalid_input("monthly_rate", "Logarithm of growth rate undefined")
    })?;
    if denominator.is_zero() {
        return principal
            .checked_div(payment)
            .ok_or_else(|| too_large("duration_months"));
    }

    (-numerator)
        .checked_div(denominator)
        .ok_or_else(|| too_large("duration_months"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_annuity_factor_zero_rate() {
        assert_eq!(annuity_factor(Decimal::ZERO, 240).unwrap(), Decimal::ONE / dec!(240));
    }

    #[test]
    fn test_payment_basic() {
        // 200k at 0.3%/month over 240 months ≈ 1170.22
        let result = payment(dec!(200000), dec!(0.003), 240).unwrap();
        assert!((result - dec!(1170.2229)).abs() < dec!(0.001));
    }

    #[test]
    fn test_present_value_inverts_payment() {
        let m = payment(dec!(150000), dec!(0.0025), 300).unwrap();
        let p = present_value(m, dec!(0.0025), 300).unwrap();
        assert!((p - dec!(150000)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_zero_periods_rejected() {
        assert!(annuity_factor(dec!(0.003), 0).is_err());
    }

    #[test]
    fn test_periods_to_amortise() {
        // 100k at 4%/yr, 1200/month ≈ 97.79 months
        let r = dec!(4) / dec!(1200);
        let n = periods_to_amortise(dec!(100000), r, dec!(1200)).unwrap();
        assert!((n - dec!(97.789)).abs() < dec!(0.01));
    }

    #[test]
    fn test_periods_to_amortise_payment_below_interest() {
        let r = dec!(4) / dec!(1200);
        let err = periods_to_amortise(dec!(100000), r, dec!(300)).unwrap_err();
        assert!(matches!(err, MortgageSimError::InvalidPayment(_)));
    }

    #[test]
    fn test_nominal_round_trip() {
        let r = RateConvention::Nominal.monthly_rate(dec!(3.6)).unwrap();
        assert_eq!(r, dec!(0.003));
        assert_eq!(RateConvention::Nominal.annual_rate_percent(r).unwrap(), dec!(3.6));
    }

    #[test]
    fn test_actuarial_rate_below_nominal() {
        let nominal = RateConvention::Nominal.monthly_rate(dec!(3.5)).unwrap();
        let actuarial = RateConvention::Actuarial.monthly_rate(dec!(3.5)).unwrap();
        assert!(actuarial < nominal);
        let back = RateConvention::Actuarial.annual_rate_percent(actuarial).unwrap();
        assert!((back - dec!(3.5)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_negative_annual_rate_rejected() {
        assert!(RateConvention::Nominal.monthly_rate(dec!(-1)).is_err());
    }
}
