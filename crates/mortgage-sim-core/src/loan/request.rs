use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::MortgageSimError;
use crate::time_value::RateConvention;
use crate::types::{
    default_insurance_rate, Money, Months, Rate, DEFAULT_INSURANCE_RATE_PERCENT,
    MAX_INSURANCE_RATE_PERCENT,
};
use crate::MortgageSimResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Longest loan accepted or produced (50 years).
pub const MAX_DURATION_MONTHS: Months = 600;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Rate type tag carried with the request. Variable rates are never
/// repriced; the schedule is a fixed-rate projection either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateType {
    #[default]
    #[serde(alias = "fixe")]
    Fixed,
    Variable,
}

/// The four loan parameters, any one of which can be solved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanField {
    Principal,
    AnnualRate,
    Duration,
    MonthlyPayment,
}

impl LoanField {
    pub fn name(self) -> &'static str {
        match self {
            LoanField::Principal => "principal",
            LoanField::AnnualRate => "annual_rate_percent",
            LoanField::Duration => "duration_months",
            LoanField::MonthlyPayment => "monthly_payment",
        }
    }
}

impl fmt::Display for LoanField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A partially specified loan. At most one of the four optional fields may
/// be absent; the resolver derives it from the other three.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<Money>,
    /// Annual rate in percent (3.5 = 3.5%).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_rate_percent: Option<Rate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_months: Option<Months>,
    /// Level payment excluding insurance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_payment: Option<Money>,
    /// Annual insurance rate in percent, applied to the original principal.
    #[serde(default = "default_insurance_rate")]
    pub insurance_annual_rate_percent: Rate,
    #[serde(default)]
    pub rate_type: RateType,
    #[serde(default)]
    pub rate_convention: RateConvention,
}

impl Default for LoanRequest {
    fn default() -> Self {
        LoanRequest {
            principal: None,
            annual_rate_percent: None,
            duration_months: None,
            monthly_payment: None,
            insurance_annual_rate_percent: DEFAULT_INSURANCE_RATE_PERCENT,
            rate_type: RateType::Fixed,
            rate_convention: RateConvention::Nominal,
        }
    }
}

/// Which branch of the resolver applies, with the values it needs.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Resolution {
    Complete {
        principal: Money,
        annual_rate_percent: Rate,
        duration_months: Months,
        monthly_payment: Money,
    },
    MonthlyPayment {
        principal: Money,
        annual_rate_percent: Rate,
        duration_months: Months,
    },
    Principal {
        annual_rate_percent: Rate,
        duration_months: Months,
        monthly_payment: Money,
    },
    Duration {
        principal: Money,
        annual_rate_percent: Rate,
        monthly_payment: Money,
    },
    AnnualRate {
        principal: Money,
        duration_months: Months,
        monthly_payment: Money,
    },
}

impl LoanRequest {
    /// Loan fields left for the resolver, in declaration order.
    pub fn missing_fields(&self) -> Vec<LoanField> {
        let mut missing = Vec::new();
        if self.principal.is_none() {
            missing.push(LoanField::Principal);
        }
        if self.annual_rate_percent.is_none() {
            missing.push(LoanField::AnnualRate);
        }
        if self.duration_months.is_none() {
            missing.push(LoanField::Duration);
        }
        if self.monthly_payment.is_none() {
            missing.push(LoanField::MonthlyPayment);
        }
        missing
    }

    /// Check value domains and pick the resolution branch.
    pub(crate) fn resolution(&self) -> MortgageSimResult<Resolution> {
        self.validate_present_values()?;

        match (
            self.principal,
            self.annual_rate_percent,
            self.duration_months,
            self.monthly_payment,
        ) {
            (Some(principal), Some(annual_rate_percent), Some(duration_months), Some(monthly_payment)) => {
                Ok(Resolution::Complete {
                    principal,
                    annual_rate_percent,
                    duration_months,
                    monthly_payment,
                })
            }
            (Some(principal), Some(annual_rate_percent), Some(duration_months), None) => {
                Ok(Resolution::MonthlyPayment {
                    principal,
                    annual_rate_percent,
                    duration_months,
                })
            }
            (None, Some(annual_rate_percent), Some(duration_months), Some(monthly_payment)) => {
                Ok(Resolution::Principal {
                    annual_rate_percent,
                    duration_months,
                    monthly_payment,
                })
            }
            (Some(principal), Some(annual_rate_percent), None, Some(monthly_payment)) => {
                Ok(Resolution::Duration {
                    principal,
                    annual_rate_percent,
                    monthly_payment,
                })
            }
            (Some(principal), None, Some(duration_months), Some(monthly_payment)) => {
                Ok(Resolution::AnnualRate {
                    principal,
                    duration_months,
                    monthly_payment,
                })
            }
            _ => {
                let missing: Vec<&str> = self.missing_fields().into_iter().map(LoanField::name).collect();
                Err(MortgageSimError::InsufficientInput {
                    missing: missing.join(", "),
                })
            }
        }
    }

    fn validate_present_values(&self) -> MortgageSimResult<()> {
        if let Some(principal) = self.principal {
            if principal <= Decimal::ZERO {
                return Err(MortgageSimError::invalid_input(
                    "principal",
                    "Principal must be positive",
                ));
            }
        }
        if let Some(rate) = self.annual_rate_percent {
            if rate < Decimal::ZERO {
                return Err(MortgageSimError::invalid_input(
                    "annual_rate_percent",
                    "Annual rate must be >= 0",
                ));
            }
        }
        if let Some(months) = self.duration_months {
            if months == 0 || months > MAX_DURATION_MONTHS {
                return Err(MortgageSimError::invalid_input(
                    "duration_months",
                    format!("Duration must be between 1 and {MAX_DURATION_MONTHS} months"),
                ));
            }
        }
        if let Some(payment) = self.monthly_payment {
            if payment <= Decimal::ZERO {
                return Err(MortgageSimError::invalid_input(
                    "monthly_payment",
                    "Monthly payment must be positive",
                ));
            }
        }
        if self.insurance_annual_rate_percent < Decimal::ZERO
            || self.insurance_annual_rate_percent > MAX_INSURANCE_RATE_PERCENT
        {
            return Err(MortgageSimError::invalid_input(
                "insurance_annual_rate_percent",
                format!("Insurance rate must be between 0 and {MAX_INSURANCE_RATE_PERCENT}%"),
            ));
        }
        Ok(())
    }
}
