use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::MortgageSimError;
use crate::loan::resolver::ResolvedLoanParameters;
use crate::loan::schedule::{monthly_insurance, ScheduleRow};
use crate::types::{round_money, too_large, Money};
use crate::MortgageSimResult;

/// Resolved loan plus the cost totals of its schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub parameters: ResolvedLoanParameters,
    pub monthly_insurance: Money,
    pub total_interest: Money,
    pub total_insurance: Money,
    /// principal + total_interest + total_insurance
    pub total_credit_cost: Money,
}

/// Reduce a schedule to its totals.
pub fn summarize(
    params: &ResolvedLoanParameters,
    schedule: &[ScheduleRow],
) -> MortgageSimResult<LoanSummary> {
    if schedule.is_empty() {
        return Err(MortgageSimError::invalid_input(
            "schedule",
            "Cannot summarise an empty schedule",
        ));
    }
    if schedule.len() != params.duration_months as usize {
        return Err(MortgageSimError::invalid_input(
            "schedule",
            format!(
                "Schedule has {} rows but the loan runs {} months",
                schedule.len(),
                params.duration_months
            ),
        ));
    }

    let (total_interest, total_insurance) = schedule
        .iter()
        .try_fold((Decimal::ZERO, Decimal::ZERO), |(interest, insurance), row| {
            Some((
                interest.checked_add(row.interest)?,
                insurance.checked_add(row.insurance)?,
            ))
        })
        .ok_or_else(|| too_large("schedule"))?;

    let total_credit_cost = round_money(params.principal)
        .checked_add(total_interest)
        .and_then(|cost| cost.checked_add(total_insurance))
        .ok_or_else(|| too_large("principal"))?;

    Ok(LoanSummary {
        parameters: params.clone(),
        monthly_insurance: monthly_insurance(params.principal, params.insurance_annual_rate_percent)?,
        total_interest,
        total_insurance,
        total_credit_cost,
    })
}
