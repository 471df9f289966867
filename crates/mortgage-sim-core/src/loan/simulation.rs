use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::loan::request::{LoanRequest, RateType};
use crate::loan::resolver::resolve_with_warnings;
use crate::loan::schedule::{build_schedule, ScheduleRow};
use crate::loan::summary::{summarize, LoanSummary};
use crate::types::{with_metadata, ComputationOutput};
use crate::MortgageSimResult;

/// Summary and full amortisation table for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub summary: LoanSummary,
    pub schedule: Vec<ScheduleRow>,
}

/// Resolve the missing parameter, amortise, and total the result.
pub fn simulate(request: &LoanRequest) -> MortgageSimResult<ComputationOutput<SimulationOutput>> {
    let start = Instant::now();

    let (parameters, mut warnings) = resolve_with_warnings(request)?;
    if parameters.rate_type == RateType::Variable {
        warnings.push(
            "Variable rate type is informational only; the schedule is a fixed-rate projection".into(),
        );
    }

    let schedule = build_schedule(&parameters, &mut warnings)?;
    let summary = summarize(&parameters, &schedule)?;

    debug!(
        months = schedule.len(),
        total_interest = %summary.total_interest,
        total_credit_cost = %summary.total_credit_cost,
        "simulation complete"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Constant Annuity Amortisation with Flat Borrower Insurance",
        &serde_json::json!({
            "solved_for": parameters.solved_for,
            "rate_convention": parameters.rate_convention,
            "monthly_rate": parameters.monthly_rate.to_string(),
            "insurance_basis": "original principal",
            "rounding": "cents, row by row; final row absorbs residual",
        }),
        warnings,
        elapsed,
        SimulationOutput { summary, schedule },
    ))
}
