use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_sim_core::loan::request::{LoanRequest, RateType};
use mortgage_sim_core::loan::simulation;
use mortgage_sim_core::time_value::RateConvention;

use crate::input;

/// Arguments for a loan simulation. Leave exactly one of principal, rate,
/// months and payment out to have it solved.
#[derive(Args)]
pub struct SimulateArgs {
    /// Path to JSON request file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long, alias = "montant")]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (3.5 = 3.5%)
    #[arg(long, alias = "taux")]
    pub rate: Option<Decimal>,

    /// Duration in months
    #[arg(long, alias = "duree")]
    pub months: Option<u32>,

    /// Monthly payment excluding insurance
    #[arg(long, alias = "mensualite")]
    pub payment: Option<Decimal>,

    /// Annual borrower insurance rate in percent, on the original principal
    #[arg(long, default_value = "0.36")]
    pub insurance: Decimal,

    /// Tag the rate as variable (projected as fixed)
    #[arg(long)]
    pub variable: bool,

    /// Convert the annual rate with the actuarial (compound) convention
    #[arg(long)]
    pub actuarial: bool,

    /// Omit the month-by-month schedule
    #[arg(long)]
    pub summary_only: bool,
}

pub fn run_simulate(args: SimulateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: LoanRequest = match input::read_request(args.input.as_deref())? {
        Some(request) => request,
        None => LoanRequest {
            principal: args.principal,
            annual_rate_percent: args.rate,
            duration_months: args.months,
            monthly_payment: args.payment,
            insurance_annual_rate_percent: args.insurance,
            rate_type: if args.variable {
                RateType::Variable
            } else {
                RateType::Fixed
            },
            rate_convention: if args.actuarial {
                RateConvention::Actuarial
            } else {
                RateConvention::Nominal
            },
        }
    };

    let result = simulation::simulate(&request)?;
    let mut value = serde_json::to_value(result)?;

    if args.summary_only {
        if let Some(Value::Object(res)) = value.get_mut("result") {
            res.remove("schedule");
        }
    }

    Ok(value)
}
