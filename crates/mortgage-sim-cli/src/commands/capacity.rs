use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_sim_core::capacity::borrowing::{self, CapacityRequest};
use mortgage_sim_core::time_value::RateConvention;

use crate::input;

/// Arguments for borrowing capacity
#[derive(Args)]
pub struct CapacityArgs {
    /// Path to JSON request file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Maximum affordable monthly payment, insurance included
    #[arg(long, alias = "mensualite-max")]
    pub max_payment: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long, alias = "taux")]
    pub rate: Option<Decimal>,

    /// Duration in years
    #[arg(long, alias = "duree-ans")]
    pub years: Option<u32>,

    /// Annual borrower insurance rate in percent
    #[arg(long, default_value = "0.36")]
    pub insurance: Decimal,

    /// Convert the annual rate with the actuarial (compound) convention
    #[arg(long)]
    pub actuarial: bool,
}

pub fn run_capacity(args: CapacityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: CapacityRequest = match input::read_request(args.input.as_deref())? {
        Some(request) => request,
        None => CapacityRequest {
            max_monthly_payment: args
                .max_payment
                .ok_or("--max-payment is required (or provide --input)")?,
            annual_rate_percent: args.rate.ok_or("--rate is required (or provide --input)")?,
            duration_years: args.years.ok_or("--years is required (or provide --input)")?,
            insurance_annual_rate_percent: args.insurance,
            rate_convention: if args.actuarial {
                RateConvention::Actuarial
            } else {
                RateConvention::Nominal
            },
        }
    };

    let result = borrowing::calculate_capacity(&request)?;
    Ok(serde_json::to_value(result)?)
}
