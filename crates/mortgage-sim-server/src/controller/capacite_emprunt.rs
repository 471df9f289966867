use actix_web::{post, web, Responder};
use mortgage_sim_core::{
    capacity::borrowing::{calculate_capacity, CapacityRequest, CapacityResult},
    MortgageSimError,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{compute, ConventionTaux};
use crate::{
    configuration::{AppState, State},
    error::Error,
};

#[post("/capacite-emprunt")]
async fn index(
    state: web::Data<AppState<State>>,
    data: web::Json<Payload>,
) -> Result<impl Responder, Error> {
    let request = data
        .into_inner()
        .into_request(state.config.default_insurance_rate)?;
    let output = compute(state.config.request_timeout_ms, move || {
        calculate_capacity(&request)
    })
    .await?;

    info!(
        months = output.result.duration_months,
        capital = %output.result.max_borrowable_principal,
        "borrowing capacity computed"
    );

    Ok(web::Json(Response::from(output.result)))
}

#[derive(Debug, Deserialize)]
pub struct Payload {
    #[serde(with = "rust_decimal::serde::float")]
    pub mensualite_max: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub taux_annuel: Decimal,
    pub duree_ans: i64,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub taux_assurance: Option<Decimal>,
    #[serde(default)]
    pub convention_taux: ConventionTaux,
}

impl Payload {
    pub fn into_request(
        self,
        default_insurance_rate: Decimal,
    ) -> Result<CapacityRequest, Error> {
        let duration_years = u32::try_from(self.duree_ans).map_err(|_| {
            MortgageSimError::InvalidInput {
                field: String::from("duree_ans"),
                reason: format!("{} is not a valid number of years", self.duree_ans),
            }
        })?;

        Ok(CapacityRequest {
            max_monthly_payment: self.mensualite_max,
            annual_rate_percent: self.taux_annuel,
            duration_years,
            insurance_annual_rate_percent: self
                .taux_assurance
                .unwrap_or(default_insurance_rate),
            rate_convention: self.convention_taux.into(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct Response {
    #[serde(with = "rust_decimal::serde::float")]
    pub capital_empruntable: Decimal,
    pub duree_mois: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub assurance_mensuelle: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub mensualite_hors_assurance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub cout_total: Decimal,
}

impl From<CapacityResult> for Response {
    fn from(result: CapacityResult) -> Self {
        Response {
            capital_empruntable: result.max_borrowable_principal,
            duree_mois: result.duration_months,
            assurance_mensuelle: result.monthly_insurance,
            mensualite_hors_assurance: result.amortising_payment,
            cout_total: result.total_repaid,
        }
    }
}
