use actix_web::{post, web, Responder};
use mortgage_sim_core::{
    loan::{
        request::{LoanRequest, RateType},
        schedule::ScheduleRow,
        simulation::{simulate, SimulationOutput},
    },
    round_money, ComputationOutput,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{
    compute, months_or_absent, positive_or_absent, round_dp, ConventionTaux,
};
use crate::{
    configuration::{AppState, State},
    error::Error,
};

#[post("/calculer")]
async fn index(
    state: web::Data<AppState<State>>,
    data: web::Json<Payload>,
) -> Result<impl Responder, Error> {
    let request = data
        .into_inner()
        .into_request(state.config.default_insurance_rate)?;
    let output =
        compute(state.config.request_timeout_ms, move || simulate(&request))
            .await?;
    let id = state.next_simulation_id();

    info!(
        id,
        solved_for = ?output.result.summary.parameters.solved_for,
        months = output.result.schedule.len(),
        "simulation computed"
    );

    Ok(web::Json(Response::new(id, output)))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTaux {
    #[default]
    Fixe,
    Variable,
}

#[derive(Debug, Deserialize)]
pub struct Payload {
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub montant: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub taux_annuel: Option<Decimal>,
    #[serde(default)]
    pub duree_mois: Option<i64>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub mensualite: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub taux_assurance: Option<Decimal>,
    #[serde(default)]
    pub type_taux: TypeTaux,
    #[serde(default)]
    pub convention_taux: ConventionTaux,
    /// Free-form borrower details; accepted and ignored.
    #[serde(default)]
    pub client: Option<serde_json::Value>,
}

impl Payload {
    pub fn into_request(
        self,
        default_insurance_rate: Decimal,
    ) -> Result<LoanRequest, Error> {
        Ok(LoanRequest {
            principal: positive_or_absent(self.montant),
            annual_rate_percent: self.taux_annuel,
            duration_months: months_or_absent("duree_mois", self.duree_mois)?,
            monthly_payment: positive_or_absent(self.mensualite),
            insurance_annual_rate_percent: self
                .taux_assurance
                .unwrap_or(default_insurance_rate),
            rate_type: match self.type_taux {
                TypeTaux::Fixe => RateType::Fixed,
                TypeTaux::Variable => RateType::Variable,
            },
            rate_convention: self.convention_taux.into(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct Response {
    pub id: i64,
    pub params_finaux: ParamsFinaux,
    pub echeancier: Vec<Echeance>,
    pub avertissements: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ParamsFinaux {
    #[serde(with = "rust_decimal::serde::float")]
    pub montant: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub taux_annuel: Decimal,
    pub duree_mois: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub mensualite: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub assurance_mensuelle: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_interets: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_assurance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub cout_total_credit: Decimal,
}

#[derive(Debug, Serialize)]
pub struct Echeance {
    pub mois: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub mensualite: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub interet: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub assurance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub capital: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub solde: Decimal,
}

impl From<&ScheduleRow> for Echeance {
    fn from(row: &ScheduleRow) -> Self {
        Echeance {
            mois: row.month,
            mensualite: row.monthly_payment,
            interet: row.interest,
            assurance: row.insurance,
            capital: row.principal,
            solde: row.remaining_balance,
        }
    }
}

impl Response {
    pub fn new(id: i64, output: ComputationOutput<SimulationOutput>) -> Self {
        let SimulationOutput { summary, schedule } = output.result;
        let parameters = &summary.parameters;

        Response {
            id,
            params_finaux: ParamsFinaux {
                montant: round_money(parameters.principal),
                taux_annuel: round_dp(parameters.annual_rate_percent, 4),
                duree_mois: parameters.duration_months,
                mensualite: round_money(parameters.monthly_payment),
                assurance_mensuelle: summary.monthly_insurance,
                total_interets: summary.total_interest,
                total_assurance: summary.total_insurance,
                cout_total_credit: summary.total_credit_cost,
            },
            echeancier: schedule.iter().map(Echeance::from).collect(),
            avertissements: output.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mortgage_sim_core::time_value::RateConvention;
    use rust_decimal_macros::dec;

    fn payload(body: &str) -> Payload {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_payload_treats_zero_and_null_as_absent() {
        let request = payload(
            r#"{"montant": 200000, "taux_annuel": 3.6, "duree_mois": 0, "mensualite": null}"#,
        )
        .into_request(dec!(0.36))
        .unwrap();

        assert_eq!(request.principal, Some(dec!(200000)));
        assert_eq!(request.annual_rate_percent, Some(dec!(3.6)));
        assert_eq!(request.duration_months, None);
        assert_eq!(request.monthly_payment, None);
    }

    #[test]
    fn test_payload_defaults() {
        let request = payload(r#"{"montant": 1000, "client": {"nom": "Durand"}}"#)
            .into_request(dec!(0.25))
            .unwrap();

        assert_eq!(request.insurance_annual_rate_percent, dec!(0.25));
        assert_eq!(request.rate_type, RateType::Fixed);
        assert_eq!(request.rate_convention, RateConvention::Nominal);
    }

    #[test]
    fn test_payload_rate_tags() {
        let request = payload(r#"{"type_taux": "variable", "convention_taux": "actuariel"}"#)
            .into_request(dec!(0.36))
            .unwrap();

        assert_eq!(request.rate_type, RateType::Variable);
        assert_eq!(request.rate_convention, RateConvention::Actuarial);
    }

    #[test]
    fn test_zero_rate_is_kept() {
        let request = payload(r#"{"taux_annuel": 0}"#)
            .into_request(dec!(0.36))
            .unwrap();
        assert_eq!(request.annual_rate_percent, Some(Decimal::ZERO));
    }
}
