pub mod calculer;
pub mod capacite_emprunt;
pub mod version;

use std::time::Duration;

use actix_web::{rt::time::timeout, web};
use mortgage_sim_core::{
    time_value::RateConvention, MortgageSimError, MortgageSimResult,
};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;

use crate::error::Error;

/// Run an engine call on the blocking pool, bounded by `timeout_ms`.
async fn compute<T, F>(timeout_ms: u64, job: F) -> Result<T, Error>
where
    F: FnOnce() -> MortgageSimResult<T> + Send + 'static,
    T: Send + 'static,
{
    let finished = timeout(Duration::from_millis(timeout_ms), web::block(job))
        .await
        .map_err(|_| Error::Timeout(timeout_ms))?;
    Ok(finished??)
}

/// Rate convention as accepted on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConventionTaux {
    #[default]
    Nominal,
    #[serde(alias = "actuarial")]
    Actuariel,
}

impl From<ConventionTaux> for RateConvention {
    fn from(value: ConventionTaux) -> Self {
        match value {
            ConventionTaux::Nominal => RateConvention::Nominal,
            ConventionTaux::Actuariel => RateConvention::Actuarial,
        }
    }
}

/// Zero, negative and null amounts all mean "solve for this".
fn positive_or_absent(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| *v > Decimal::ZERO)
}

fn months_or_absent(
    field: &str,
    value: Option<i64>,
) -> Result<Option<u32>, MortgageSimError> {
    match value.filter(|v| *v > 0) {
        Some(months) => u32::try_from(months).map(Some).map_err(|_| {
            MortgageSimError::InvalidInput {
                field: field.to_owned(),
                reason: format!("{months} is out of range"),
            }
        }),
        None => Ok(None),
    }
}

fn round_dp(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[actix_web::test]
    async fn test_compute_returns_engine_result() {
        let value = compute(1000, || Ok(dec!(42))).await.unwrap();
        assert_eq!(value, dec!(42));

        let err = compute::<Decimal, _>(1000, || {
            Err(MortgageSimError::InvalidPayment(String::from("too low")))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Engine(MortgageSimError::InvalidPayment(_))));
    }

    #[actix_web::test]
    async fn test_compute_times_out() {
        let err = compute(10, || {
            std::thread::sleep(Duration::from_millis(300));
            Ok(())
        })
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Timeout(10)));
    }

    #[test]
    fn test_positive_or_absent() {
        assert_eq!(positive_or_absent(Some(dec!(0))), None);
        assert_eq!(positive_or_absent(Some(dec!(-5))), None);
        assert_eq!(positive_or_absent(None), None);
        assert_eq!(positive_or_absent(Some(dec!(12.5))), Some(dec!(12.5)));
    }

    #[test]
    fn test_months_or_absent() {
        assert_eq!(months_or_absent("duree_mois", Some(0)).unwrap(), None);
        assert_eq!(months_or_absent("duree_mois", Some(240)).unwrap(), Some(240));
        assert!(months_or_absent("duree_mois", Some(i64::MAX)).is_err());
    }
}
