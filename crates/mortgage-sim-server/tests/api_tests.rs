use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};

use mortgage_sim_server::{
    configuration::{AppState, Config, State},
    server::{configure, json_config},
};

fn app_state() -> AppState<State> {
    AppState::new(State::new(Config::default()))
}

fn number(value: &Value) -> f64 {
    value.as_f64().unwrap_or(f64::NAN)
}

fn assert_close(value: &Value, expected: f64) {
    let actual = number(value);
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

macro_rules! init_app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .app_data(json_config(4096))
                .configure(configure),
        )
        .await
    };
}

// ===========================================================================
// /calculer
// ===========================================================================

#[actix_web::test]
async fn test_calculer_solves_payment() {
    let app = init_app!();
    let req = test::TestRequest::post()
        .uri("/calculer")
        .set_json(json!({
            "montant": 200000,
            "taux_annuel": 3.6,
            "duree_mois": 240,
            "mensualite": null,
            "taux_assurance": 0.36,
            "type_taux": "fixe"
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["id"], 1);
    let params = &body["params_finaux"];
    assert_close(&params["montant"], 200000.0);
    assert_close(&params["mensualite"], 1170.22);
    assert_close(&params["assurance_mensuelle"], 60.0);
    assert_close(&params["total_assurance"], 14400.0);
    assert_eq!(params["duree_mois"], 240);

    let rows = body["echeancier"].as_array().unwrap();
    assert_eq!(rows.len(), 240);
    assert_eq!(rows[0]["mois"], 1);
    assert_close(&rows[0]["interet"], 600.0);
    assert_close(&rows[0]["assurance"], 60.0);
    assert_close(&rows[0]["capital"], 570.22);
    assert_close(&rows[0]["mensualite"], 1230.22);
    assert_close(&rows[0]["solde"], 199429.78);
    assert_close(&rows[239]["solde"], 0.0);

    assert!(body["avertissements"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_calculer_zero_duration_means_solve() {
    let app = init_app!();
    let req = test::TestRequest::post()
        .uri("/calculer")
        .set_json(json!({
            "montant": 100000,
            "taux_annuel": 4,
            "duree_mois": 0,
            "mensualite": 1200,
            "taux_assurance": 0
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["params_finaux"]["duree_mois"], 98);
    assert_eq!(body["echeancier"].as_array().unwrap().len(), 98);
    assert!(!body["avertissements"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_calculer_default_insurance_rate() {
    let app = init_app!();
    let req = test::TestRequest::post()
        .uri("/calculer")
        .set_json(json!({
            "montant": 200000,
            "taux_annuel": 3.6,
            "duree_mois": 240
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_close(&body["params_finaux"]["assurance_mensuelle"], 60.0);
}

#[actix_web::test]
async fn test_calculer_ids_increase() {
    let app = init_app!();
    let payload = json!({
        "montant": 50000,
        "taux_annuel": 2,
        "duree_mois": 60
    });

    for expected in 1..=3 {
        let req = test::TestRequest::post()
            .uri("/calculer")
            .set_json(&payload)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["id"], expected);
    }
}

#[actix_web::test]
async fn test_calculer_insufficient_input() {
    let app = init_app!();
    let req = test::TestRequest::post()
        .uri("/calculer")
        .set_json(json!({ "montant": 200000, "taux_annuel": 3.6 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("Insufficient input"));
}

#[actix_web::test]
async fn test_calculer_payment_below_interest() {
    let app = init_app!();
    let req = test::TestRequest::post()
        .uri("/calculer")
        .set_json(json!({
            "montant": 100000,
            "taux_annuel": 4,
            "mensualite": 300
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["detail"].as_str().unwrap().contains("333.33"));
}

#[actix_web::test]
async fn test_calculer_rate_without_solution() {
    let app = init_app!();
    let req = test::TestRequest::post()
        .uri("/calculer")
        .set_json(json!({
            "montant": 100000,
            "duree_mois": 120,
            "mensualite": 500
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn test_calculer_negative_rate_rejected() {
    let app = init_app!();
    let req = test::TestRequest::post()
        .uri("/calculer")
        .set_json(json!({
            "montant": 100000,
            "taux_annuel": -1,
            "duree_mois": 120
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_calculer_malformed_json() {
    let app = init_app!();
    let req = test::TestRequest::post()
        .uri("/calculer")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"montant\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["detail"].is_string());
}

// ===========================================================================
// /capacite-emprunt
// ===========================================================================

#[actix_web::test]
async fn test_capacite_emprunt() {
    let app = init_app!();
    let req = test::TestRequest::post()
        .uri("/capacite-emprunt")
        .set_json(json!({
            "mensualite_max": 1200,
            "taux_annuel": 3.5,
            "duree_ans": 20,
            "taux_assurance": 0.36
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert!((number(&body["capital_empruntable"]) - 196734.30).abs() < 0.02);
    assert_eq!(body["duree_mois"], 240);
    assert_close(&body["cout_total"], 288000.0);
    let split = number(&body["assurance_mensuelle"])
        + number(&body["mensualite_hors_assurance"]);
    assert!((split - 1200.0).abs() <= 0.011);
}

#[actix_web::test]
async fn test_capacite_emprunt_invalid_duration() {
    let app = init_app!();
    let req = test::TestRequest::post()
        .uri("/capacite-emprunt")
        .set_json(json!({
            "mensualite_max": 1200,
            "taux_annuel": 3.5,
            "duree_ans": 0
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_capacite_emprunt_missing_field() {
    let app = init_app!();
    let req = test::TestRequest::post()
        .uri("/capacite-emprunt")
        .set_json(json!({ "mensualite_max": 1200 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_capacite_emprunt_oversized_budget() {
    let app = init_app!();
    let req = test::TestRequest::post()
        .uri("/capacite-emprunt")
        .set_json(json!({
            "mensualite_max": 5e28,
            "taux_annuel": 0,
            "duree_ans": 50,
            "taux_assurance": 0
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["detail"].as_str().unwrap().contains("too large"));
}

#[actix_web::test]
async fn test_calculer_insurance_rate_above_cap() {
    let app = init_app!();
    let req = test::TestRequest::post()
        .uri("/calculer")
        .set_json(json!({
            "montant": 200000,
            "taux_annuel": 3.6,
            "duree_mois": 240,
            "taux_assurance": 1e27
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ===========================================================================
// /version
// ===========================================================================

#[actix_web::test]
async fn test_version() {
    let app = init_app!();
    let req = test::TestRequest::get().uri("/version").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["engine"].is_string());
}
