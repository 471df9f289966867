use actix_web::{get, web, Responder};
use serde::{Deserialize, Serialize};

use crate::error::Error;

#[get("/version")]
async fn index() -> Result<impl Responder, Error> {
    const VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");
    const ENGINE: &str = mortgage_sim_core::types::ENGINE_VERSION;

    Ok(web::Json(Response {
        version: VERSION,
        engine: ENGINE,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response<'a> {
    pub version: Option<&'a str>,
    pub engine: &'a str,
}
