use actix_web::{
    error::BlockingError as BLOCKING_ERROR, http::StatusCode, HttpResponse,
    ResponseError,
};
use mortgage_sim_core::MortgageSimError;
use std::io::Error as IO_ERROR;
use thiserror::Error;
use tracing::subscriber::SetGlobalDefaultError as TRACING_GLOBAL_DEFAULT_ERROR;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] IO_ERROR),

    #[error("{0}")]
    Engine(#[from] MortgageSimError),

    #[error("Computation exceeded the {0} ms request timeout")]
    Timeout(u64),

    #[error("{0}")]
    BlockingError(#[from] BLOCKING_ERROR),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Tracing error: {0}")]
    SetGlobalDefaultError(#[from] TRACING_GLOBAL_DEFAULT_ERROR),
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::Engine(e) => match e {
                MortgageSimError::InsufficientInput { .. } | MortgageSimError::InvalidInput { .. } => {
                    StatusCode::BAD_REQUEST
                }
                MortgageSimError::InvalidPayment(_) | MortgageSimError::NonConvergentRate { .. } => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                MortgageSimError::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            detail: self.to_string(),
        })
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ErrorBody {
    pub detail: String,
}
