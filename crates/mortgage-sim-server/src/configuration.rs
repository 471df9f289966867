use std::{
    env,
    fmt::Display,
    ops::Deref,
    str::FromStr,
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
};

use mortgage_sim_core::{
    DEFAULT_INSURANCE_RATE_PERCENT, MAX_INSURANCE_RATE_PERCENT,
};
use rust_decimal::Decimal;
use tracing::Level;

use crate::error::Error;

pub struct AppState<T>(Arc<T>);

impl<T> AppState<T> {
    pub fn new(state: T) -> AppState<T> {
        AppState(Arc::new(state))
    }
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> AppState<T> {
        AppState(Arc::clone(&self.0))
    }
}

impl<T> Deref for AppState<T> {
    type Target = Arc<T>;

    fn deref(&self) -> &Arc<T> {
        &self.0
    }
}

#[derive(Debug)]
pub struct State {
    pub config: Config,
    simulation_ids: AtomicI64,
}

impl State {
    pub fn new(config: Config) -> State {
        Self {
            config,
            simulation_ids: AtomicI64::new(0),
        }
    }

    /// Next simulation identifier. Starts at 1 and resets with the process.
    pub fn next_simulation_id(&self) -> i64 {
        self.simulation_ids.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub default_insurance_rate: Decimal,
    pub json_limit: usize,
    pub request_timeout_ms: u64,
    pub workers: Option<usize>,
    pub log_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: String::from("127.0.0.1"),
            port: 8000,
            allowed_origins: vec![String::from("*")],
            default_insurance_rate: DEFAULT_INSURANCE_RATE_PERCENT,
            json_limit: 4096,
            request_timeout_ms: 5000,
            workers: None,
            log_level: Level::INFO,
        }
    }
}

pub fn get_configuration() -> Result<Config, Error> {
    let defaults = Config::default();

    let server_host = env::var("SERVER_HOST").unwrap_or(defaults.server_host);
    let port = parse_var("PORT", defaults.port)?;
    let allowed_origins = match env::var("ALLOWED_ORIGINS") {
        Ok(value) => value
            .split(',')
            .map(|item| item.trim().to_owned())
            .filter(|item| !item.is_empty())
            .collect::<Vec<String>>(),
        Err(_) => defaults.allowed_origins,
    };
    let default_insurance_rate =
        parse_var("DEFAULT_INSURANCE_RATE", defaults.default_insurance_rate)?;
    if default_insurance_rate < Decimal::ZERO
        || default_insurance_rate > MAX_INSURANCE_RATE_PERCENT
    {
        return Err(Error::ConfigurationError(format!(
            "DEFAULT_INSURANCE_RATE must be between 0 and {MAX_INSURANCE_RATE_PERCENT}"
        )));
    }
    let json_limit = parse_var("JSON_LIMIT", defaults.json_limit)?;
    let request_timeout_ms =
        parse_var("REQUEST_TIMEOUT_MS", defaults.request_timeout_ms)?;
    let workers = match env::var("WORKERS") {
        Ok(value) => Some(parse_value("WORKERS", &value)?),
        Err(_) => None,
    };
    let log_level = parse_var("LOG_LEVEL", defaults.log_level)?;

    Ok(Config {
        server_host,
        port,
        allowed_origins,
        default_insurance_rate,
        json_limit,
        request_timeout_ms,
        workers,
        log_level,
    })
}

/// Loads `.env` from the working directory when present.
pub fn set_configuration() -> Result<(), Error> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(Error::ConfigurationError(e.to_string())),
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T, Error>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(value) => parse_value(key, &value),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, Error>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| Error::ConfigurationError(format!("{key}: {e}")))
}
