//! Constant-annuity mortgage loans: resolve the missing parameter, build the
//! month-by-month schedule and reduce it to totals.

pub mod request;
pub mod resolver;
pub mod schedule;
pub mod simulation;
pub mod summary;
