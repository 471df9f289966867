pub mod configuration;
pub mod controller;
pub mod error;
pub mod server;
