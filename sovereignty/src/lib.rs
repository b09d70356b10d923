pub mod configuration;
pub mod domain;
pub mod email_client;
pub mod error;
pub mod routes;
pub mod startup;
pub mod submission;
pub mod telemetry;

pub use error::error_chain_fmt;
