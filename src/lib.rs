//! Keep-warm prober: periodically GETs a list of URLs so the services behind
//! them stay awake, and keeps the last observed status of each one for a
//! small web dashboard.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod engine;
pub mod models;
pub mod store;
pub mod telemetry;

pub use config::{MonitorConfig, Variant};
pub use engine::Prober;
pub use models::{ProbeOutcome, StatusRecord};
pub use store::StatusStore;
