//! Payroll computation pipeline.
//!
//! Input documents are validated, enriched with the region's IRPF regime,
//! checked for missing fields, completed under a [`preflight::MissingPolicy`],
//! and then sent to a model that returns a schema-constrained result.
pub mod batch;
pub mod client;
pub mod config;
pub mod document;
pub mod preflight;
pub mod region;
pub mod schema;
pub mod service;
mod util;
