//! Configuration validation
//!
//! The validation is organized into several submodules:
//! - `trait_def`: Core Validate trait definition
//! - `storage_validators`: Database configuration validators
//! - `resilience_validators`: Retry policy and reconnect validators
//! - `monitoring_validators`: Monitoring, threshold and channel validators
//! - `tests`: Test suite for all validators

mod monitoring_validators;
mod resilience_validators;
mod storage_validators;
mod trait_def;

pub use monitoring_validators::validate_http_url;
pub use trait_def::Validate;
