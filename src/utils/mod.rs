//! Utility modules
//!
//! - **error**: crate error type, failure classification, retry and circuit breaking

pub mod error;
