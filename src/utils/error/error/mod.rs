//! Error handling for the data access core
//!
//! This module defines all error types used throughout the crate.

#![allow(missing_docs)]

mod helpers;
mod types;

// Re-export all public types
pub use types::{CoreError, Result};
