//! Error handling utilities
//!
//! This module provides the crate error type, failure classification, and the
//! recovery primitives (retry with backoff, circuit breaking) built on top of it.

pub mod classifier;
pub mod error;
pub mod recovery;

// Re-export commonly used types and functions
pub use classifier::{ErrorClassification, ErrorClassifier, ErrorKind};
pub use error::*;
pub use recovery::*;
