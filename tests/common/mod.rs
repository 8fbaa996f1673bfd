//! Common test utilities for contentplan-core
//!
//! - An in-memory [`driver::MemoryDriver`] whose failures are scripted per test
//! - Configuration fixtures with fast, deterministic retry timing
//! - A notification channel that captures alerts

pub mod driver;
pub mod fixtures;

pub use driver::MemoryDriver;
pub use fixtures::{CapturingChannel, fast_config, managed};

/// Assert that a result is Ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a result is Err and return the error
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}
