//! Integration tests for contentplan-core
//!
//! These tests drive the public API end to end: configuration loading, the
//! managed query path with retries and circuit breaking, transactions, and the
//! monitoring service with its notification channels.

pub mod config_tests;
pub mod monitoring_tests;
pub mod resilience_tests;
pub mod sqlite_tests;
pub mod transaction_tests;
pub mod webhook_tests;
