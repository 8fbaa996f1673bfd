//! Storage layer
//!
//! This module provides resilient access to the relational store.

/// Database storage module
pub mod database;

pub use database::{
    ConnectionManager, ConnectionState, ConnectionStatus, DatabaseProbe, QueryContext,
    SeaOrmDriver, StoreDriver, TransactionOperation,
};
