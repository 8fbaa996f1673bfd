// Module declarations
mod connection;
mod types;

// Re-export public types
pub use types::{DatabaseBackendType, SeaOrmDriver, SeaOrmPool};
