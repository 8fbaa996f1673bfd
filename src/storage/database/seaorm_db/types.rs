use sea_orm::DatabaseConnection;

/// SeaORM-backed store driver
#[derive(Debug, Clone, Default)]
pub struct SeaOrmDriver {
    _private: (),
}

/// Pool handle handed to query closures
pub type SeaOrmPool = DatabaseConnection;

/// Database backend type indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackendType {
    PostgreSQL,
    SQLite,
}

impl DatabaseBackendType {
    /// Backend implied by a connection string
    pub fn from_url(url: &str) -> Self {
        if url.starts_with("sqlite") {
            Self::SQLite
        } else {
            Self::PostgreSQL
        }
    }
}
