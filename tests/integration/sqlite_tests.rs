//! Connection manager over the sea-orm driver with an in-memory SQLite database

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use crate::common::fast_config;
    use contentplan_core::config::DatabaseConfig;
    use contentplan_core::{
        ConnectionManager, ConnectionState, ErrorKind, MetricsStore, QueryContext, SeaOrmDriver,
    };
    use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};
    use std::sync::Arc;

    async fn sqlite_manager() -> ConnectionManager<SeaOrmDriver> {
        let mut config = fast_config();
        // Every pooled connection to :memory: is its own database
        config.database = DatabaseConfig {
            pool_size: 1,
            min_connections: 1,
            ..DatabaseConfig::with_url("sqlite::memory:")
        };
        let manager = ConnectionManager::new(
            SeaOrmDriver::new(),
            config.database.clone(),
            config.resilience.clone(),
            Arc::new(MetricsStore::default()),
        );
        manager.initialize().await.unwrap();
        manager
    }

    fn sql(text: &str) -> Statement {
        Statement::from_string(DatabaseBackend::Sqlite, text.to_string())
    }

    #[tokio::test]
    async fn test_queries_run_against_sqlite() {
        let db = sqlite_manager().await;
        assert_eq!(db.state(), ConnectionState::Connected);
        assert!(db.test_connection().await);

        db.execute_query(&QueryContext::new("create_posts"), |conn| async move {
            conn.execute(sql("CREATE TABLE posts (id INTEGER PRIMARY KEY, slug TEXT UNIQUE NOT NULL)"))
                .await?;
            conn.execute(sql("INSERT INTO posts (slug) VALUES ('launch')")).await?;
            Ok(())
        })
        .await
        .unwrap();

        let count = db
            .execute_query(&QueryContext::new("count_posts").with_resource("posts"), |conn| async move {
                let row = conn.query_one(sql("SELECT COUNT(*) AS n FROM posts")).await?;
                Ok(row.map(|r| r.try_get::<i64>("", "n")).transpose()?.unwrap_or_default())
            })
            .await
            .unwrap();
        assert_eq!(count, 1);

        db.shutdown().await.unwrap();
        assert_eq!(db.state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_unique_violation_is_classified() {
        let db = sqlite_manager().await;
        db.execute_query(&QueryContext::new("create_tags"), |conn| async move {
            conn.execute(sql("CREATE TABLE tags (name TEXT UNIQUE)")).await?;
            conn.execute(sql("INSERT INTO tags VALUES ('rust')")).await?;
            Ok(())
        })
        .await
        .unwrap();

        let err = db
            .execute_query(&QueryContext::new("insert_tag"), |conn| async move {
                conn.execute(sql("INSERT INTO tags VALUES ('rust')")).await?;
                Ok(())
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ConstraintViolation);
        assert_eq!(err.status_code(), 409);
    }

    #[tokio::test]
    async fn test_syntax_error_is_query_error() {
        let db = sqlite_manager().await;
        let err = db
            .execute_query(&QueryContext::new("broken"), |conn| async move {
                conn.execute(sql("SELEC nothing")).await?;
                Ok(())
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::QueryError);
        assert!(!err.is_transient());
    }
}
