//! Retry and circuit breaker behavior through the connection manager

#[cfg(test)]
mod tests {
    use crate::common::{MemoryDriver, fast_config, managed};
    use crate::{assert_err, assert_ok};
    use contentplan_core::{
        CircuitState, CoreError, ErrorKind, MetricsStore, QueryContext, RetryPolicies,
    };
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_breaker_opens_then_recovers_after_cooldown() {
        let driver = MemoryDriver::default();
        let config = fast_config();
        let db = managed(&driver, &config, Arc::new(MetricsStore::default())).await;
        let context = QueryContext::new("load_calendar").with_resource("posts");

        // Three calls, three attempts each
        driver.fail_queries(std::iter::repeat_n("connection refused", 9));
        for _ in 0..3 {
            let err = assert_err!(db.execute_query(&context, |pool| async move { pool.get("week").await }).await);
            assert_eq!(err.kind(), ErrorKind::ConnectionError);
            assert!(matches!(err, CoreError::Query { attempts: 3, .. }));
        }
        assert_eq!(db.get_status().circuit_breaker.state, CircuitState::Open);

        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let err = assert_err!(
            db.execute_query(&context, move |pool| {
                counter.fetch_add(1, Ordering::SeqCst);
                async move { pool.get("week").await }
            })
            .await
        );
        assert!(err.is_circuit_open());
        assert_eq!(err.status_code(), 503);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        tokio::time::advance(Duration::from_secs(61)).await;
        let value = assert_ok!(db.execute_query(&context, |pool| async move { pool.get("week").await }).await);
        assert_eq!(value, None);

        let status = db.get_status();
        assert_eq!(status.circuit_breaker.state, CircuitState::Closed);
        assert_eq!(status.circuit_breaker.total_rejections, 1);
        assert_eq!(status.health.consecutive_failures, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failure_is_retried() {
        let driver = MemoryDriver::default();
        let db = managed(&driver, &fast_config(), Arc::new(MetricsStore::default())).await;
        driver.table().lock().insert("draft".into(), "hello".into());

        driver.fail_queries(["canceling statement due to statement timeout"]);
        let value = db
            .execute_query(&QueryContext::new("get_draft"), |pool| async move { pool.get("draft").await })
            .await
            .unwrap();

        assert_eq!(value.as_deref(), Some("hello"));
        let stats = db.get_status().query_stats;
        assert_eq!(stats.total_queries, 1);
        assert_eq!(stats.failed_queries, 0);
    }

    #[tokio::test]
    async fn test_constraint_violation_fails_fast() {
        let driver = MemoryDriver::default();
        let db = managed(&driver, &fast_config(), Arc::new(MetricsStore::default())).await;

        driver.fail_queries([
            "duplicate key value violates unique constraint \"posts_slug_key\"",
            "unused",
        ]);
        let err = db
            .execute_query(&QueryContext::new("insert_post"), |pool| async move {
                pool.put("slug", "launch").await
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ConstraintViolation);
        assert!(!err.is_transient());
        assert_eq!(err.status_code(), 409);
        assert!(matches!(err, CoreError::Query { attempts: 1, .. }));
        assert_eq!(db.get_status().circuit_breaker.failure_count, 0);

        let history = db.get_query_history(1);
        assert_eq!(history[0].error_kind, Some(ErrorKind::ConstraintViolation));
    }

    #[tokio::test(start_paused = true)]
    async fn test_named_policy_for_non_database_calls() {
        let config = fast_config();
        let policies = RetryPolicies::new(&config.resilience.retry_policies);
        let attempts = AtomicU32::new(0);

        let result = policies
            .with_retry(
                || {
                    let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                    async move {
                        if attempt < 3 {
                            Err(CoreError::store("upstream connection reset"))
                        } else {
                            Ok("caption")
                        }
                    }
                },
                "ai_service",
                "generate_caption",
            )
            .await;

        assert_eq!(result.unwrap(), "caption");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);

        // Unknown policy names fall back to the database policy
        assert_eq!(policies.policy("no_such_policy").name(), "database");
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_after_outage() {
        let driver = MemoryDriver::default();
        let db = managed(&driver, &fast_config(), Arc::new(MetricsStore::default())).await;

        driver.fail_next_connects(1);
        assert_ok!(db.refresh_pool().await);
        assert_eq!(driver.connects(), 2);
        assert_eq!(db.get_status().circuit_breaker.state, CircuitState::Closed);
    }
}
