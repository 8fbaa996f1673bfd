//! Managed transaction tests against the in-memory driver

#[cfg(test)]
mod tests {
    use crate::common::driver::MemoryTransaction;
    use crate::common::{MemoryDriver, fast_config, managed};
    use contentplan_core::{CoreError, ErrorKind, MetricsStore, QueryContext, TransactionOperation};
    use futures::FutureExt;
    use parking_lot::Mutex;
    use std::sync::Arc;

    type Step = TransactionOperation<MemoryDriver, String>;

    fn stage(key: &'static str, value: &'static str) -> Step {
        Step::new(key, move |tx: &MemoryTransaction| {
            tx.stage(key, value);
            async move { Ok(key.to_string()) }.boxed()
        })
    }

    fn failing(message: &'static str) -> Step {
        Step::new("failing", move |_tx: &MemoryTransaction| {
            async move { Err(CoreError::store(message)) }.boxed()
        })
    }

    #[tokio::test]
    async fn test_commit_makes_staged_writes_visible() {
        let driver = MemoryDriver::default();
        let db = managed(&driver, &fast_config(), Arc::new(MetricsStore::default())).await;

        let results = db
            .execute_transaction(
                vec![stage("post:1", "draft"), stage("schedule:1", "monday")],
                &QueryContext::new("schedule_post").with_resource("posts"),
            )
            .await
            .unwrap();

        assert_eq!(results, vec!["post:1", "schedule:1"]);
        let table = driver.table();
        assert_eq!(table.lock().get("schedule:1").map(String::as_str), Some("monday"));
        assert!(db.active_transactions().is_empty());
    }

    #[tokio::test]
    async fn test_failure_rolls_back_and_runs_compensations_in_reverse() {
        let driver = MemoryDriver::default();
        let db = managed(&driver, &fast_config(), Arc::new(MetricsStore::default())).await;
        let compensated = Arc::new(Mutex::new(Vec::new()));

        let with_compensation = |key: &'static str| {
            let compensated = Arc::clone(&compensated);
            stage(key, "queued").with_rollback(move || async move {
                compensated.lock().push(key);
                Ok(())
            })
        };

        let err = db
            .execute_transaction(
                vec![
                    with_compensation("upload:1"),
                    with_compensation("notify:1"),
                    failing("insert or update violates foreign key constraint \"posts_author_fk\""),
                ],
                &QueryContext::new("publish_bundle"),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ConstraintViolation);
        assert_eq!(*compensated.lock(), vec!["notify:1", "upload:1"]);
        assert!(driver.table().lock().is_empty());

        let history = db.get_query_history(1);
        assert_eq!(history[0].operation, "publish_bundle");
        assert!(!history[0].success);
    }

    #[tokio::test]
    async fn test_transactions_are_not_retried() {
        let driver = MemoryDriver::default();
        let db = managed(&driver, &fast_config(), Arc::new(MetricsStore::default())).await;

        let err = db
            .execute_transaction(
                vec![failing("deadlock detected")],
                &QueryContext::new("reorder_queue"),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DeadlockError);
        assert!(matches!(err, CoreError::Query { attempts: 1, .. }));
    }
}
