// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `manager.rs`

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{json, Value};
    use tokio::sync::Barrier;

    use crate::manager::RuleManager;
    use crate::record::Record;
    use crate::rule_errors::{RuleError, StoreError};
    use crate::store::{InMemoryStore, ObjectStore};

    const NS: &str = "proxy-rules";

    fn record(value: Value) -> Record {
        Record::from_value(value).unwrap()
    }

    fn manager() -> (RuleManager, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        (RuleManager::new(store.clone(), NS), store)
    }

    fn test_rule() -> Record {
        record(json!({
            "metadata": {"name": "test-rule"},
            "spec": {
                "domain": "e2e-test.example.com",
                "destination": "10.0.0.100",
                "port": 8080,
                "tls": true
            }
        }))
    }

    fn validation_errors(err: RuleError) -> crate::rule_errors::ValidationErrors {
        match err {
            RuleError::ValidationFailed(errors) => errors,
            other => panic!("expected ValidationFailed, got {other:?}"),
        }
    }

    // Scenarios A-F run in sequence against one store

    #[tokio::test]
    async fn test_rule_lifecycle_scenarios() {
        let (manager, _) = manager();

        // A: create, list, get
        let created = manager.create(test_rule()).await.unwrap();
        assert_eq!(created.name(), Some("test-rule"));

        let listed = manager.list().await.unwrap();
        assert_eq!(listed.len(), 1);

        let fetched = manager.get("test-rule").await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.domain(), Some("e2e-test.example.com"));

        // B: update
        let update = record(json!({
            "spec": {
                "domain": "updated-e2e-test.example.com",
                "destination": "10.0.0.101",
                "port": 8081
            }
        }));
        manager.update("test-rule", update).await.unwrap();
        let fetched = manager.get("test-rule").await.unwrap();
        assert_eq!(fetched.domain(), Some("updated-e2e-test.example.com"));
        assert_eq!(fetched.spec().unwrap()["port"], json!(8081));

        // C: domain conflict with the updated rule
        let err = manager
            .create(record(json!({
                "metadata": {"name": "second-rule"},
                "spec": {"domain": "updated-e2e-test.example.com", "destination": "10.0.0.102"}
            })))
            .await
            .unwrap_err();
        assert!(
            matches!(err, RuleError::DomainConflict { ref owner, .. } if owner == "test-rule"),
            "got {err:?}"
        );

        // D: missing domain
        let err = manager
            .create(record(json!({
                "metadata": {"name": "no-domain"},
                "spec": {"destination": "10.0.0.50"}
            })))
            .await
            .unwrap_err();
        assert!(validation_errors(err).mentions("domain"));

        // E: port out of range
        let err = manager
            .create(record(json!({
                "metadata": {"name": "bad-port"},
                "spec": {"domain": "test.example.com", "destination": "10.0.0.50", "port": 99999}
            })))
            .await
            .unwrap_err();
        assert!(validation_errors(err).mentions("port"));

        // F: delete, then get
        manager.delete("test-rule").await.unwrap();
        let err = manager.get("test-rule").await.unwrap_err();
        assert!(matches!(err, RuleError::NotFound { ref name } if name == "test-rule"));
    }

    #[tokio::test]
    async fn test_create_normalizes_and_defaults() {
        let (manager, _) = manager();
        let stored = manager
            .create(record(json!({
                "metadata": {"name": "web", "namespace": "elsewhere"},
                "spec": {"domain": "example.com", "destination": "backend.internal"}
            })))
            .await
            .unwrap();

        assert_eq!(stored.api_version(), Some("bausteln.io/v1"));
        assert_eq!(stored.kind(), Some("Proxyrule"));
        assert_eq!(stored.namespace(), Some(NS));
        assert_eq!(stored.spec().unwrap()["tls"], json!(true));
    }

    #[tokio::test]
    async fn test_create_keeps_explicit_tls_false() {
        let (manager, _) = manager();
        let stored = manager
            .create(record(json!({
                "metadata": {"name": "plain"},
                "spec": {"domain": "plain.example.com", "destination": "10.0.0.1", "tls": false}
            })))
            .await
            .unwrap();

        assert_eq!(stored.spec().unwrap()["tls"], json!(false));
    }

    #[tokio::test]
    async fn test_create_round_trips_spec_and_name() {
        let (manager, _) = manager();
        let input = test_rule();
        let spec = input.spec().cloned().unwrap();

        manager.create(input).await.unwrap();
        let fetched = manager.get("test-rule").await.unwrap();

        assert_eq!(fetched.name(), Some("test-rule"));
        assert_eq!(fetched.spec(), Some(&spec));
    }

    #[tokio::test]
    async fn test_duplicate_name_is_name_conflict() {
        let (manager, _) = manager();
        manager.create(test_rule()).await.unwrap();

        let mut again = test_rule();
        again.merge_update(&record(json!({
            "spec": {"domain": "other.example.com", "destination": "10.0.0.1"}
        })));
        let err = manager.create(again).await.unwrap_err();

        assert!(matches!(err, RuleError::NameConflict { ref name } if name == "test-rule"));
        assert_eq!(
            err.to_string(),
            "Proxy rule with name 'test-rule' already exists"
        );
    }

    #[tokio::test]
    async fn test_create_reports_every_validation_error() {
        let (manager, store) = manager();
        let err = manager
            .create(record(json!({
                "metadata": {"name": "Bad_Name"},
                "spec": {"domain": "bad..example.com", "port": 0}
            })))
            .await
            .unwrap_err();

        let errors = validation_errors(err);
        assert!(errors.mentions("metadata.name"));
        assert!(errors.mentions("spec.domain"));
        assert!(errors.mentions("destination"));
        assert!(errors.mentions("spec.port"));
        assert_eq!(store.len(NS).await, 0);
    }

    #[tokio::test]
    async fn test_update_unknown_rule_is_not_found() {
        let (manager, _) = manager();
        let err = manager.update("ghost", test_rule()).await.unwrap_err();
        assert!(matches!(err, RuleError::NotFound { ref name } if name == "ghost"));
    }

    #[tokio::test]
    async fn test_update_with_invalid_spec_leaves_store_unchanged() {
        let (manager, _) = manager();
        let created = manager.create(test_rule()).await.unwrap();

        let err = manager
            .update(
                "test-rule",
                record(json!({"spec": {"domain": "ok.example.com", "port": 70000, "destination": "10.0.0.1"}})),
            )
            .await
            .unwrap_err();
        assert!(validation_errors(err).mentions("port"));

        assert_eq!(manager.get("test-rule").await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_update_keeping_own_domain_is_allowed() {
        let (manager, _) = manager();
        manager.create(test_rule()).await.unwrap();

        let updated = manager
            .update(
                "test-rule",
                record(json!({
                    "spec": {"domain": "e2e-test.example.com", "destinations": ["10.0.0.1", "10.0.0.2"]}
                })),
            )
            .await
            .unwrap();

        assert_eq!(updated.spec().unwrap()["destinations"], json!(["10.0.0.1", "10.0.0.2"]));
        assert!(updated.spec().unwrap().get("destination").is_none());
    }

    #[tokio::test]
    async fn test_update_into_other_rules_domain_conflicts() {
        let (manager, _) = manager();
        manager.create(test_rule()).await.unwrap();
        manager
            .create(record(json!({
                "metadata": {"name": "other"},
                "spec": {"domain": "other.example.com", "destination": "10.0.0.2"}
            })))
            .await
            .unwrap();

        let err = manager
            .update(
                "other",
                record(json!({"spec": {"domain": "E2E-TEST.example.com", "destination": "10.0.0.2"}})),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RuleError::DomainConflict { ref owner, .. } if owner == "test-rule"));
    }

    #[tokio::test]
    async fn test_update_cannot_rename() {
        let (manager, store) = manager();
        manager.create(test_rule()).await.unwrap();

        let updated = manager
            .update(
                "test-rule",
                record(json!({
                    "metadata": {"name": "renamed", "labels": {"team": "edge"}},
                    "spec": {"domain": "e2e-test.example.com", "destination": "10.0.0.100"}
                })),
            )
            .await
            .unwrap();

        assert_eq!(updated.name(), Some("test-rule"));
        assert_eq!(updated.metadata().unwrap()["labels"], json!({"team": "edge"}));
        assert_eq!(store.len(NS).await, 1);
    }

    #[tokio::test]
    async fn test_delete_unknown_rule_is_not_found() {
        let (manager, _) = manager();
        let err = manager.delete("ghost").await.unwrap_err();
        assert!(matches!(err, RuleError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_is_idempotent() {
        let (manager, _) = manager();
        assert!(manager.list().await.unwrap().is_empty());

        manager.create(test_rule()).await.unwrap();
        let first = manager.list().await.unwrap();
        let second = manager.list().await.unwrap();
        assert_eq!(first, second);
    }

    /// Store whose `list` parks until two callers have arrived, forcing two creates
    /// to run their conflict checks before either writes.
    struct BarrierStore {
        inner: Arc<InMemoryStore>,
        barrier: Barrier,
    }

    #[async_trait::async_trait]
    impl ObjectStore for BarrierStore {
        async fn create(&self, namespace: &str, record: Record) -> Result<Record, StoreError> {
            self.inner.create(namespace, record).await
        }
        async fn update(&self, namespace: &str, record: Record) -> Result<Record, StoreError> {
            self.inner.update(namespace, record).await
        }
        async fn delete(&self, namespace: &str, name: &str) -> Result<(), StoreError> {
            self.inner.delete(namespace, name).await
        }
        async fn get(&self, namespace: &str, name: &str) -> Result<Record, StoreError> {
            self.inner.get(namespace, name).await
        }
        async fn list(&self, namespace: &str) -> Result<Vec<Record>, StoreError> {
            let records = self.inner.list(namespace).await;
            self.barrier.wait().await;
            records
        }
    }

    #[tokio::test]
    async fn test_concurrent_creates_can_share_a_domain() {
        let inner = Arc::new(InMemoryStore::new());
        let store = Arc::new(BarrierStore {
            inner: inner.clone(),
            barrier: Barrier::new(2),
        });
        let manager = RuleManager::new(store, NS);

        let first = record(json!({
            "metadata": {"name": "first"},
            "spec": {"domain": "race.example.com", "destination": "10.0.0.1"}
        }));
        let second = record(json!({
            "metadata": {"name": "second"},
            "spec": {"domain": "race.example.com", "destination": "10.0.0.2"}
        }));

        let (a, b) = tokio::join!(manager.create(first), manager.create(second));

        // The conflict check is not atomic with the write: both creates land
        assert!(a.is_ok(), "first create failed: {a:?}");
        assert!(b.is_ok(), "second create failed: {b:?}");

        let live = inner.list(NS).await.unwrap();
        assert_eq!(live.len(), 2);
        assert!(live
            .iter()
            .all(|r| r.domain() == Some("race.example.com")));
    }

    #[tokio::test]
    async fn test_create_accepts_rules_with_and_without_a_typed_view() {
        let (manager, _) = manager();

        let pool = manager
            .create(record(json!({
                "metadata": {"name": "pool"},
                "spec": {"domain": "pool.example.com", "destinations": ["10.0.0.1", "backend"]}
            })))
            .await
            .unwrap();
        let typed = crate::crd::ProxyRule::try_from(&pool).unwrap();
        assert_eq!(typed.spec.targets(), vec!["10.0.0.1", "backend"]);

        // Integral float ports validate but do not fit the typed port field
        let float_port = manager
            .create(record(json!({
                "metadata": {"name": "float-port"},
                "spec": {"domain": "float.example.com", "destination": "10.0.0.2", "port": 8080.0}
            })))
            .await
            .unwrap();
        assert!(crate::crd::ProxyRule::try_from(&float_port).is_err());
        assert_eq!(float_port.domain(), Some("float.example.com"));
    }

    /// Delegates to an in-memory store but fails the selected operations.
    #[derive(Default)]
    struct FailingStore {
        inner: Arc<InMemoryStore>,
        fail_get: bool,
        fail_create: bool,
        fail_update: bool,
    }

    fn unavailable() -> StoreError {
        StoreError::Other("backend unavailable".to_string())
    }

    #[async_trait::async_trait]
    impl ObjectStore for FailingStore {
        async fn create(&self, namespace: &str, record: Record) -> Result<Record, StoreError> {
            if self.fail_create {
                return Err(unavailable());
            }
            self.inner.create(namespace, record).await
        }
        async fn update(&self, namespace: &str, record: Record) -> Result<Record, StoreError> {
            if self.fail_update {
                return Err(unavailable());
            }
            self.inner.update(namespace, record).await
        }
        async fn delete(&self, namespace: &str, name: &str) -> Result<(), StoreError> {
            self.inner.delete(namespace, name).await
        }
        async fn get(&self, namespace: &str, name: &str) -> Result<Record, StoreError> {
            if self.fail_get {
                return Err(unavailable());
            }
            self.inner.get(namespace, name).await
        }
        async fn list(&self, namespace: &str) -> Result<Vec<Record>, StoreError> {
            self.inner.list(namespace).await
        }
    }

    #[tokio::test]
    async fn test_create_reports_failed_name_lookup() {
        let inner = Arc::new(InMemoryStore::new());
        let store = FailingStore {
            inner: inner.clone(),
            fail_get: true,
            ..FailingStore::default()
        };
        let manager = RuleManager::new(Arc::new(store), NS);

        let err = manager.create(test_rule()).await.unwrap_err();
        assert!(matches!(err, RuleError::Store(_)), "got {err:?}");
        assert_eq!(err.status_code(), 500);
        assert!(inner.list(NS).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_reports_failed_write() {
        let inner = Arc::new(InMemoryStore::new());
        let store = FailingStore {
            inner: inner.clone(),
            fail_create: true,
            ..FailingStore::default()
        };
        let manager = RuleManager::new(Arc::new(store), NS);

        let err = manager.create(test_rule()).await.unwrap_err();
        assert!(matches!(err, RuleError::Store(_)), "got {err:?}");
        assert_eq!(err.status_reason(), "StoreError");
        assert!(inner.list(NS).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_reports_failed_write_and_keeps_stored_rule() {
        let inner = Arc::new(InMemoryStore::new());
        let seeded = RuleManager::new(inner.clone(), NS)
            .create(test_rule())
            .await
            .unwrap();

        let store = FailingStore {
            inner: inner.clone(),
            fail_update: true,
            ..FailingStore::default()
        };
        let manager = RuleManager::new(Arc::new(store), NS);

        let err = manager
            .update(
                "test-rule",
                record(json!({"spec": {"domain": "moved.example.com", "destination": "10.0.0.2"}})),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RuleError::Store(_)), "got {err:?}");
        assert_eq!(inner.get(NS, "test-rule").await.unwrap(), seeded);
    }

    #[tokio::test]
    async fn test_update_reports_failed_lookup() {
        let store = FailingStore {
            fail_get: true,
            ..FailingStore::default()
        };
        let manager = RuleManager::new(Arc::new(store), NS);

        let err = manager
            .update("test-rule", test_rule())
            .await
            .unwrap_err();
        assert!(matches!(err, RuleError::Store(_)), "got {err:?}");
    }
}
