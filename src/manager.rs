// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Orchestration of every `ProxyRule` mutation.
//!
//! [`RuleManager`] is the only entry point that writes to the store. Each mutating
//! operation runs the same pipeline:
//!
//! 1. normalize the record (`apiVersion`, `kind`, namespace, create defaults)
//! 2. structural and syntax validation
//! 3. name collision check (create only)
//! 4. domain conflict check
//! 5. store write
//!
//! Reads pass straight through to the store.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use proxyrule_api::manager::RuleManager;
//! use proxyrule_api::record::Record;
//! use proxyrule_api::store::InMemoryStore;
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), proxyrule_api::rule_errors::RuleError> {
//! let manager = RuleManager::new(Arc::new(InMemoryStore::new()), "proxy-rules");
//! let record = Record::from_value(json!({
//!     "metadata": {"name": "web"},
//!     "spec": {"domain": "example.com", "destination": "10.0.0.1"}
//! }))
//! .unwrap();
//!
//! let stored = manager.create(record).await?;
//! assert_eq!(stored.name(), Some("web"));
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::conflict::check_domain_conflict;
use crate::crd::ProxyRule;
use crate::metrics::{record_operation, set_live_rules, Outcome};
use crate::record::Record;
use crate::rule_errors::{RuleError, StoreError};
use crate::store::ObjectStore;
use crate::validation::{validate_create, validate_update};

/// Validates and applies `ProxyRule` operations against an [`ObjectStore`].
#[derive(Clone)]
pub struct RuleManager {
    store: Arc<dyn ObjectStore>,
    namespace: String,
}

impl RuleManager {
    /// Create a manager that keeps every rule in `namespace`.
    pub fn new(store: Arc<dyn ObjectStore>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    /// Create a new rule.
    ///
    /// # Errors
    ///
    /// * [`RuleError::ValidationFailed`] if the record is malformed
    /// * [`RuleError::NameConflict`] if a rule with the same name exists
    /// * [`RuleError::DomainConflict`] if another rule uses the domain
    /// * [`RuleError::Store`] on backend failure
    pub async fn create(&self, record: Record) -> Result<Record, RuleError> {
        let start = Instant::now();
        let result = self.create_inner(record).await;
        record_operation("create", Outcome::of(&result), start.elapsed());
        result
    }

    async fn create_inner(&self, mut record: Record) -> Result<Record, RuleError> {
        record.normalize(&self.namespace);
        record.apply_create_defaults();

        validate_create(&record).into_result()?;

        // Validation guarantees a name
        let name = record.name().unwrap_or_default().to_string();
        debug!("Creating ProxyRule {}/{}", self.namespace, name);

        match self.store.get(&self.namespace, &name).await {
            Ok(_) => {
                warn!("ProxyRule {}/{} already exists", self.namespace, name);
                return Err(RuleError::NameConflict { name });
            }
            Err(StoreError::NotFound { .. }) => {}
            Err(e) => return Err(RuleError::Store(e)),
        }

        check_domain_conflict(self.store.as_ref(), &self.namespace, &record, None).await?;

        let stored = self.store.create(&self.namespace, record).await?;
        match ProxyRule::try_from(&stored) {
            Ok(rule) => info!(
                "Created ProxyRule {}/{} for domain {} -> {}",
                self.namespace,
                name,
                rule.spec.domain,
                rule.spec.targets().join(",")
            ),
            Err(e) => {
                debug!("Stored ProxyRule {}/{} has no typed view: {}", self.namespace, name, e);
                info!(
                    "Created ProxyRule {}/{} for domain {}",
                    self.namespace,
                    name,
                    stored.domain().unwrap_or_default()
                );
            }
        }
        Ok(stored)
    }

    /// Update an existing rule.
    ///
    /// Only `spec` and metadata `labels`/`annotations` are taken from `incoming`; the
    /// rule keeps its name and every other stored field.
    ///
    /// # Errors
    ///
    /// * [`RuleError::NotFound`] if no rule is named `name`
    /// * [`RuleError::ValidationFailed`] if the merged record is malformed
    /// * [`RuleError::DomainConflict`] if another rule uses the new domain
    /// * [`RuleError::Store`] on backend failure
    pub async fn update(&self, name: &str, incoming: Record) -> Result<Record, RuleError> {
        let start = Instant::now();
        let result = self.update_inner(name, &incoming).await;
        record_operation("update", Outcome::of(&result), start.elapsed());
        result
    }

    async fn update_inner(&self, name: &str, incoming: &Record) -> Result<Record, RuleError> {
        debug!("Updating ProxyRule {}/{}", self.namespace, name);

        let mut working = self.store.get(&self.namespace, name).await?;
        working.merge_update(incoming);
        working.normalize(&self.namespace);

        validate_update(&working).into_result()?;

        check_domain_conflict(self.store.as_ref(), &self.namespace, &working, Some(name)).await?;

        let stored = self.store.update(&self.namespace, working).await?;
        info!("Updated ProxyRule {}/{}", self.namespace, name);
        Ok(stored)
    }

    /// Delete a rule by name.
    ///
    /// # Errors
    ///
    /// * [`RuleError::NotFound`] if no rule is named `name`
    /// * [`RuleError::Store`] on backend failure
    pub async fn delete(&self, name: &str) -> Result<(), RuleError> {
        let start = Instant::now();
        let result = self
            .store
            .delete(&self.namespace, name)
            .await
            .map_err(RuleError::from);
        record_operation("delete", Outcome::of(&result), start.elapsed());

        if result.is_ok() {
            info!("Deleted ProxyRule {}/{}", self.namespace, name);
        }
        result
    }

    /// Fetch a rule by name.
    ///
    /// # Errors
    ///
    /// * [`RuleError::NotFound`] if no rule is named `name`
    /// * [`RuleError::Store`] on backend failure
    pub async fn get(&self, name: &str) -> Result<Record, RuleError> {
        let start = Instant::now();
        let result = self
            .store
            .get(&self.namespace, name)
            .await
            .map_err(RuleError::from);
        record_operation("get", Outcome::of(&result), start.elapsed());
        result
    }

    /// List every live rule.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Store`] on backend failure.
    pub async fn list(&self) -> Result<Vec<Record>, RuleError> {
        let start = Instant::now();
        let result = self
            .store
            .list(&self.namespace)
            .await
            .map_err(RuleError::Store);
        record_operation("list", Outcome::of(&result), start.elapsed());

        if let Ok(records) = &result {
            set_live_rules(records.len());
        }
        result
    }
}
