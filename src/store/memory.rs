// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory implementation of [`ObjectStore`].

use std::collections::{BTreeMap, HashMap};

use tokio::sync::RwLock;
use tracing::debug;

use super::{record_name, ObjectStore};
use crate::record::Record;
use crate::rule_errors::StoreError;

/// Concurrency-safe `namespace -> name -> record` map.
///
/// Reads share the lock; writes are serialized. Records are cloned on the way in and
/// out so no caller can reach shared state through a returned value. Listing is ordered
/// by name.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    namespaces: RwLock<HashMap<String, BTreeMap<String, Record>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held in `namespace`.
    pub async fn len(&self, namespace: &str) -> usize {
        self.namespaces
            .read()
            .await
            .get(namespace)
            .map_or(0, BTreeMap::len)
    }
}

fn not_found(namespace: &str, name: &str) -> StoreError {
    StoreError::NotFound {
        namespace: namespace.to_string(),
        name: name.to_string(),
    }
}

#[async_trait::async_trait]
impl ObjectStore for InMemoryStore {
    async fn create(&self, namespace: &str, record: Record) -> Result<Record, StoreError> {
        let name = record_name(&record)?;
        let mut namespaces = self.namespaces.write().await;
        let objects = namespaces.entry(namespace.to_string()).or_default();

        if objects.contains_key(&name) {
            return Err(StoreError::AlreadyExists {
                namespace: namespace.to_string(),
                name,
            });
        }

        debug!("memory store: created {}/{}", namespace, name);
        objects.insert(name, record.clone());
        Ok(record)
    }

    async fn update(&self, namespace: &str, record: Record) -> Result<Record, StoreError> {
        let name = record_name(&record)?;
        let mut namespaces = self.namespaces.write().await;

        let slot = namespaces
            .get_mut(namespace)
            .and_then(|objects| objects.get_mut(&name))
            .ok_or_else(|| not_found(namespace, &name))?;

        debug!("memory store: updated {}/{}", namespace, name);
        *slot = record.clone();
        Ok(record)
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<(), StoreError> {
        let mut namespaces = self.namespaces.write().await;

        namespaces
            .get_mut(namespace)
            .and_then(|objects| objects.remove(name))
            .map(|_| debug!("memory store: deleted {}/{}", namespace, name))
            .ok_or_else(|| not_found(namespace, name))
    }

    async fn get(&self, namespace: &str, name: &str) -> Result<Record, StoreError> {
        self.namespaces
            .read()
            .await
            .get(namespace)
            .and_then(|objects| objects.get(name))
            .cloned()
            .ok_or_else(|| not_found(namespace, name))
    }

    async fn list(&self, namespace: &str) -> Result<Vec<Record>, StoreError> {
        Ok(self
            .namespaces
            .read()
            .await
            .get(namespace)
            .map(|objects| objects.values().cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod memory_tests;
