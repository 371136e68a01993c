// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Namespaced object storage for `ProxyRule` records.
//!
//! The rule manager never talks to a backend directly; it goes through the
//! [`ObjectStore`] trait. Two implementations are provided:
//!
//! - [`memory::InMemoryStore`] - a concurrency-safe map used in tests and local runs
//! - [`kubernetes::KubeStore`] - the Kubernetes API, via `kube`'s dynamic client
//!
//! # Contract
//!
//! | Operation | Success | Distinguished failures |
//! |-----------|---------|------------------------|
//! | `create`  | stored record | `AlreadyExists` |
//! | `update`  | stored record | `NotFound` |
//! | `delete`  | `()` | `NotFound` |
//! | `get`     | stored record | `NotFound` |
//! | `list`    | records (possibly empty) | none |
//!
//! Anything else is [`StoreError::Other`]. Stores own their records: every read hands
//! back a copy and every write takes ownership of the new value.
//!
//! No store is expected to provide cross-record uniqueness beyond names. Domain
//! uniqueness is enforced above this layer and is not atomic with writes.

pub mod kubernetes;
pub mod memory;

pub use kubernetes::KubeStore;
pub use memory::InMemoryStore;

use crate::record::Record;
use crate::rule_errors::StoreError;

/// Abstract namespaced object store.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store a new record under its `metadata.name`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyExists`] if the name is taken.
    async fn create(&self, namespace: &str, record: Record) -> Result<Record, StoreError>;

    /// Replace the record with the same `metadata.name`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no such record exists.
    async fn update(&self, namespace: &str, record: Record) -> Result<Record, StoreError>;

    /// Remove a record by name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no such record exists.
    async fn delete(&self, namespace: &str, name: &str) -> Result<(), StoreError>;

    /// Fetch a record by name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no such record exists.
    async fn get(&self, namespace: &str, name: &str) -> Result<Record, StoreError>;

    /// List every record in the namespace. An empty namespace yields an empty vector.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Other`] if the backend cannot be read.
    async fn list(&self, namespace: &str) -> Result<Vec<Record>, StoreError>;
}

/// Name a record will be stored under.
pub(crate) fn record_name(record: &Record) -> Result<String, StoreError> {
    record
        .name()
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .ok_or_else(|| StoreError::Other("record has no metadata.name".to_string()))
}
